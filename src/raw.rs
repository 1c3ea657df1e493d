//! Raw Memory Window
//!
//! The only place in the crate that dereferences foreign addresses. Everything
//! above this module works through [`TypedView`](crate::view::TypedView) and
//! the array/buffer views built on it.
//!
//! Foreign structs are not guaranteed to be aligned for the host's idea of
//! the field type (packed vertex formats, user-supplied buffers), so every
//! access here is unaligned.

use std::ffi::c_char;

/// Read a `T` at `base + offset`.
///
/// # Safety
///
/// `base + offset .. base + offset + size_of::<T>()` must be readable foreign
/// memory holding a valid bit pattern for `T`.
#[inline]
pub unsafe fn read_field<T: Copy>(base: *const u8, offset: usize) -> T {
    (base.add(offset) as *const T).read_unaligned()
}

/// Write a `T` at `base + offset`. Write-through, nothing is cached.
///
/// # Safety
///
/// `base + offset .. base + offset + size_of::<T>()` must be writable foreign memory.
#[inline]
pub unsafe fn write_field<T>(base: *mut u8, offset: usize, value: T) {
    (base.add(offset) as *mut T).write_unaligned(value)
}

/// Address of element `index` in a packed array starting at `base`.
///
/// Pure arithmetic: the result is not dereferenced. Wrapping arithmetic keeps
/// this callable on null or dangling bases; bounds are the caller's job.
#[inline]
pub fn element_address(base: *mut u8, index: usize, stride: usize) -> *mut u8 {
    base.wrapping_add(index.wrapping_mul(stride))
}

/// Read a pointer-sized address at `base + offset`.
///
/// # Safety
///
/// Same contract as [`read_field`].
#[inline]
pub unsafe fn read_address(base: *const u8, offset: usize) -> *mut u8 {
    read_field::<*mut u8>(base, offset)
}

/// Bytes from `ptr` up to (not including) the first zero byte, or up to `end`
/// when given, whichever comes first.
///
/// # Safety
///
/// `ptr` must be non-null. Without `end` the memory must contain a zero byte;
/// with `end`, `ptr..end` must be readable.
pub unsafe fn c_str_bytes<'a>(ptr: *const c_char, end: Option<*const c_char>) -> &'a [u8] {
    let start = ptr as *const u8;
    match end {
        Some(end) => {
            let limit = (end as usize).saturating_sub(start as usize);
            let mut len = 0;
            while len < limit && *start.add(len) != 0 {
                len += 1;
            }
            std::slice::from_raw_parts(start, len)
        }
        None => std::ffi::CStr::from_ptr(ptr).to_bytes(),
    }
}

/// Copy `src` into foreign memory at `dst`.
///
/// # Safety
///
/// `dst .. dst + src.len()` must be writable and must not overlap `src`.
#[inline]
pub unsafe fn copy_into(dst: *mut u8, src: &[u8]) {
    std::ptr::copy_nonoverlapping(src.as_ptr(), dst, src.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    struct Pair {
        a: i32,
        b: f32,
    }

    #[test]
    fn test_read_write_field() {
        let mut pair = Pair { a: 7, b: 1.5 };
        let base = &mut pair as *mut Pair as *mut u8;
        unsafe {
            assert_eq!(read_field::<i32>(base, 0), 7);
            assert_eq!(read_field::<f32>(base, 4), 1.5);
            write_field::<i32>(base, 0, -3);
        }
        assert_eq!(pair.a, -3);
    }

    #[test]
    fn test_element_address_on_null() {
        let addr = element_address(std::ptr::null_mut(), 3, 20);
        assert_eq!(addr as usize, 60);
    }

    #[test]
    fn test_c_str_bytes_with_end() {
        let text = b"hello\0world";
        let ptr = text.as_ptr() as *const c_char;
        unsafe {
            assert_eq!(c_str_bytes(ptr, None), b"hello");
            assert_eq!(c_str_bytes(ptr, Some(ptr.add(3))), b"hel");
            assert_eq!(c_str_bytes(ptr, Some(ptr.add(9))), b"hello");
            assert_eq!(c_str_bytes(ptr, Some(ptr)), b"");
        }
    }
}
