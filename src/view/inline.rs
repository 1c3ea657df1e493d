//! Inline Buffer View
//!
//! Fixed-length arrays embedded directly in a parent struct, such as
//! `char InputBuf[256]`. The length is the type parameter `N` and always
//! equals the foreign declaration.

use std::fmt;
use std::marker::PhantomData;

use super::{NativeField, NativeHandle};
use crate::error::{InteropError, InteropResult};
use crate::marshal;
use crate::raw;

/// Bounds-checked window over `N` inline elements of `T`.
pub struct InlineBuffer<T, const N: usize> {
    base: NativeHandle,
    _marker: PhantomData<*mut T>,
}

impl<T, const N: usize> Clone for InlineBuffer<T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const N: usize> Copy for InlineBuffer<T, N> {}

impl<T, const N: usize> fmt::Debug for InlineBuffer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InlineBuffer<{}; {}>({})", std::any::type_name::<T>(), N, self.base)
    }
}

impl<T: NativeField, const N: usize> InlineBuffer<T, N> {
    /// Declared element count.
    pub const LEN: usize = N;

    /// # Safety
    ///
    /// `base` must point at `N` live, contiguous `T` values.
    pub unsafe fn wrap(base: NativeHandle) -> Self {
        InlineBuffer {
            base,
            _marker: PhantomData,
        }
    }

    pub fn address(&self) -> NativeHandle {
        self.base
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    fn slot(&self, index: isize) -> InteropResult<*mut u8> {
        if index < 0 || index as usize >= N {
            return Err(InteropError::out_of_range(index, N));
        }
        Ok(raw::element_address(
            self.base.as_ptr(),
            index as usize,
            std::mem::size_of::<T>(),
        ))
    }

    pub fn at(&self, index: isize) -> InteropResult<T> {
        let slot = self.slot(index)?;
        // Safety: index < N
        Ok(unsafe { T::read_at(slot) })
    }

    pub fn set(&self, index: isize, value: T) -> InteropResult<()> {
        let slot = self.slot(index)?;
        // Safety: index < N
        unsafe { T::write_at(slot, value) };
        Ok(())
    }

    /// Copy of all `N` elements.
    pub fn to_vec(&self) -> Vec<T> {
        (0..N)
            // Safety: every index is below N
            .map(|i| unsafe {
                T::read_at(raw::element_address(
                    self.base.as_ptr(),
                    i,
                    std::mem::size_of::<T>(),
                ))
            })
            .collect()
    }
}

impl<const N: usize> InlineBuffer<u8, N> {
    /// Text up to the first NUL (or all `N` bytes when none), decoded lossily.
    pub fn read_str(&self) -> String {
        let bytes = self.to_vec();
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(N);
        marshal::decode_lossy(&bytes[..end])
    }

    /// Store `text` NUL-terminated, truncating on a char boundary to fit.
    /// Returns the number of text bytes written.
    pub fn write_str(&self, text: &str) -> usize {
        if N == 0 {
            return 0;
        }
        let mut len = text.len().min(N - 1);
        while !text.is_char_boundary(len) {
            len -= 1;
        }
        // Safety: len + 1 <= N
        unsafe {
            raw::copy_into(self.base.as_ptr(), &text.as_bytes()[..len]);
            raw::write_field::<u8>(self.base.as_ptr(), len, 0);
        }
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let mut storage = [1u8, 2, 3, 4];
        let buf: InlineBuffer<u8, 4> =
            unsafe { InlineBuffer::wrap(NativeHandle::from_ptr(storage.as_mut_ptr())) };

        assert_eq!(buf.len(), 4);
        assert_eq!(InlineBuffer::<u8, 4>::LEN, 4);
        for i in 0..4 {
            assert_eq!(buf.at(i).unwrap(), storage[i as usize]);
        }
        assert!(matches!(
            buf.at(4),
            Err(InteropError::IndexOutOfRange { index: 4, len: 4 })
        ));
        assert!(matches!(buf.at(-1), Err(InteropError::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_set_writes_through() {
        let mut storage = [0.0f32; 3];
        let buf: InlineBuffer<f32, 3> =
            unsafe { InlineBuffer::wrap(NativeHandle::from_ptr(storage.as_mut_ptr())) };
        buf.set(2, 2.5).unwrap();
        assert!(buf.set(3, 1.0).is_err());
        assert_eq!(storage, [0.0, 0.0, 2.5]);
    }

    #[test]
    fn test_string_round_trip_truncates() {
        let mut storage = [0xffu8; 6];
        let buf: InlineBuffer<u8, 6> =
            unsafe { InlineBuffer::wrap(NativeHandle::from_ptr(storage.as_mut_ptr())) };

        assert_eq!(buf.write_str("abc"), 3);
        assert_eq!(buf.read_str(), "abc");

        // 'é' is two bytes and would straddle the terminator slot
        assert_eq!(buf.write_str("abcdé"), 4);
        assert_eq!(buf.read_str(), "abcd");
        assert_eq!(storage[4], 0);
    }
}
