//! Typed Views over Foreign Memory
//!
//! A view is an address plus a declared layout. It owns nothing, carries no
//! finalizer and is rebuilt on every access, so it is only as valid as the
//! foreign memory it points at.
//!
//! # Architecture
//!
//! ```text
//! native_view! accessors / hand-written field helpers
//!       │
//!       ▼
//! TypedView<T>      NativeVector<T>   PointerArray<T>   InlineBuffer<T, N>
//!       │                  │                 │                 │
//!       └──────────────────┴────────┬────────┴─────────────────┘
//!                                   ▼
//!                             raw (read/write at offset, element address)
//! ```
//!
//! # Validity
//!
//! Constructing a view from an address is `unsafe`: the caller asserts that
//! the address is either null or points at a live instance of `T` for as long
//! as the view (and anything derived from it) is used. Growth calls on the
//! native side (e.g. a vector reallocation) end that window.

pub mod inline;
pub mod ptr_array;
pub mod vector;

use std::ffi::c_char;
use std::fmt;
use std::marker::PhantomData;

use crate::marshal;
use crate::raw;

pub use inline::InlineBuffer;
pub use ptr_array::{Addressing, PointerArray};
pub use vector::{DynamicArrayHeader, NativeVector};

/// A raw, non-owning address into foreign memory.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(*mut u8);

impl NativeHandle {
    /// The null address.
    pub const NULL: NativeHandle = NativeHandle(std::ptr::null_mut());

    /// Wrap any raw pointer.
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        NativeHandle(ptr as *mut u8)
    }

    /// Wrap a plain integer address.
    pub fn from_address(address: usize) -> Self {
        NativeHandle(address as *mut u8)
    }

    pub fn as_ptr(self) -> *mut u8 {
        self.0
    }

    pub fn cast<T>(self) -> *mut T {
        self.0 as *mut T
    }

    pub fn address(self) -> usize {
        self.0 as usize
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }

    /// Address `bytes` past this one. Never dereferences.
    pub fn offset(self, bytes: usize) -> Self {
        NativeHandle(self.0.wrapping_add(bytes))
    }
}

impl Default for NativeHandle {
    fn default() -> Self {
        NativeHandle::NULL
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeHandle({:#x})", self.address())
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.address())
    }
}

/// A type whose in-memory layout matches a foreign struct exactly.
///
/// # Safety
///
/// `SIZE` must equal the foreign definition's `sizeof`, and field offsets of
/// the implementing type (usually a `#[repr(C)]` mirror) must match too.
pub unsafe trait NativeLayout: Sized {
    /// Name used in diagnostics and layout queries.
    const NAME: &'static str;
    /// Byte size, also the stride of packed arrays of this type.
    const SIZE: usize = std::mem::size_of::<Self>();
}

/// A value that can be copied in and out of foreign memory.
///
/// # Safety
///
/// The default methods reinterpret raw bytes; implementors must be valid for
/// every bit pattern the foreign side can store, or override both methods.
pub unsafe trait NativeField: Copy {
    /// # Safety
    /// `ptr` must be readable for `size_of::<Self>()` bytes.
    unsafe fn read_at(ptr: *const u8) -> Self {
        raw::read_field(ptr, 0)
    }

    /// # Safety
    /// `ptr` must be writable for `size_of::<Self>()` bytes.
    unsafe fn write_at(ptr: *mut u8, value: Self) {
        raw::write_field(ptr, 0, value)
    }
}

macro_rules! primitive_layouts {
    ($($ty:ty),* $(,)?) => {
        $(
            unsafe impl NativeLayout for $ty {
                const NAME: &'static str = stringify!($ty);
            }
            unsafe impl NativeField for $ty {}
        )*
    };
}

primitive_layouts!(u8, i8, u16, i16, u32, i32, u64, i64, usize, isize, f32, f64);

// Foreign booleans are one byte, 0 or 1. Anything else must not become a Rust bool.
unsafe impl NativeLayout for bool {
    const NAME: &'static str = "bool";
}

unsafe impl NativeField for bool {
    unsafe fn read_at(ptr: *const u8) -> Self {
        raw::read_field::<u8>(ptr, 0) != 0
    }

    unsafe fn write_at(ptr: *mut u8, value: Self) {
        raw::write_field::<u8>(ptr, 0, value as u8)
    }
}

unsafe impl NativeLayout for NativeHandle {
    const NAME: &'static str = "void*";
}
unsafe impl NativeField for NativeHandle {}

unsafe impl<T> NativeLayout for *mut T {
    const NAME: &'static str = "T*";
}
unsafe impl<T> NativeField for *mut T {}

unsafe impl<T> NativeLayout for *const T {
    const NAME: &'static str = "const T*";
}
unsafe impl<T> NativeField for *const T {}

/// Address of a foreign `T`, with typed field access.
///
/// Copying a view copies the address only. Two views are equal when their
/// addresses are equal.
pub struct TypedView<T> {
    handle: NativeHandle,
    _marker: PhantomData<*mut T>,
}

impl<T> Clone for TypedView<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedView<T> {}

impl<T> PartialEq for TypedView<T> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl<T> Eq for TypedView<T> {}

impl<T> fmt::Debug for TypedView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypedView<{}>({})", std::any::type_name::<T>(), self.handle)
    }
}

impl<T> TypedView<T> {
    /// Wrap an address. No validation happens; a null address is legal.
    ///
    /// # Safety
    ///
    /// `handle` is null or points at a live `T` for as long as the view and
    /// anything derived from it is used.
    pub unsafe fn wrap(handle: NativeHandle) -> Self {
        TypedView {
            handle,
            _marker: PhantomData,
        }
    }

    /// # Safety
    ///
    /// Same contract as [`TypedView::wrap`].
    pub unsafe fn from_ptr(ptr: *mut T) -> Self {
        Self::wrap(NativeHandle::from_ptr(ptr))
    }

    /// A view that points nowhere. Field access on it panics.
    pub fn null() -> Self {
        TypedView {
            handle: NativeHandle::NULL,
            _marker: PhantomData,
        }
    }

    pub fn address(&self) -> NativeHandle {
        self.handle
    }

    pub fn as_ptr(&self) -> *mut T {
        self.handle.cast()
    }

    pub fn is_null(&self) -> bool {
        self.handle.is_null()
    }

    /// `None` when the view is null, so "absent" never reaches a dereference.
    pub fn get(self) -> Option<Self> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }

    #[inline]
    fn base(&self) -> *mut u8 {
        if self.handle.is_null() {
            panic!(
                "dereferenced null view of {}",
                std::any::type_name::<T>()
            );
        }
        self.handle.as_ptr()
    }

    /// Read the field stored `offset` bytes into the struct.
    ///
    /// # Safety
    ///
    /// `offset` must be the published offset of a field of type `F` in `T`.
    pub unsafe fn field<F: NativeField>(&self, offset: usize) -> F {
        F::read_at(self.base().add(offset))
    }

    /// Write-through store into the field `offset` bytes into the struct.
    ///
    /// # Safety
    ///
    /// Same contract as [`TypedView::field`].
    pub unsafe fn set_field<F: NativeField>(&self, offset: usize, value: F) {
        F::write_at(self.base().add(offset), value)
    }

    /// View of a struct embedded by value at `offset`. No dereference.
    ///
    /// # Safety
    ///
    /// A `U` must live at that offset.
    pub unsafe fn embedded<U>(&self, offset: usize) -> TypedView<U> {
        TypedView::wrap(NativeHandle::from_ptr(self.base()).offset(offset))
    }

    /// View of the struct a pointer field at `offset` points to; may be null.
    ///
    /// # Safety
    ///
    /// The field at `offset` must be a `U*`.
    pub unsafe fn pointee<U>(&self, offset: usize) -> TypedView<U> {
        TypedView::wrap(self.field::<NativeHandle>(offset))
    }

    /// Vector view over an `ImVector`-shaped header embedded at `offset`.
    ///
    /// # Safety
    ///
    /// A [`DynamicArrayHeader`] of `E` elements must live at that offset.
    pub unsafe fn vector<E: NativeLayout>(&self, offset: usize) -> NativeVector<E> {
        NativeVector::wrap(self.embedded::<DynamicArrayHeader>(offset))
    }

    /// Inline fixed-length array embedded at `offset`.
    ///
    /// # Safety
    ///
    /// `N` elements of `E` must live at that offset.
    pub unsafe fn inline<E: NativeField, const N: usize>(&self, offset: usize) -> InlineBuffer<E, N> {
        InlineBuffer::wrap(NativeHandle::from_ptr(self.base()).offset(offset))
    }

    /// Decode the `const char*` stored at `offset`; null yields the empty string.
    ///
    /// # Safety
    ///
    /// The field must be null or point at a NUL-terminated string.
    pub unsafe fn c_str_field(&self, offset: usize) -> String {
        let ptr = self.field::<*const c_char>(offset);
        marshal::from_foreign(ptr, None)
    }
}

impl<T: NativeLayout> TypedView<T> {
    /// Declared byte size of the viewed struct.
    pub fn size(&self) -> usize {
        T::SIZE
    }
}

impl<T: NativeField> TypedView<T> {
    /// Copy the whole value out of foreign memory.
    pub fn read(&self) -> T {
        // Safety: construction contract guarantees a live T at this address
        unsafe { T::read_at(self.base()) }
    }

    /// Overwrite the whole value in foreign memory.
    pub fn write(&self, value: T) {
        // Safety: construction contract guarantees a live T at this address
        unsafe { T::write_at(self.base(), value) }
    }
}

/// Generate getter/setter pairs for value fields of a `#[repr(C)]` mirror.
///
/// Offsets come from `offset_of!` on the mirror, so they are the published
/// layout's constants and never computed at runtime.
macro_rules! native_view {
    ($layout:ty { $( $(#[$meta:meta])* $field:ident / $setter:ident : $ty:ty ),* $(,)? }) => {
        impl $crate::view::TypedView<$layout> {
            $(
                $(#[$meta])*
                pub fn $field(&self) -> $ty {
                    // Safety: offset_of! on the repr(C) mirror names a field of this type
                    unsafe { self.field::<$ty>(std::mem::offset_of!($layout, $field)) }
                }

                pub fn $setter(&self, value: $ty) {
                    // Safety: offset_of! on the repr(C) mirror names a field of this type
                    unsafe { self.set_field::<$ty>(std::mem::offset_of!($layout, $field), value) }
                }
            )*
        }
    };
}

pub(crate) use native_view;

#[cfg(test)]
mod tests;
