//! Dynamic Array View
//!
//! View over the foreign growable array (`ImVector<T>`): a `{Size, Capacity,
//! Data}` header owned and grown by the native side. Every accessor re-reads
//! the header, so results reflect the array as it is right now.

use std::fmt;
use std::marker::PhantomData;

use log::error;

use super::{NativeField, NativeHandle, NativeLayout, TypedView};
use crate::error::{InteropError, InteropResult};
use crate::raw;

/// Byte-exact mirror of the foreign dynamic array header.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicArrayHeader {
    pub size: i32,
    pub capacity: i32,
    pub data: NativeHandle,
}

impl DynamicArrayHeader {
    pub const fn empty() -> Self {
        DynamicArrayHeader {
            size: 0,
            capacity: 0,
            data: NativeHandle::NULL,
        }
    }
}

unsafe impl NativeLayout for DynamicArrayHeader {
    const NAME: &'static str = "ImVector";
}

unsafe impl NativeField for DynamicArrayHeader {}

const SIZE_OFFSET: usize = std::mem::offset_of!(DynamicArrayHeader, size);
const CAPACITY_OFFSET: usize = std::mem::offset_of!(DynamicArrayHeader, capacity);
const DATA_OFFSET: usize = std::mem::offset_of!(DynamicArrayHeader, data);

/// Indexable, lazily re-read window over a foreign dynamic array of `T`.
pub struct NativeVector<T> {
    header: TypedView<DynamicArrayHeader>,
    _marker: PhantomData<*mut T>,
}

impl<T> Clone for NativeVector<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NativeVector<T> {}

impl<T: NativeLayout> fmt::Debug for NativeVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeVector")
            .field("header", &self.header.address())
            .field("size", &self.raw_size())
            .field("capacity", &self.raw_capacity())
            .finish()
    }
}

impl<T: NativeLayout> NativeVector<T> {
    /// # Safety
    ///
    /// `header` must view a live header whose `Data` holds `T` elements.
    pub unsafe fn wrap(header: TypedView<DynamicArrayHeader>) -> Self {
        NativeVector {
            header,
            _marker: PhantomData,
        }
    }

    /// # Safety
    ///
    /// Same contract as [`NativeVector::wrap`].
    pub unsafe fn from_header_ptr(ptr: *mut DynamicArrayHeader) -> Self {
        Self::wrap(TypedView::from_ptr(ptr))
    }

    pub fn header(&self) -> TypedView<DynamicArrayHeader> {
        self.header
    }

    /// Live `Size` field, exactly as stored.
    pub fn raw_size(&self) -> i32 {
        // Safety: fixed offsets of the repr(C) header
        unsafe { self.header.field(SIZE_OFFSET) }
    }

    /// Live `Capacity` field, exactly as stored.
    pub fn raw_capacity(&self) -> i32 {
        // Safety: fixed offsets of the repr(C) header
        unsafe { self.header.field(CAPACITY_OFFSET) }
    }

    /// Live `Data` pointer.
    pub fn data(&self) -> NativeHandle {
        // Safety: fixed offsets of the repr(C) header
        unsafe { self.header.field(DATA_OFFSET) }
    }

    /// Current length. Do not cache across native calls that may mutate the array.
    pub fn len(&self) -> usize {
        self.raw_size().max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.raw_capacity().max(0) as usize
    }

    /// Check the header invariants and return the current length.
    ///
    /// `0 <= Size <= Capacity`, and `Data` may only be null when `Size == 0`.
    pub fn validate(&self) -> InteropResult<usize> {
        let size = self.raw_size();
        let capacity = self.raw_capacity();
        let data_null = self.data().is_null();
        if size < 0 || capacity < 0 || size > capacity || (size > 0 && data_null) {
            let err = InteropError::CorruptArray {
                size,
                capacity,
                data_null,
            };
            error!("{} at {}: {}", T::NAME, self.header.address(), err);
            return Err(err);
        }
        Ok(size as usize)
    }

    fn element(&self, index: isize) -> InteropResult<NativeHandle> {
        let len = self.validate()?;
        if index < 0 || index as usize >= len {
            return Err(InteropError::out_of_range(index, len));
        }
        let address = raw::element_address(self.data().as_ptr(), index as usize, T::SIZE);
        Ok(NativeHandle::from_ptr(address))
    }

    /// View of element `index`, at `Data + index * sizeof(T)`.
    pub fn at_view(&self, index: isize) -> InteropResult<TypedView<T>> {
        let handle = self.element(index)?;
        // Safety: bounds checked against the live size of a validated header
        Ok(unsafe { TypedView::wrap(handle) })
    }

    /// Lazy live sequence of element views over `[0, len())`.
    ///
    /// The length is re-read on every step.
    pub fn views(&self) -> ViewIter<T> {
        ViewIter {
            vector: *self,
            index: 0,
        }
    }
}

impl<T: NativeLayout + NativeField> NativeVector<T> {
    /// Copy of element `index`.
    pub fn at(&self, index: isize) -> InteropResult<T> {
        Ok(self.at_view(index)?.read())
    }

    /// Overwrite element `index` in place.
    pub fn set(&self, index: isize, value: T) -> InteropResult<()> {
        self.at_view(index)?.write(value);
        Ok(())
    }

    /// Append without reallocating. Fails when `Size == Capacity`, since the
    /// backing storage belongs to the native allocator.
    pub fn push_within_capacity(&self, value: T) -> InteropResult<()> {
        let len = self.validate()?;
        let capacity = self.raw_capacity();
        if len as i32 >= capacity {
            return Err(InteropError::CapacityExceeded { capacity });
        }
        let data = self.data();
        if data.is_null() {
            return Err(InteropError::CorruptArray {
                size: len as i32,
                capacity,
                data_null: true,
            });
        }
        let slot = raw::element_address(data.as_ptr(), len, T::SIZE);
        // Safety: slot lies inside the validated capacity
        unsafe {
            T::write_at(slot, value);
            self.header.set_field(SIZE_OFFSET, len as i32 + 1);
        }
        Ok(())
    }

    /// Shrink to `len` elements. No-op when already shorter.
    pub fn truncate(&self, len: usize) -> InteropResult<()> {
        let current = self.validate()?;
        if len < current {
            // Safety: fixed offsets of the repr(C) header
            unsafe { self.header.set_field(SIZE_OFFSET, len as i32) };
        }
        Ok(())
    }

    pub fn clear(&self) -> InteropResult<()> {
        self.truncate(0)
    }

    /// Owned copy of the elements as they are now.
    pub fn snapshot(&self) -> InteropResult<Vec<T>> {
        let len = self.validate()?;
        let data = self.data().as_ptr();
        Ok((0..len)
            // Safety: every index is below the validated size
            .map(|i| unsafe { T::read_at(raw::element_address(data, i, T::SIZE)) })
            .collect())
    }

    /// Lazy live sequence of element copies over `[0, len())`.
    ///
    /// The length is re-read on every step, so elements pushed during
    /// iteration are visited. A header that turns corrupt mid-iteration panics.
    pub fn iter(&self) -> Iter<T> {
        Iter {
            vector: *self,
            index: 0,
        }
    }
}

/// Live iterator over element copies.
pub struct Iter<T> {
    vector: NativeVector<T>,
    index: isize,
}

impl<T: NativeLayout + NativeField> Iterator for Iter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self.vector.at(self.index) {
            Ok(value) => {
                self.index += 1;
                Some(value)
            }
            Err(InteropError::IndexOutOfRange { .. }) => None,
            Err(err) => panic!("{err}"),
        }
    }
}

/// Live iterator over element views.
pub struct ViewIter<T> {
    vector: NativeVector<T>,
    index: isize,
}

impl<T: NativeLayout> Iterator for ViewIter<T> {
    type Item = TypedView<T>;

    fn next(&mut self) -> Option<TypedView<T>> {
        match self.vector.at_view(self.index) {
            Ok(view) => {
                self.index += 1;
                Some(view)
            }
            Err(InteropError::IndexOutOfRange { .. }) => None,
            Err(err) => panic!("{err}"),
        }
    }
}
