//! Pointer-Array View
//!
//! Indexed access to separately addressed foreign structs. The native library
//! stores such collections two ways, and the view never guesses which one:
//!
//! - [`Addressing::Indirect`]: a packed array of `T*`; element `i` is the
//!   pointer stored at `Data + i * sizeof(void*)`.
//! - [`Addressing::Strided`]: elements live inline at `Data + i * stride`.

use std::fmt;
use std::marker::PhantomData;

use super::{DynamicArrayHeader, NativeHandle, NativeLayout, NativeVector, TypedView};
use crate::error::{InteropError, InteropResult};
use crate::raw;

const POINTER_SIZE: usize = std::mem::size_of::<*const u8>();

/// How element addresses are derived from the backing data pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// `Data` is an array of pointers to elements.
    Indirect,
    /// `Data` is the first element; successive elements are `stride` bytes apart.
    Strided { stride: usize },
}

impl Addressing {
    /// Strided addressing over a packed array of `T`.
    pub fn packed<T: NativeLayout>() -> Self {
        Addressing::Strided { stride: T::SIZE }
    }

    fn slot_stride(&self) -> usize {
        match self {
            Addressing::Indirect => POINTER_SIZE,
            Addressing::Strided { stride } => *stride,
        }
    }
}

#[derive(Clone, Copy)]
enum Source {
    /// Length and data re-read from a live dynamic array header.
    Vector(TypedView<DynamicArrayHeader>),
    /// Fixed data pointer and element count.
    Raw { data: NativeHandle, len: usize },
}

/// View over a collection of foreign structs with explicit addressing.
pub struct PointerArray<T> {
    source: Source,
    addressing: Addressing,
    _marker: PhantomData<*mut T>,
}

impl<T> Clone for PointerArray<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PointerArray<T> {}

impl<T> fmt::Debug for PointerArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            Source::Vector(header) => format!("vector@{}", header.address()),
            Source::Raw { data, len } => format!("raw@{data}[{len}]"),
        };
        f.debug_struct("PointerArray")
            .field("source", &source)
            .field("addressing", &self.addressing)
            .finish()
    }
}

impl<T> PointerArray<T> {
    /// Backed by a foreign dynamic array header (`ImVector<T*>` for
    /// [`Addressing::Indirect`]).
    ///
    /// # Safety
    ///
    /// `header` must view a live header whose data matches `addressing`.
    pub unsafe fn from_vector(header: TypedView<DynamicArrayHeader>, addressing: Addressing) -> Self {
        PointerArray {
            source: Source::Vector(header),
            addressing,
            _marker: PhantomData,
        }
    }

    /// Backed by a bare data pointer and a count.
    ///
    /// # Safety
    ///
    /// `data` must hold `len` elements laid out per `addressing`.
    pub unsafe fn from_raw(data: NativeHandle, len: usize, addressing: Addressing) -> Self {
        PointerArray {
            source: Source::Raw { data, len },
            addressing,
            _marker: PhantomData,
        }
    }

    pub fn addressing(&self) -> Addressing {
        self.addressing
    }

    fn bounds(&self) -> InteropResult<(NativeHandle, usize)> {
        match self.source {
            Source::Vector(header) => {
                // Safety: construction contract covers the header
                let vector: NativeVector<NativeHandle> = unsafe { NativeVector::wrap(header) };
                let len = vector.validate()?;
                Ok((vector.data(), len))
            }
            Source::Raw { data, len } => {
                if len > 0 && data.is_null() {
                    return Err(InteropError::CorruptArray {
                        size: len.min(i32::MAX as usize) as i32,
                        capacity: len.min(i32::MAX as usize) as i32,
                        data_null: true,
                    });
                }
                Ok((data, len))
            }
        }
    }

    /// Current element count.
    pub fn len(&self) -> usize {
        match self.source {
            Source::Vector(header) => {
                // Safety: construction contract covers the header
                let vector: NativeVector<NativeHandle> = unsafe { NativeVector::wrap(header) };
                vector.len()
            }
            Source::Raw { len, .. } => len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// View of element `index`. Under [`Addressing::Indirect`] the stored
    /// pointer may itself be null; check with [`TypedView::get`].
    pub fn at(&self, index: isize) -> InteropResult<TypedView<T>> {
        let (data, len) = self.bounds()?;
        if index < 0 || index as usize >= len {
            return Err(InteropError::out_of_range(index, len));
        }
        let slot = raw::element_address(data.as_ptr(), index as usize, self.addressing.slot_stride());
        let element = match self.addressing {
            // Safety: slot is inside the validated pointer array
            Addressing::Indirect => unsafe { raw::read_address(slot, 0) },
            Addressing::Strided { .. } => slot,
        };
        // Safety: element address derived from validated bounds
        Ok(unsafe { TypedView::wrap(NativeHandle::from_ptr(element)) })
    }

    /// Lazy live sequence of element views.
    pub fn iter(&self) -> Iter<T> {
        Iter {
            array: *self,
            index: 0,
        }
    }
}

/// Live iterator over a [`PointerArray`].
pub struct Iter<T> {
    array: PointerArray<T>,
    index: isize,
}

impl<T> Iterator for Iter<T> {
    type Item = TypedView<T>;

    fn next(&mut self) -> Option<TypedView<T>> {
        match self.array.at(self.index) {
            Ok(view) => {
                self.index += 1;
                Some(view)
            }
            Err(InteropError::IndexOutOfRange { .. }) => None,
            Err(err) => panic!("{err}"),
        }
    }
}
