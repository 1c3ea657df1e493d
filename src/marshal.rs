//! String Marshaling
//!
//! Host strings cross the ABI as NUL-terminated UTF-8. Outgoing buffers are
//! scoped to one native call: [`with_foreign_str`] keeps short strings on the
//! stack and releases everything when the closure returns.
//!
//! # Example
//!
//! ```rust
//! use cimgui_interop::marshal::{from_foreign, with_foreign_str};
//!
//! let echoed = with_foreign_str("Window", |ptr| unsafe { from_foreign(ptr, None) });
//! assert_eq!(echoed, "Window");
//! ```

use std::ffi::c_char;
use std::mem::MaybeUninit;

use log::warn;

use crate::error::InteropResult;
use crate::raw;

/// Strings up to this many bytes (terminator included) are encoded on the stack.
pub const STACK_THRESHOLD: usize = 2048;

/// What a null foreign `const char*` decodes to.
pub const ABSENT: &str = "";

/// An encoded, NUL-terminated copy of a host string.
///
/// Keep it for exactly one native call; the pointer dies with the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignString {
    bytes: Vec<u8>,
}

impl ForeignString {
    pub fn as_ptr(&self) -> *const c_char {
        self.bytes.as_ptr() as *const c_char
    }

    /// Pointer one past the last text byte (at the terminator), for
    /// `(begin, end)` style parameters.
    pub fn end_ptr(&self) -> *const c_char {
        self.as_ptr().wrapping_add(self.len())
    }

    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.bytes
    }

    /// Text length in bytes, terminator excluded.
    pub fn len(&self) -> usize {
        self.bytes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// UTF-8 encode `text` and append the terminator. `""` yields a single zero byte.
///
/// Interior NULs are copied verbatim; the native side will stop at the first one.
pub fn to_foreign(text: &str) -> ForeignString {
    let mut bytes = Vec::with_capacity(text.len() + 1);
    bytes.extend_from_slice(text.as_bytes());
    bytes.push(0);
    ForeignString { bytes }
}

/// Run `f` with a NUL-terminated copy of `text` that lives only for the call.
pub fn with_foreign_str<R>(text: &str, f: impl FnOnce(*const c_char) -> R) -> R {
    with_foreign_range(text, |begin, _end| f(begin))
}

/// Like [`with_foreign_str`], also passing the end pointer (at the terminator).
pub fn with_foreign_range<R>(
    text: &str,
    f: impl FnOnce(*const c_char, *const c_char) -> R,
) -> R {
    let len = text.len();
    if len < STACK_THRESHOLD {
        let mut buf = MaybeUninit::<[u8; STACK_THRESHOLD]>::uninit();
        let begin = buf.as_mut_ptr() as *mut u8;
        // Safety: len < STACK_THRESHOLD, so the text and its terminator fit.
        // Only those len + 1 bytes are initialized and only they are exposed.
        unsafe {
            raw::copy_into(begin, text.as_bytes());
            begin.add(len).write(0);
        }
        let begin = begin as *const c_char;
        f(begin, begin.wrapping_add(len))
    } else {
        let encoded = to_foreign(text);
        f(encoded.as_ptr(), encoded.end_ptr())
    }
}

/// Like [`with_foreign_str`] for an optional argument; `None` passes null.
pub fn with_optional_foreign_str<R>(text: Option<&str>, f: impl FnOnce(*const c_char) -> R) -> R {
    match text {
        Some(text) => with_foreign_str(text, f),
        None => f(std::ptr::null()),
    }
}

/// Decode bytes as UTF-8, substituting U+FFFD for invalid sequences.
pub fn decode_lossy(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(err) => {
            warn!("invalid UTF-8 in foreign string ({err}), substituting replacement characters");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Decode a foreign string, scanning to the first NUL or to `end` when given.
///
/// Null maps to [`ABSENT`] without touching memory. Invalid UTF-8 is
/// replaced, never reported.
///
/// # Safety
///
/// Non-null `ptr` must point at a NUL-terminated string, or at readable
/// memory up to `end`.
pub unsafe fn from_foreign(ptr: *const c_char, end: Option<*const c_char>) -> String {
    from_foreign_opt(ptr, end).unwrap_or_else(|| ABSENT.to_owned())
}

/// Like [`from_foreign`] but distinguishes null (`None`) from empty.
///
/// # Safety
///
/// Same contract as [`from_foreign`].
pub unsafe fn from_foreign_opt(ptr: *const c_char, end: Option<*const c_char>) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(decode_lossy(raw::c_str_bytes(ptr, end)))
}

/// Decode a `(begin, end)` range as used by text-range structs. Null begin is absent.
///
/// # Safety
///
/// Non-null `begin..end` must be readable.
pub unsafe fn from_foreign_range(begin: *const c_char, end: *const c_char) -> String {
    from_foreign(begin, Some(end))
}

/// Strict decoding: invalid UTF-8 is an error instead of being replaced.
///
/// # Safety
///
/// Same contract as [`from_foreign`].
pub unsafe fn from_foreign_strict(
    ptr: *const c_char,
    end: Option<*const c_char>,
) -> InteropResult<String> {
    if ptr.is_null() {
        return Ok(ABSENT.to_owned());
    }
    let text = std::str::from_utf8(raw::c_str_bytes(ptr, end))?;
    Ok(text.to_owned())
}
