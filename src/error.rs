//! Interop Error Taxonomy
//!
//! Every failure this crate can report, from startup resolution down to a
//! single bounds check on a foreign array.

use thiserror::Error;

use crate::config::ConfigError;
use crate::dispatch::Platform;

/// Error type for all interop operations
#[derive(Debug, Error)]
pub enum InteropError {
    /// The shared object could not be located for the requested platform
    #[error("library '{library}' not found for platform '{platform}' (searched: {searched})")]
    LibraryNotFound {
        library: String,
        platform: Platform,
        searched: String,
    },

    /// The shared object was located but the loader rejected it
    #[error("failed to load library '{library}' for platform '{platform}': {message}")]
    LoadFailed {
        library: String,
        platform: Platform,
        message: String,
    },

    /// A required export is absent (binding/binary version mismatch)
    #[error("symbol '{symbol}' not found in '{library}'")]
    SymbolNotFound { symbol: String, library: String },

    /// Locally declared struct size disagrees with the size the library reports
    #[error("layout mismatch for {type_name}: declared {declared} bytes, library reports {reported}")]
    LayoutMismatch {
        type_name: String,
        declared: usize,
        reported: usize,
    },

    /// Index outside `[0, len)` on any view
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    /// Array header violates `0 <= Size <= Capacity` or has null data with nonzero size
    #[error("corrupt foreign array: size {size}, capacity {capacity}, data null: {data_null}")]
    CorruptArray {
        size: i32,
        capacity: i32,
        data_null: bool,
    },

    /// In-place growth would exceed the foreign-owned capacity
    #[error("foreign array is full (capacity {capacity})")]
    CapacityExceeded { capacity: i32 },

    /// Invalid UTF-8 in a foreign string (strict decoding only)
    #[error("invalid UTF-8 in foreign string: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// The process-wide dispatcher was already selected
    #[error("dispatcher already initialized")]
    AlreadyInitialized,

    /// The process-wide dispatcher has not been selected yet
    #[error("dispatcher not initialized")]
    NotInitialized,

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl InteropError {
    /// Whether this error must stop startup (or the process) rather than be handled locally.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InteropError::LibraryNotFound { .. }
                | InteropError::LoadFailed { .. }
                | InteropError::SymbolNotFound { .. }
                | InteropError::LayoutMismatch { .. }
                | InteropError::CorruptArray { .. }
                | InteropError::Config(_)
        )
    }

    /// Whether this is an initialization failure (missing library or symbol).
    pub fn is_initialization(&self) -> bool {
        matches!(
            self,
            InteropError::LibraryNotFound { .. }
                | InteropError::LoadFailed { .. }
                | InteropError::SymbolNotFound { .. }
        )
    }

    pub(crate) fn out_of_range(index: impl TryInto<i64>, len: usize) -> Self {
        InteropError::IndexOutOfRange {
            index: index.try_into().unwrap_or(i64::MAX),
            len,
        }
    }
}

/// Result type for interop operations
pub type InteropResult<T> = Result<T, InteropError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let missing = InteropError::SymbolNotFound {
            symbol: "igBegin".into(),
            library: "cimgui".into(),
        };
        assert!(missing.is_fatal());
        assert!(missing.is_initialization());

        let bounds = InteropError::out_of_range(3usize, 3);
        assert!(!bounds.is_fatal());

        let corrupt = InteropError::CorruptArray {
            size: 2,
            capacity: 4,
            data_null: true,
        };
        assert!(corrupt.is_fatal());
        assert!(!corrupt.is_initialization());
    }

    #[test]
    fn test_library_not_found_names_platform() {
        let err = InteropError::LibraryNotFound {
            library: "cimgui".into(),
            platform: Platform::Dynamic,
            searched: "/usr/lib".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("cimgui"));
        assert!(msg.contains("dynamic"));
    }

    #[test]
    fn test_load_failed_names_platform() {
        let err = InteropError::LoadFailed {
            library: "cimgui".into(),
            platform: Platform::Dynamic,
            message: "wrong ELF class: ELFCLASS32".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'cimgui'"));
        assert!(msg.contains("'dynamic'"));
        assert!(msg.contains("ELFCLASS32"));
        assert!(err.is_fatal());
        assert!(err.is_initialization());
    }

    #[test]
    fn test_negative_index_preserved() {
        match InteropError::out_of_range(-1i32, 3) {
            InteropError::IndexOutOfRange { index, len } => {
                assert_eq!(index, -1);
                assert_eq!(len, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
