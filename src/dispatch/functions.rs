//! Function Tables
//!
//! The per-function call layer is mechanical: one typed pointer per export,
//! all bound eagerly from a [`Dispatcher`](crate::dispatch::Dispatcher).
//! [`native_functions!`](crate::native_functions) generates such a table.
//!
//! # Example
//!
//! ```rust
//! use std::ffi::c_char;
//! use cimgui_interop::native_functions;
//!
//! native_functions! {
//!     /// Version queries
//!     pub struct VersionApi {
//!         get_version = "igGetVersion": fn() -> *const c_char;
//!         debug_log = "igDebugLog": fn(*const c_char);
//!     }
//! }
//!
//! assert_eq!(VersionApi::SYMBOLS, &["igGetVersion", "igDebugLog"]);
//! ```

/// Declare a struct of `unsafe extern "C"` function pointers bound by symbol name.
///
/// The generated type gets `SYMBOLS` (every export it needs, for eager
/// resolution) and an `unsafe fn load(&Dispatcher)`.
#[macro_export]
macro_rules! native_functions {
    (
        $(#[$struct_meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident = $symbol:literal : fn( $($arg:ty),* $(,)? ) $(-> $ret:ty)? ;
            )*
        }
    ) => {
        $(#[$struct_meta])*
        #[derive(Clone, Copy, Debug)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: unsafe extern "C" fn($($arg),*) $(-> $ret)?,
            )*
        }

        impl $name {
            /// Every export this table binds.
            pub const SYMBOLS: &'static [&'static str] = &[$($symbol),*];

            /// Bind every entry from `dispatcher`'s symbol table.
            ///
            /// # Safety
            ///
            /// The declared signatures must match the library's exports.
            pub unsafe fn load(
                dispatcher: &$crate::dispatch::Dispatcher,
            ) -> $crate::error::InteropResult<Self> {
                Ok(Self {
                    $( $field: dispatcher.function($symbol)?, )*
                })
            }
        }
    };
}
