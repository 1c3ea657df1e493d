//! cimgui-interop - Native Interop Layer for the cimgui C ABI
//!
//! Lets Rust code call into the Dear ImGui C binding and read or write its
//! structs in place, without copying them or owning their memory.
//!
//! # Features
//!
//! - **Typed views**: `TypedView<T>` over foreign struct addresses, with field
//!   offsets taken from `#[repr(C)]` mirrors
//! - **Foreign collections**: `ImVector`-style dynamic arrays, pointer arrays
//!   with explicit addressing, and inline fixed-length buffers
//! - **String marshaling**: scoped NUL-terminated UTF-8 buffers for outgoing
//!   strings, lossy decoding for incoming ones
//! - **Eager dispatch**: the native library and every required export are
//!   resolved once at startup, on a dynamic or embedded platform
//! - **Layout self-check**: declared struct sizes compared against the sizes
//!   the library reports
//!
//! # Example
//!
//! ```rust
//! use cimgui_interop::view::{DynamicArrayHeader, NativeHandle, NativeVector, TypedView};
//!
//! let mut items = [3.0f32, 1.5, 4.0];
//! let mut header = DynamicArrayHeader {
//!     size: 3,
//!     capacity: 3,
//!     data: NativeHandle::from_ptr(items.as_mut_ptr()),
//! };
//!
//! // Safety: header and items outlive the view
//! let vector: NativeVector<f32> = unsafe { NativeVector::from_header_ptr(&mut header) };
//! assert_eq!(vector.len(), 3);
//! assert_eq!(vector.at(1).unwrap(), 1.5);
//! assert!(vector.at(3).is_err());
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ imgui (ImGuiApi,     │  typed call surface + struct views
//! │ layouts, views)      │
//! └──────────┬───────────┘
//!            │
//!     ┌──────┴───────┬──────────────┐
//!     ▼              ▼              ▼
//! ┌────────┐   ┌──────────┐   ┌──────────┐
//! │dispatch│   │ marshal  │   │   view   │
//! └───┬────┘   └──────────┘   └────┬─────┘
//!     │                            │
//!     ▼                            ▼
//! ┌──────────────────┐       ┌──────────┐
//! │ libloading /     │       │   raw    │  the only unsafe memory access
//! │ embedded registry│       └──────────┘
//! └──────────────────┘
//! ```
//!
//! # Threading
//!
//! The wrapped library is single-threaded. Views and [`imgui::ImGuiApi`] are
//! `!Send`; only the process-wide [`dispatch::Dispatcher`] is shared.

#![warn(clippy::all)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod imgui;
pub mod layout;
pub mod marshal;
pub mod raw;
pub mod view;

pub use config::{ConfigError, InteropConfig};
pub use dispatch::{
    global, install, register_embedded, resolve, select_implementation, Dispatcher, DispatcherBuilder,
    EmbeddedLibrary, LayoutCheck, LibraryHandle, Platform, SymbolTable,
};
pub use error::{InteropError, InteropResult};
pub use layout::{verify_layouts, DeclaredLayout};
pub use marshal::{from_foreign, to_foreign, with_foreign_str, ForeignString};
pub use view::{
    Addressing, DynamicArrayHeader, InlineBuffer, NativeField, NativeHandle, NativeLayout, NativeVector,
    PointerArray, TypedView,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
