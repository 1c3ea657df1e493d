//! Foreign Symbol Table and Dispatcher
//!
//! Resolves the native GUI library for the running platform and eagerly
//! binds every entry point the bindings need.
//!
//! # Architecture
//!
//! ```text
//! select_implementation(config, required)      (once per process)
//!       │
//!       ▼
//! Platform::detect() / config override ──► Platform::{Dynamic, Embedded}
//!       │
//!       ▼
//! resolve(name, platform) ──► LibraryHandle::{Dynamic(libloading), Embedded(registry)}
//!       │
//!       ▼
//! SymbolTable::build(handle, required)   fails on the first missing export
//!       │
//!       ▼
//! layout self-check (optional size-query export)
//!       │
//!       ▼
//! &'static Dispatcher
//! ```
//!
//! Nothing resolves lazily: a binding/binary mismatch surfaces before any
//! GUI call is attempted.

mod embedded;
pub mod functions;
mod loader;

use std::collections::HashMap;
use std::ffi::c_char;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, error, info, warn};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

pub use embedded::{embedded_library, embedded_library_names, register_embedded, EmbeddedLibrary};
pub use loader::{library_filename, DynamicLibrary, LibraryLocator};

use crate::config::InteropConfig;
use crate::error::{InteropError, InteropResult};
use crate::layout::{verify_layouts, DeclaredLayout};
use crate::marshal;
use crate::view::NativeHandle;

/// How the native library reaches the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Conventional shared object opened at runtime
    Dynamic,
    /// Linked into the executable; exports come from the embedded registry
    Embedded,
}

impl Platform {
    /// Capability check: targets without a dynamic loader are embedded.
    pub fn detect() -> Self {
        if cfg!(any(target_family = "wasm", target_os = "ios")) {
            Platform::Embedded
        } else {
            Platform::Dynamic
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Dynamic => write!(f, "dynamic"),
            Platform::Embedded => write!(f, "embedded"),
        }
    }
}

/// An opened native library, one variant per platform.
#[derive(Debug)]
pub enum LibraryHandle {
    Dynamic {
        name: String,
        library: DynamicLibrary,
    },
    Embedded(Arc<EmbeddedLibrary>),
}

impl LibraryHandle {
    pub fn name(&self) -> &str {
        match self {
            LibraryHandle::Dynamic { name, .. } => name,
            LibraryHandle::Embedded(library) => library.name(),
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            LibraryHandle::Dynamic { .. } => Platform::Dynamic,
            LibraryHandle::Embedded(_) => Platform::Embedded,
        }
    }

    /// Raw export lookup, bypassing any symbol table.
    pub fn symbol_address(&self, symbol: &str) -> Option<usize> {
        match self {
            LibraryHandle::Dynamic { library, .. } => library.symbol_address(symbol),
            LibraryHandle::Embedded(library) => library.symbol_address(symbol),
        }
    }
}

/// Locate the native library `name` for `platform`.
///
/// `search_paths` are tried before the platform defaults and only matter for
/// [`Platform::Dynamic`].
pub fn resolve(name: &str, platform: Platform, search_paths: &[PathBuf]) -> InteropResult<LibraryHandle> {
    debug!("resolving '{}' for {} platform", name, platform);
    let handle = match platform {
        Platform::Dynamic => {
            let mut locator = LibraryLocator::new();
            for path in search_paths.iter().rev() {
                locator.add_search_path(path);
            }
            LibraryHandle::Dynamic {
                name: name.to_string(),
                library: locator.open(name)?,
            }
        }
        Platform::Embedded => {
            let library = embedded_library(name).ok_or_else(|| InteropError::LibraryNotFound {
                library: name.to_string(),
                platform,
                searched: format!("embedded registry: [{}]", embedded_library_names().join(", ")),
            })?;
            LibraryHandle::Embedded(library)
        }
    };
    Ok(handle)
}

/// Reinterpret a resolved address as the function pointer type `F`.
///
/// # Safety
///
/// `F` must be an `extern "C" fn` type matching the export's real signature.
/// A non-pointer-sized `F` is rejected at compile time.
pub unsafe fn cast_function<F: Copy>(address: usize) -> F {
    const {
        assert!(
            std::mem::size_of::<F>() == std::mem::size_of::<usize>(),
            "function type must be pointer-sized"
        )
    };
    std::mem::transmute_copy::<usize, F>(&address)
}

/// Resolve `symbol` in `handle` as a typed callable.
///
/// # Safety
///
/// Same contract as [`cast_function`].
pub unsafe fn load_function<F: Copy>(handle: &LibraryHandle, symbol: &str) -> InteropResult<F> {
    let address = handle
        .symbol_address(symbol)
        .ok_or_else(|| InteropError::SymbolNotFound {
            symbol: symbol.to_string(),
            library: handle.name().to_string(),
        })?;
    Ok(cast_function(address))
}

/// Immutable name → address map, built once.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: HashMap<String, usize>,
}

impl SymbolTable {
    /// Resolve every name in `required`. Any absent export fails the whole
    /// build; every missing name is logged before the first one is returned.
    pub fn build(handle: &LibraryHandle, required: &[&str]) -> InteropResult<Self> {
        let mut entries = HashMap::with_capacity(required.len());
        let mut missing = Vec::new();

        for &symbol in required {
            match handle.symbol_address(symbol) {
                Some(address) => {
                    entries.insert(symbol.to_string(), address);
                }
                None => {
                    error!("'{}' does not export '{}'", handle.name(), symbol);
                    missing.push(symbol);
                }
            }
        }

        if let Some(first) = missing.first() {
            return Err(InteropError::SymbolNotFound {
                symbol: first.to_string(),
                library: handle.name().to_string(),
            });
        }

        debug!("bound {} symbols from '{}'", entries.len(), handle.name());
        Ok(Self { entries })
    }

    pub fn get(&self, symbol: &str) -> Option<NativeHandle> {
        self.entries.get(symbol).map(|&addr| NativeHandle::from_address(addr))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by name.
    pub fn entries(&self) -> Vec<(&str, NativeHandle)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(name, &addr)| (name.as_str(), NativeHandle::from_address(addr)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Outcome of the startup layout self-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "checked")]
pub enum LayoutCheck {
    /// The library reported sizes and all of them matched
    Verified(usize),
    /// The library exposes no size query, or nothing was declared
    Skipped,
}

/// A resolved library plus its eagerly bound symbol table.
#[derive(Debug)]
pub struct Dispatcher {
    library: LibraryHandle,
    symbols: SymbolTable,
    size_query: Option<String>,
    layout_check: LayoutCheck,
}

impl Dispatcher {
    pub fn builder(library: impl Into<String>) -> DispatcherBuilder {
        DispatcherBuilder::new(library)
    }

    pub fn library_name(&self) -> &str {
        self.library.name()
    }

    pub fn platform(&self) -> Platform {
        self.library.platform()
    }

    pub fn library(&self) -> &LibraryHandle {
        &self.library
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Result of the self-check run when this dispatcher was built.
    pub fn layout_check(&self) -> LayoutCheck {
        self.layout_check
    }

    /// Re-run the layout self-check against another set of declared layouts.
    pub fn verify_layouts(&self, layouts: &[DeclaredLayout]) -> InteropResult<LayoutCheck> {
        check_layouts(&self.library, self.size_query.as_deref(), layouts)
    }

    /// Address bound for `symbol` at startup.
    pub fn symbol_address(&self, symbol: &str) -> InteropResult<NativeHandle> {
        self.symbols
            .get(symbol)
            .ok_or_else(|| InteropError::SymbolNotFound {
                symbol: symbol.to_string(),
                library: self.library_name().to_string(),
            })
    }

    /// Typed callable for a symbol bound at startup.
    ///
    /// # Safety
    ///
    /// `F` must be an `extern "C" fn` type matching the export's real signature.
    pub unsafe fn function<F: Copy>(&self, symbol: &str) -> InteropResult<F> {
        let address = self.symbol_address(symbol)?;
        Ok(cast_function(address.address()))
    }
}

/// Signature of the optional size-query export: `size_t f(const char* type_name)`,
/// returning 0 for unknown names.
pub type SizeQueryFn = unsafe extern "C" fn(*const c_char) -> usize;

/// Step-by-step construction of a [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct DispatcherBuilder {
    library: String,
    platform: Option<Platform>,
    search_paths: Vec<PathBuf>,
    required: Vec<String>,
    layouts: Vec<DeclaredLayout>,
    size_query: Option<String>,
}

impl DispatcherBuilder {
    pub fn new(library: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            platform: None,
            search_paths: Vec::new(),
            required: Vec::new(),
            layouts: Vec::new(),
            size_query: None,
        }
    }

    /// Builder seeded from a configuration file.
    pub fn from_config(config: &InteropConfig) -> Self {
        let mut builder = Self::new(config.library.name.clone()).search_paths(config.library.search_paths.clone());
        builder.platform = config.library.platform.fixed();
        builder.required = config.library.required_symbols.clone();
        if config.layout.verify {
            builder.size_query = Some(config.layout.size_query.clone());
        }
        builder
    }

    /// Force a platform instead of running the capability check.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    pub fn search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths.extend(paths);
        self
    }

    pub fn require<S: AsRef<str>>(mut self, symbols: impl IntoIterator<Item = S>) -> Self {
        for symbol in symbols {
            let symbol = symbol.as_ref();
            if !self.required.iter().any(|s| s == symbol) {
                self.required.push(symbol.to_string());
            }
        }
        self
    }

    /// Declare struct sizes for the startup self-check.
    pub fn layouts(mut self, layouts: impl IntoIterator<Item = DeclaredLayout>) -> Self {
        self.layouts.extend(layouts);
        self
    }

    /// Name of the export used to query struct sizes.
    pub fn size_query(mut self, symbol: impl Into<String>) -> Self {
        self.size_query = Some(symbol.into());
        self
    }

    /// Resolve, bind and verify. No partially bound dispatcher is ever returned.
    pub fn build(self) -> InteropResult<Dispatcher> {
        let platform = self.platform.unwrap_or_else(Platform::detect);
        let library = resolve(&self.library, platform, &self.search_paths).map_err(|e| {
            error!("{}", e);
            e
        })?;

        let required: Vec<&str> = self.required.iter().map(String::as_str).collect();
        let symbols = SymbolTable::build(&library, &required)?;
        let layout_check = check_layouts(&library, self.size_query.as_deref(), &self.layouts)?;

        info!(
            "bound '{}' via {} dispatcher ({} symbols, layout {:?})",
            library.name(),
            platform,
            symbols.len(),
            layout_check
        );

        Ok(Dispatcher {
            library,
            symbols,
            size_query: self.size_query,
            layout_check,
        })
    }
}

fn check_layouts(
    library: &LibraryHandle,
    size_query: Option<&str>,
    layouts: &[DeclaredLayout],
) -> InteropResult<LayoutCheck> {
    let Some(query) = size_query else {
        return Ok(LayoutCheck::Skipped);
    };
    if layouts.is_empty() {
        return Ok(LayoutCheck::Skipped);
    }
    let Some(address) = library.symbol_address(query) else {
        warn!(
            "'{}' has no '{}' export, skipping layout self-check",
            library.name(),
            query
        );
        return Ok(LayoutCheck::Skipped);
    };

    // Safety: the configured size query has the SizeQueryFn signature.
    let query_size: SizeQueryFn = unsafe { cast_function(address) };
    let checked = verify_layouts(layouts, |name| {
        let reported = marshal::with_foreign_str(name, |ptr| unsafe { query_size(ptr) });
        (reported != 0).then_some(reported)
    })?;
    Ok(LayoutCheck::Verified(checked))
}

static GLOBAL: OnceCell<Dispatcher> = OnceCell::new();

/// Build the process-wide dispatcher from `config`, exactly once.
///
/// Later calls return the dispatcher chosen by the first successful call and
/// ignore `config` and `layouts`. Their `required` symbols are still checked
/// against its table, so a binding set the first call never bound fails here
/// with [`InteropError::SymbolNotFound`] rather than at call time.
pub fn select_implementation(
    config: &InteropConfig,
    required: &[&str],
    layouts: &[DeclaredLayout],
) -> InteropResult<&'static Dispatcher> {
    if let Some(existing) = GLOBAL.get() {
        debug!("dispatcher already selected ({})", existing.platform());
    }
    let dispatcher = GLOBAL.get_or_try_init(|| {
        DispatcherBuilder::from_config(config)
            .require(required.iter().copied())
            .layouts(layouts.iter().cloned())
            .build()
    })?;
    ensure_bound(dispatcher, required)?;
    Ok(dispatcher)
}

fn ensure_bound(dispatcher: &Dispatcher, required: &[&str]) -> InteropResult<()> {
    match required.iter().find(|symbol| !dispatcher.symbols.contains(symbol)) {
        Some(symbol) => {
            error!(
                "'{}' was selected without '{}' bound",
                dispatcher.library_name(),
                symbol
            );
            Err(InteropError::SymbolNotFound {
                symbol: symbol.to_string(),
                library: dispatcher.library_name().to_string(),
            })
        }
        None => Ok(()),
    }
}

/// Install an already built dispatcher as the process-wide one.
pub fn install(dispatcher: Dispatcher) -> InteropResult<&'static Dispatcher> {
    GLOBAL
        .set(dispatcher)
        .map_err(|_| InteropError::AlreadyInitialized)?;
    global()
}

/// The process-wide dispatcher.
pub fn global() -> InteropResult<&'static Dispatcher> {
    GLOBAL.get().ok_or(InteropError::NotInitialized)
}
