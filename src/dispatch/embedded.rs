//! Embedded Libraries
//!
//! Targets without a dynamic loader (wasm, iOS, fully static builds) link the
//! GUI library into the executable. Startup code registers its exports here
//! under a logical library name, and the embedded dispatcher resolves from
//! this registry instead of the system loader.

use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use log::debug;
use parking_lot::RwLock;

/// Exports of one statically linked library.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedLibrary {
    name: String,
    exports: HashMap<String, usize>,
}

impl EmbeddedLibrary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exports: HashMap::new(),
        }
    }

    /// Add an export. `address` is usually `some_extern_fn as *const ()`.
    pub fn with_export(mut self, symbol: impl Into<String>, address: *const ()) -> Self {
        self.export(symbol, address);
        self
    }

    pub fn export(&mut self, symbol: impl Into<String>, address: *const ()) {
        self.exports.insert(symbol.into(), address as usize);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol_address(&self, symbol: &str) -> Option<usize> {
        self.exports.get(symbol).copied().filter(|&addr| addr != 0)
    }

    pub fn export_count(&self) -> usize {
        self.exports.len()
    }
}

lazy_static! {
    /// Process-wide table of statically linked libraries
    static ref EMBEDDED_LIBRARIES: RwLock<HashMap<String, Arc<EmbeddedLibrary>>> =
        RwLock::new(HashMap::new());
}

/// Make `library` resolvable on [`Platform::Embedded`](super::Platform::Embedded).
///
/// Returns `false` if a library with the same name was already registered;
/// the first registration wins.
pub fn register_embedded(library: EmbeddedLibrary) -> bool {
    let mut libraries = EMBEDDED_LIBRARIES.write();
    if libraries.contains_key(library.name()) {
        debug!("embedded library '{}' already registered", library.name());
        return false;
    }
    debug!(
        "registered embedded library '{}' ({} exports)",
        library.name(),
        library.export_count()
    );
    libraries.insert(library.name().to_string(), Arc::new(library));
    true
}

/// Look up a registered embedded library.
pub fn embedded_library(name: &str) -> Option<Arc<EmbeddedLibrary>> {
    EMBEDDED_LIBRARIES.read().get(name).cloned()
}

/// Names of all registered embedded libraries.
pub fn embedded_library_names() -> Vec<String> {
    let mut names: Vec<String> = EMBEDDED_LIBRARIES.read().keys().cloned().collect();
    names.sort();
    names
}
