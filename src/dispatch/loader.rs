//! Dynamic Library Loader
//!
//! Locates and opens the native shared object with libloading.

use std::fmt;
use std::path::{Path, PathBuf};

use libloading::Library;
use log::debug;

use super::Platform;
use crate::error::{InteropError, InteropResult};

/// A shared object opened with the platform loader.
///
/// Unloaded when dropped; the process-wide dispatcher keeps it until exit.
pub struct DynamicLibrary {
    /// Path or file name that was opened
    path: PathBuf,
    library: Library,
}

impl fmt::Debug for DynamicLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicLibrary")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl DynamicLibrary {
    /// Open the shared object at `path`.
    pub fn open(library: &str, path: impl AsRef<Path>) -> InteropResult<Self> {
        let path = path.as_ref().to_path_buf();

        // Safety: loading runs the library's initializers. We trust the
        // configured library to be the GUI binary it claims to be.
        let handle = unsafe {
            Library::new(&path).map_err(|e| InteropError::LoadFailed {
                library: library.to_string(),
                platform: Platform::Dynamic,
                message: format!("{}: {}", path.display(), e),
            })?
        };

        Ok(Self {
            path,
            library: handle,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Address of an exported symbol, `None` when absent or null.
    pub fn symbol_address(&self, name: &str) -> Option<usize> {
        // Safety: the symbol is only read as an address here; its type is
        // asserted later at the typed call site.
        let symbol = unsafe { self.library.get::<*const ()>(name.as_bytes()) };
        match symbol {
            Ok(symbol) => {
                let addr = *symbol as usize;
                (addr != 0).then_some(addr)
            }
            Err(e) => {
                debug!("symbol '{}' not in {}: {}", name, self.path.display(), e);
                None
            }
        }
    }
}

/// Finds a shared object from a logical library name.
#[derive(Debug, Clone)]
pub struct LibraryLocator {
    search_paths: Vec<PathBuf>,
}

impl LibraryLocator {
    pub fn new() -> Self {
        Self {
            search_paths: default_search_paths(),
        }
    }

    /// Search `path` before the defaults.
    pub fn add_search_path(&mut self, path: impl AsRef<Path>) {
        self.search_paths.insert(0, path.as_ref().to_path_buf());
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// First existing candidate file for `name`.
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        let path = Path::new(name);
        if path.components().count() > 1 && path.exists() {
            return Some(path.to_path_buf());
        }

        let file_name = library_filename(name);
        self.search_paths
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.exists())
    }

    /// Locate and open `name`.
    ///
    /// Falls back to the system loader's own lookup (ld cache, rpath, PATH)
    /// with the platform file name when no search path has it.
    pub fn open(&self, name: &str) -> InteropResult<DynamicLibrary> {
        if let Some(path) = self.find(name) {
            debug!("found '{}' at {}", name, path.display());
            return DynamicLibrary::open(name, path);
        }

        let file_name = library_filename(name);
        debug!("'{}' not in search paths, asking the system loader for {}", name, file_name);
        match DynamicLibrary::open(name, &file_name) {
            Err(InteropError::LoadFailed { message, .. }) if is_missing_file(&message, &file_name) => {
                Err(InteropError::LibraryNotFound {
                    library: name.to_string(),
                    platform: Platform::Dynamic,
                    searched: self.describe_search(&file_name, &message),
                })
            }
            // Found by the system loader but rejected: keep the loader's reason
            other => other,
        }
    }

    fn describe_search(&self, file_name: &str, loader_message: &str) -> String {
        let mut searched: Vec<String> = self
            .search_paths
            .iter()
            .map(|dir| dir.join(file_name).display().to_string())
            .collect();
        searched.push(format!("system loader: {}", loader_message));
        searched.join(", ")
    }
}

/// Whether a loader error says `file_name` itself does not exist, as opposed
/// to a missing dependency, a wrong architecture or a failing initializer.
fn is_missing_file(message: &str, file_name: &str) -> bool {
    const NOT_FOUND: [&str; 3] = ["no such file", "image not found", "could not be found"];

    let lower = message.to_ascii_lowercase();
    if !NOT_FOUND.iter().any(|marker| lower.contains(marker)) {
        return false;
    }
    // Windows does not say which module was missing
    if cfg!(target_os = "windows") {
        return true;
    }
    // The first segment is our own path prefix; a dependency failure names
    // the dependency in the rest
    message
        .split(": ")
        .skip(1)
        .any(|part| part.contains(file_name))
}

impl Default for LibraryLocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the default library search paths for this platform
fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // Current directory
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd);
    }

    // Next to the executable, where bundled native libraries usually sit
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(dir);
    }

    #[cfg(target_os = "linux")]
    {
        paths.push(PathBuf::from("/usr/local/lib"));
        paths.push(PathBuf::from("/usr/lib"));

        if let Ok(ld_path) = std::env::var("LD_LIBRARY_PATH") {
            paths.extend(ld_path.split(':').filter(|p| !p.is_empty()).map(PathBuf::from));
        }
    }

    #[cfg(target_os = "macos")]
    {
        paths.push(PathBuf::from("/usr/local/lib"));
        paths.push(PathBuf::from("/opt/homebrew/lib"));

        if let Ok(dyld_path) = std::env::var("DYLD_LIBRARY_PATH") {
            paths.extend(dyld_path.split(':').filter(|p| !p.is_empty()).map(PathBuf::from));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(path) = std::env::var("PATH") {
            paths.extend(path.split(';').filter(|p| !p.is_empty()).map(PathBuf::from));
        }
    }

    paths
}

/// Construct the platform-specific library filename.
///
/// Names that already carry a platform extension (including versioned
/// `.so.N` names) are used unchanged.
pub fn library_filename(name: &str) -> String {
    #[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
    {
        if name.contains(".so") {
            name.to_string()
        } else if name.starts_with("lib") {
            format!("{}.so", name)
        } else {
            format!("lib{}.so", name)
        }
    }

    #[cfg(target_os = "macos")]
    {
        if name.ends_with(".dylib") {
            name.to_string()
        } else if name.starts_with("lib") {
            format!("{}.dylib", name)
        } else {
            format!("lib{}.dylib", name)
        }
    }

    #[cfg(target_os = "windows")]
    {
        if name.to_ascii_lowercase().ends_with(".dll") {
            name.to_string()
        } else {
            format!("{}.dll", name)
        }
    }

    #[cfg(not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd",
        target_os = "macos",
        target_os = "windows"
    )))]
    {
        name.to_string()
    }
}
