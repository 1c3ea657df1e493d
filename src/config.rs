//! Interop Configuration
//!
//! Handles parsing and management of cimgui.toml configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::dispatch::Platform;

/// File searched for by [`InteropConfig::find_and_load`].
pub const CONFIG_FILE_NAME: &str = "cimgui.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching cimgui.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct InteropConfig {
    /// Native library resolution
    #[serde(default)]
    pub library: LibraryConfig,

    /// Startup layout self-check
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl InteropConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Find and load configuration by searching up from the given directory.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                // Reached root without finding config
                return Ok(Self::default());
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Platform to resolve on, running the capability check for `auto`.
    pub fn platform(&self) -> Platform {
        self.library.platform.fixed().unwrap_or_else(Platform::detect)
    }
}

/// Requested platform, `auto` deferring to the capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlatformChoice {
    #[default]
    Auto,
    Dynamic,
    Embedded,
}

impl PlatformChoice {
    /// The explicit platform, or `None` for `auto`.
    pub fn fixed(self) -> Option<Platform> {
        match self {
            PlatformChoice::Auto => None,
            PlatformChoice::Dynamic => Some(Platform::Dynamic),
            PlatformChoice::Embedded => Some(Platform::Embedded),
        }
    }
}

/// Native library resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryConfig {
    /// Logical library name (file name derived per platform)
    #[serde(default = "default_library_name")]
    pub name: String,

    /// auto | dynamic | embedded
    #[serde(default)]
    pub platform: PlatformChoice,

    /// Directories searched before the platform defaults
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Extra exports that must be present, on top of the ones the bindings need
    #[serde(default)]
    pub required_symbols: Vec<String>,
}

fn default_library_name() -> String {
    "cimgui".to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            name: default_library_name(),
            platform: PlatformChoice::Auto,
            search_paths: Vec::new(),
            required_symbols: Vec::new(),
        }
    }
}

/// Startup layout self-check settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutConfig {
    /// Run the check at startup
    #[serde(default = "default_true")]
    pub verify: bool,

    /// Export with signature `size_t f(const char* type_name)`
    #[serde(default = "default_size_query")]
    pub size_query: String,
}

fn default_true() -> bool {
    true
}

fn default_size_query() -> String {
    "cimguiSizeOf".to_string()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            verify: true,
            size_query: default_size_query(),
        }
    }
}
