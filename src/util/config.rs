//! Configuration file support for tcbuild.
//!
//! Two locations are consulted:
//! - Global: `<config dir>/tcbuild/config.toml` - user-wide defaults
//! - Project: `<test-suite root>/.tcbuild/config.toml` - suite overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! and environment variables take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// tcbuild configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External installation paths
    pub paths: PathsConfig,

    /// Toolchain settings
    pub toolchain: ToolchainSettings,
}

/// Locations of external collaborators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// TET installation root (same as TET_ROOT)
    pub framework_root: Option<PathBuf>,

    /// DWARF library headers, used in generator mode
    pub dwarf_include: Option<PathBuf>,

    /// DWARF library directory, used in generator mode
    pub dwarf_lib: Option<PathBuf>,

    /// Directory holding the gzip test-data archives
    pub canonical_store: Option<PathBuf>,
}

/// Toolchain settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Path to the C compiler (e.g., /usr/bin/clang)
    pub cc: Option<PathBuf>,

    /// Path to the m4 macro processor
    pub m4: Option<PathBuf>,

    /// Additional C compiler flags
    pub cflags: Vec<String>,

    /// Additional linker flags
    pub ldflags: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.paths.framework_root.is_some() {
            self.paths.framework_root = other.paths.framework_root;
        }
        if other.paths.dwarf_include.is_some() {
            self.paths.dwarf_include = other.paths.dwarf_include;
        }
        if other.paths.dwarf_lib.is_some() {
            self.paths.dwarf_lib = other.paths.dwarf_lib;
        }
        if other.paths.canonical_store.is_some() {
            self.paths.canonical_store = other.paths.canonical_store;
        }

        if other.toolchain.cc.is_some() {
            self.toolchain.cc = other.toolchain.cc;
        }
        if other.toolchain.m4.is_some() {
            self.toolchain.m4 = other.toolchain.m4;
        }
        // Flag lists replace rather than append
        if !other.toolchain.cflags.is_empty() {
            self.toolchain.cflags = other.toolchain.cflags;
        }
        if !other.toolchain.ldflags.is_empty() {
            self.toolchain.ldflags = other.toolchain.ldflags;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`.tcbuild/config.toml` under the test-suite root)
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global config path.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "tcbuild", "tcbuild").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Get the project config path for a test-suite root.
pub fn project_config_path(ts_root: &Path) -> PathBuf {
    ts_root.join(".tcbuild").join("config.toml")
}
