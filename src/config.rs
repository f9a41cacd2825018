//! Project configuration.
//!
//! An optional YAML file sets per-project defaults so the same flags need
//! not be repeated on every invocation:
//!
//! ```yaml
//! catalog: config/env_var_catalog.json
//! exclude_dirs: [build, node_modules]
//! exclude_patterns: [migrations/]
//! auto_tag: true
//! warning_as_error: false
//! ```
//!
//! Command-line flags extend the lists and override the scalars.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scan::ScanOptions;

/// Config file names searched for, in order.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["envcatalog.yaml", ".envcatalog.yaml"];

/// Catalog path used when neither flag nor config names one.
pub const DEFAULT_CATALOG: &str = "env_var_catalog.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Catalog file path.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// Directory names excluded in addition to the built-in ones.
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
    /// Path substrings excluded from scans.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    /// Derive tags from paths; on unless set to false.
    #[serde(default)]
    pub auto_tag: Option<bool>,
    #[serde(default)]
    pub warning_as_error: bool,
}

impl Config {
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse_str(content: &str) -> Result<Self, serde_yaml::Error> {
        // an empty file is a valid, empty config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Load `explicit` if given, else the first default-named file in `dir`,
    /// else an empty config.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match discover_config(dir) {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        tracing::debug!(path = %path.display(), "loading config");
        Self::parse_file(path)
    }

    /// Catalog path from the flag, the config, or the default.
    pub fn catalog_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.catalog.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG))
    }

    /// Scan options combining built-in defaults, this config and flags.
    pub fn scan_options(
        &self,
        exclude_dirs: &[String],
        exclude_patterns: &[String],
        no_auto_tag: bool,
    ) -> ScanOptions {
        let mut options = ScanOptions::default();
        options.exclude_dirs.extend(self.exclude_dirs.iter().cloned());
        options.exclude_dirs.extend(exclude_dirs.iter().cloned());
        options
            .exclude_patterns
            .extend(self.exclude_patterns.iter().cloned());
        options.exclude_patterns.extend(exclude_patterns.iter().cloned());
        options.auto_tag = !no_auto_tag && self.auto_tag.unwrap_or(true);
        options
    }
}

/// Find a config file in `dir`.
pub fn discover_config(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}
