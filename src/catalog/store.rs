//! Reading and writing catalog files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use super::Catalog;

/// Errors raised while loading or persisting a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog file '{}' not found", .path.display())]
    NotFound { path: PathBuf },
    #[error("catalog file '{}' contains invalid JSON: {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read catalog '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write catalog to '{}': {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Object key order used when writing a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrder {
    /// Fields in declaration order (create and update).
    Declared,
    /// Fields sorted alphabetically (tag maintenance).
    Sorted,
}

impl Catalog {
    /// Load a catalog from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                CatalogError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                CatalogError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&content).map_err(|source| CatalogError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a catalog if the file exists, otherwise start empty.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        match Self::load(path) {
            Err(CatalogError::NotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Render the catalog as pretty-printed JSON.
    pub fn to_json(&self, order: KeyOrder) -> Result<String, CatalogError> {
        let json = match order {
            KeyOrder::Declared => serde_json::to_string_pretty(self)?,
            KeyOrder::Sorted => serde_json::to_string_pretty(&sort_keys(serde_json::to_value(self)?))?,
        };
        Ok(json)
    }

    /// Write the catalog to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P, order: KeyOrder) -> Result<(), CatalogError> {
        let path = path.as_ref();
        let json = self.to_json(order)?;
        fs::write(path, json).map_err(|source| CatalogError::Save {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), entries = self.len(), "catalog written");
        Ok(())
    }
}

/// Rebuild every object with its keys in alphabetical order.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<(String, Value)> = map.into_iter().collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
