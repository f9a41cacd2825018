//! Fail-fast verification for service startup.

use thiserror::Error;

use super::{classify, Status};
use crate::catalog::CatalogEntry;
use crate::env::ExistenceCheck;

/// Why a gated check failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentVariableError {
    #[error("Required environment variable '{name}' is missing")]
    RequiredVariableMissing { name: String },
    #[error(
        "Environment variable '{name}' is missing and using default '{default}', but warnings are treated as errors"
    )]
    DefaultUsedAsError { name: String, default: String },
}

impl EnvironmentVariableError {
    /// Name of the offending variable.
    pub fn name(&self) -> &str {
        match self {
            Self::RequiredVariableMissing { name } | Self::DefaultUsedAsError { name, .. } => name,
        }
    }
}

/// Check entries in order, failing on the first error.
///
/// Returns whether any entry fell back to its default. Entries after the
/// first failure are not consulted.
pub fn must_pass_check<E>(
    entries: &[CatalogEntry],
    warning_as_error: bool,
    exists: &E,
) -> Result<bool, EnvironmentVariableError>
where
    E: ExistenceCheck + ?Sized,
{
    let mut warning_found = false;
    for entry in entries {
        match classify(entry, warning_as_error, exists) {
            Status::Present => {}
            Status::Warning => warning_found = true,
            Status::Error if entry.has_default => {
                return Err(EnvironmentVariableError::DefaultUsedAsError {
                    name: entry.name.clone(),
                    default: entry.default_text(),
                });
            }
            Status::Error => {
                return Err(EnvironmentVariableError::RequiredVariableMissing {
                    name: entry.name.clone(),
                });
            }
        }
    }
    Ok(warning_found)
}
