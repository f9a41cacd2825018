//! Catalog verification against an environment.
//!
//! Each entry is classified as exactly one of:
//!
//! - [`Status::Present`]: the variable is set, default or not.
//! - [`Status::Warning`]: unset, has a default, warnings not elevated.
//! - [`Status::Error`]: unset and either no default or warnings elevated.
//!
//! [`verify`] classifies the whole catalog and returns the outcome as data;
//! [`must_pass_check`] stops at the first failure with a typed error, for
//! use as a startup gate.

mod gate;

pub use gate::{must_pass_check, EnvironmentVariableError};

use serde::Serialize;

use crate::catalog::CatalogEntry;
use crate::env::ExistenceCheck;

/// Outcome of checking one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Present,
    Warning,
    Error,
}

/// Classify a single entry.
pub fn classify<E>(entry: &CatalogEntry, warning_as_error: bool, exists: &E) -> Status
where
    E: ExistenceCheck + ?Sized,
{
    if exists.exists(&entry.name) {
        Status::Present
    } else if entry.has_default && !warning_as_error {
        Status::Warning
    } else {
        Status::Error
    }
}

/// A classified entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryCheck<'a> {
    pub entry: &'a CatalogEntry,
    pub status: Status,
}

impl EntryCheck<'_> {
    /// True when the entry failed only because its default is not allowed.
    pub fn is_elevated_default(&self) -> bool {
        self.status == Status::Error && self.entry.has_default
    }
}

/// Counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub present: usize,
    pub warnings: usize,
    pub errors: usize,
    /// Errors caused by elevating a default; included in `errors`.
    pub elevated_defaults: usize,
}

/// Result of verifying a catalog.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport<'a> {
    pub checks: Vec<EntryCheck<'a>>,
    pub warning_as_error: bool,
}

impl VerificationReport<'_> {
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            total: self.checks.len(),
            ..Summary::default()
        };
        for check in &self.checks {
            match check.status {
                Status::Present => summary.present += 1,
                Status::Warning => summary.warnings += 1,
                Status::Error => {
                    summary.errors += 1;
                    if check.is_elevated_default() {
                        summary.elevated_defaults += 1;
                    }
                }
            }
        }
        summary
    }

    /// False if any entry is an error.
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.status != Status::Error)
    }
}

/// Classify every entry, in order.
pub fn verify<'a, E>(
    entries: &'a [CatalogEntry],
    warning_as_error: bool,
    exists: &E,
) -> VerificationReport<'a>
where
    E: ExistenceCheck + ?Sized,
{
    let checks = entries
        .iter()
        .map(|entry| EntryCheck {
            entry,
            status: classify(entry, warning_as_error, exists),
        })
        .collect::<Vec<_>>();

    let report = VerificationReport {
        checks,
        warning_as_error,
    };
    let summary = report.summary();
    tracing::debug!(
        total = summary.total,
        present = summary.present,
        warnings = summary.warnings,
        errors = summary.errors,
        "verification complete"
    );
    report
}
