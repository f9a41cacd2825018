//! Envcatalog - environment variable catalog tool.
//!
//! Envcatalog finds every place a Python codebase reads an environment
//! variable, records them in a JSON catalog, and checks deployed
//! environments against that catalog.
//!
//! # Architecture
//!
//! - `analysis`: tree-sitter extraction of environment reads from one file
//! - `scan`: directory walk and aggregation into a catalog
//! - `catalog`: entry model, persistence, merge and tag operations
//! - `env`: existence checks (process environment, task definitions)
//! - `verify`: classification of catalog entries against an environment
//! - `proxy`: caching lookup wrapper for application code
//! - `report`: output formatting (text, JSON)
//! - `config`: YAML project configuration
//!
//! # Example
//!
//! ```no_run
//! use envcatalog::{verify, Catalog, ProcessEnv};
//!
//! # fn main() -> anyhow::Result<()> {
//! let catalog = Catalog::load("env_var_catalog.json")?;
//! let selected = catalog.filter_by_tag(&["api"]);
//! let warned = verify::must_pass_check(selected.entries(), false, &ProcessEnv)?;
//! if warned {
//!     eprintln!("some variables fall back to their defaults");
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod env;
pub mod proxy;
pub mod report;
pub mod scan;
pub mod verify;

pub use analysis::{EnvAccessExtractor, PythonExtractor, RawFinding};
pub use catalog::{Catalog, CatalogEntry, CatalogError, DefaultValue, KeyOrder, Location, MergeStats};
pub use config::Config;
pub use env::{ExistenceCheck, ProcessEnv, TaskDefinition};
pub use proxy::VarProxy;
pub use scan::{ScanError, ScanOptions, ScanOutcome, Scanner};
pub use verify::{EnvironmentVariableError, Status, VerificationReport};
