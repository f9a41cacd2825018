//! AST-backed extraction of environment variable reads.
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Source File     │────▶│ Extractor    │────▶│ RawFinding    │
//! └─────────────────┘     │ (tree-sitter │     │ (name,default,│
//!                         │  query)      │     │  line, type)  │
//!                         └──────────────┘     └───────────────┘
//! ```
//!
//! Two call shapes are recognised, `os.environ.get("NAME", default)` and
//! `os.getenv("NAME", default)`. Names computed at runtime are skipped
//! silently: only literal names can be catalogued.
//!
//! Type inference needs the node enclosing each call. Tree-sitter keeps
//! parent links in the tree itself, so the extractor never tracks parents
//! while walking.

mod annotation;
mod facts;
mod literal;
mod python;
mod traits;

pub use facts::{AnalysisError, RawFinding};
pub use python::PythonExtractor;
pub use traits::{EnvAccessExtractor, ParsedFile};
