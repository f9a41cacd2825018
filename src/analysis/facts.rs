//! Data produced by extraction.

use thiserror::Error;

use crate::catalog::DefaultValue;

/// One environment variable read, as found at a single call site.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFinding {
    /// Variable name (the literal first argument).
    pub name: String,
    /// True when a second positional argument was passed.
    pub has_default: bool,
    /// The default literal, [`DefaultValue::NonConstant`] for expressions,
    /// `None` when absent or the `None` literal.
    pub default_value: Option<DefaultValue>,
    /// 1-indexed line of the call.
    pub line: usize,
    /// Best-effort type name, if one could be determined.
    pub inferred_type: Option<String>,
}

/// Errors raised while preparing or parsing a source file.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("failed to load grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("invalid extraction query: {0}")]
    Query(#[from] tree_sitter::QueryError),
    #[error("failed to parse {path}")]
    Unparsable { path: String },
    #[error("syntax error in {path} at line {line}")]
    Syntax { path: String, line: usize },
}
