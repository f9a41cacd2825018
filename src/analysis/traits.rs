//! Core traits for environment access extraction.

use std::path::Path;

use super::{AnalysisError, RawFinding};

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// Kept separate from the findings so a tree can be inspected again
/// without re-parsing.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The source bytes, kept for node text extraction.
    pub source: Vec<u8>,
    /// The file path (for error reporting).
    pub path: String,
}

/// Language-specific extractor of environment variable reads.
///
/// # Thread Safety
///
/// tree_sitter::Parser is not Sync, so implementations create parsers
/// as needed.
pub trait EnvAccessExtractor: Send + Sync {
    /// Returns the language identifier (e.g., "python").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this extractor handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse a source file.
    ///
    /// Unlike most analyzers, a tree with syntax errors is rejected: a
    /// file that does not parse cannot be catalogued reliably.
    fn parse(&self, path: &Path, source: &[u8]) -> Result<ParsedFile, AnalysisError>;

    /// Every literal-named environment read in the file, in source order.
    fn extract(&self, parsed: &ParsedFile) -> Vec<RawFinding>;

    /// Check if this extractor handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
