//! Directory scanner that builds a catalog from source files.
//!
//! Every eligible file under the root is parsed and handed to the
//! extractor; findings are folded into one entry per (name, default) key.
//! Each file also contributes a *base tag* and a *package name*, both
//! guessed from its path.
//!
//! A file that cannot be read or parsed aborts the whole scan. A partial
//! catalog would silently drop variables, which is worse than no catalog.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::analysis::{AnalysisError, EnvAccessExtractor, PythonExtractor, RawFinding};
use crate::catalog::{entry_key, Catalog, CatalogEntry, Location};

/// Directory names skipped unless the caller says otherwise.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[".venv", "__pycache__", ".git"];

/// Package name used when the path says nothing useful.
pub const UNKNOWN_PACKAGE: &str = "unknown_package";

/// Directories that hold code rather than name a component.
const SOURCE_ROOTS: &[&str] = &["src", "lib"];

/// Directories whose children are package names.
const PACKAGE_ROOTS: &[&str] = &["src", "lib", "packages"];

/// Errors that abort a scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// What to skip and whether to tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Directory names pruned at any depth.
    pub exclude_dirs: Vec<String>,
    /// Substrings of the root-relative path that exclude a file.
    pub exclude_patterns: Vec<String>,
    /// Derive a tag from each file's path.
    pub auto_tag: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|d| d.to_string()).collect(),
            exclude_patterns: Vec::new(),
            auto_tag: true,
        }
    }
}

impl ScanOptions {
    fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }

    fn is_excluded_path(&self, relative: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| relative.contains(pattern.as_str()))
    }
}

/// Result of a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub catalog: Catalog,
    /// Every call site found, counting repeats of the same key.
    pub total_references: usize,
    pub files_scanned: usize,
}

/// Scans a directory tree for environment variable reads.
pub struct Scanner {
    root: PathBuf,
    options: ScanOptions,
    extractor: Box<dyn EnvAccessExtractor>,
}

impl Scanner {
    /// Create a scanner for Python sources under `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, ScanError> {
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            options: ScanOptions::default(),
            extractor: Box::new(PythonExtractor::new()?),
        })
    }

    /// Set exclusions and tagging.
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Collect eligible files, sorted by path.
    pub fn collect_files(&self) -> Result<Vec<PathBuf>, ScanError> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !self.options.is_excluded_dir(&e.file_name().to_string_lossy())
            });

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !self.extractor.handles_extension(ext) {
                continue;
            }
            if self.options.is_excluded_path(&relative_display(self.relative(path))) {
                tracing::debug!(path = %path.display(), "excluded by pattern");
                continue;
            }
            files.push(path.to_path_buf());
        }

        Ok(files)
    }

    /// Scan the tree and aggregate findings into a catalog.
    pub fn scan(&self) -> Result<ScanOutcome, ScanError> {
        let files = self.collect_files()?;
        let mut aggregate = Aggregate::default();

        for path in &files {
            let findings = self.scan_file(path).map_err(|e| {
                tracing::error!(path = %path.display(), error = %e, "error processing file");
                e
            })?;

            let relative = self.relative(path);
            let file = relative_display(relative);
            let tag = self.options.auto_tag.then(|| base_tag(relative));
            let package = package_name(relative);

            tracing::debug!(path = %file, findings = findings.len(), "scanned");
            for finding in findings {
                aggregate.add(finding, &file, tag.as_deref(), &package);
            }
        }

        tracing::info!(
            files = files.len(),
            unique = aggregate.entries.len(),
            references = aggregate.total,
            "scan complete"
        );

        Ok(ScanOutcome {
            catalog: Catalog::from_entries(aggregate.entries),
            total_references: aggregate.total,
            files_scanned: files.len(),
        })
    }

    fn scan_file(&self, path: &Path) -> Result<Vec<RawFinding>, ScanError> {
        // sources must be UTF-8; anything else is a read error
        let source = fs::read_to_string(path).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = self.extractor.parse(self.relative(path), source.as_bytes())?;
        Ok(self.extractor.extract(&parsed))
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

/// Entries under construction, indexed by key.
#[derive(Default)]
struct Aggregate {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
    total: usize,
}

impl Aggregate {
    fn add(&mut self, finding: RawFinding, file: &str, tag: Option<&str>, package: &str) {
        self.total += 1;

        let key = entry_key(&finding.name, finding.default_value.as_ref());
        let inferred = finding.inferred_type.unwrap_or_default();

        let idx = match self.index.get(&key) {
            Some(&idx) => {
                let entry = &mut self.entries[idx];
                // first occurrence wins; later ones only fill a gap
                if entry.inferred_type.is_empty() {
                    entry.inferred_type = inferred;
                }
                idx
            }
            None => {
                let mut entry =
                    CatalogEntry::new(finding.name, finding.has_default, finding.default_value);
                entry.inferred_type = inferred;
                self.entries.push(entry);
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[idx];
        if let Some(tag) = tag {
            entry.tags.insert(tag.to_string());
        }
        entry.packages.insert(package.to_string());
        // repeated call sites are kept as-is; only merges deduplicate
        entry.locations.push(Location::new(file, finding.line));
    }
}

fn components(relative: &Path) -> Vec<String> {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            Component::CurDir => Some(".".to_string()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect()
}

/// Root-relative path with `/` separators, as stored in locations.
fn relative_display(relative: &Path) -> String {
    components(relative).join("/")
}

/// First directory of the path that names a component.
///
/// `api/handlers/x.py` → `api`, `src/worker/x.py` → `worker`; files at the
/// root have no base tag.
pub fn base_tag(relative: &Path) -> String {
    let parts = components(relative);
    let Some((_, dirs)) = parts.split_last() else {
        return String::new();
    };
    dirs.iter()
        .find(|part| !matches!(part.as_str(), "." | "..") && !SOURCE_ROOTS.contains(&part.as_str()))
        .cloned()
        .unwrap_or_default()
}

/// Best-effort package owning a file.
///
/// The segment after `src`, `lib` or `packages` wins; otherwise the file's
/// parent directory.
pub fn package_name(relative: &Path) -> String {
    let parts = components(relative);
    let last = parts.len().saturating_sub(1);
    for i in 1..parts.len() {
        if PACKAGE_ROOTS.contains(&parts[i - 1].as_str()) {
            return parts[i].clone();
        }
        if i == last {
            return parts[i - 1].clone();
        }
    }

    relative
        .parent()
        .and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().to_string())
        .filter(|name| !name.is_empty() && name != ".")
        .unwrap_or_else(|| UNKNOWN_PACKAGE.to_string())
}
