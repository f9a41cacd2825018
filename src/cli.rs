//! Command-line interface for envcatalog.

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, KeyOrder};
use crate::config::Config;
use crate::env::{ExistenceCheck, ProcessEnv, TaskDefinition};
use crate::report;
use crate::scan::{ScanOutcome, Scanner};
use crate::verify;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Environment variable catalog tool.
///
/// Scans Python sources for environment variable reads, keeps a JSON
/// catalog of them up to date, and verifies that an environment defines
/// what the catalog says a service needs.
#[derive(Parser)]
#[command(name = "envcatalog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config YAML file (default: auto-discover)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new catalog from a scan
    Create(CreateArgs),
    /// Merge a fresh scan into an existing catalog
    Update(CreateArgs),
    /// Report variables in code that are missing from the catalog
    Check(CheckArgs),
    /// Verify that the catalog's variables are defined
    Verify(VerifyArgs),
    /// Tag catalog variables that are defined in an environment
    #[command(visible_alias = "tags_from_env")]
    TagsFromEnv(TagsFromEnvArgs),
}

/// Options shared by every command that scans.
#[derive(Args)]
pub struct ScanArgs {
    /// Root directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Directory name to exclude (repeatable, adds to .venv, __pycache__, .git)
    #[arg(long = "exclude-dir")]
    pub exclude_dir: Vec<String>,

    /// Path substring to exclude (repeatable)
    #[arg(long = "exclude-pattern")]
    pub exclude_pattern: Vec<String>,

    /// Do not infer tags from directory names
    #[arg(long)]
    pub no_auto_tag: bool,
}

/// Arguments for the create and update commands.
#[derive(Args)]
pub struct CreateArgs {
    /// Catalog file to write
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub scan: ScanArgs,
}

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Catalog file to check against
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Print findings as JSON on stdout
    #[arg(short, long)]
    pub structured_output: bool,

    #[command(flatten)]
    pub scan: ScanArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// Arguments for the verify command.
#[derive(Args)]
pub struct VerifyArgs {
    /// Catalog file to verify
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Only check variables with this tag (repeatable)
    #[arg(short, long)]
    pub tag: Vec<String>,

    /// Treat missing variables with defaults as errors
    #[arg(long)]
    pub warning_as_error: bool,

    /// Task definition JSON to check instead of the process environment
    #[arg(short, long)]
    pub definition: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

/// Arguments for the tags-from-env command.
#[derive(Args)]
pub struct TagsFromEnvArgs {
    /// Catalog file to tag
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Where to write the tagged catalog (default: the input catalog)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Tag to add (repeatable)
    #[arg(short, long)]
    pub tag: Vec<String>,

    /// Task definition JSON to check instead of the process environment
    #[arg(short, long)]
    pub definition: Option<PathBuf>,
}

fn scan(args: &ScanArgs, config: &Config) -> anyhow::Result<ScanOutcome> {
    let options = config.scan_options(&args.exclude_dir, &args.exclude_pattern, args.no_auto_tag);
    let outcome = Scanner::new(&args.path)?
        .with_options(options)
        .scan()
        .with_context(|| format!("scan of {} failed", args.path.display()))?;
    Ok(outcome)
}

fn existence_check(definition: Option<&Path>) -> anyhow::Result<Box<dyn ExistenceCheck>> {
    match definition {
        Some(path) => Ok(Box::new(TaskDefinition::from_file(path)?)),
        None => Ok(Box::new(ProcessEnv)),
    }
}

/// Run the create command.
pub fn run_create(args: &CreateArgs, config: &Config) -> anyhow::Result<i32> {
    let output = config.catalog_path(args.output.as_deref());

    println!("Scanning {} for environment variable reads...", args.scan.path.display());
    let outcome = scan(&args.scan, config)?;
    outcome.catalog.save(&output, KeyOrder::Declared)?;

    println!("Found {} unique environment variables", outcome.catalog.len());
    println!("Found {} total environment variable references", outcome.total_references);
    println!("Catalog written to {}", output.display());
    Ok(EXIT_SUCCESS)
}

/// Run the update command.
pub fn run_update(args: &CreateArgs, config: &Config) -> anyhow::Result<i32> {
    let output = config.catalog_path(args.output.as_deref());
    let mut catalog = Catalog::load_or_default(&output)?;

    println!("Scanning {} for environment variable reads...", args.scan.path.display());
    let outcome = scan(&args.scan, config)?;
    let stats = catalog.merge(outcome.catalog);
    catalog.save(&output, KeyOrder::Declared)?;

    println!("Updated {} existing variables", stats.updated);
    println!("Added {} new variables", stats.added);
    println!("The catalog now contains {} unique environment variables", catalog.len());
    println!("Found {} total environment variable references", outcome.total_references);
    println!("Updated catalog written to {}", output.display());
    Ok(EXIT_SUCCESS)
}

/// Run the check command.
pub fn run_check(args: &CheckArgs, config: &Config) -> anyhow::Result<i32> {
    let path = config.catalog_path(args.catalog.as_deref());
    let catalog = Catalog::load(&path)?;
    if !args.structured_output {
        println!("Loaded catalog with {} variables", catalog.len());
        println!("Scanning {} for environment variable reads...", args.scan.path.display());
    }

    let outcome = scan(&args.scan, config)?;
    let missing = catalog.undocumented(&outcome.catalog);

    let mut stdout = io::stdout().lock();
    if args.structured_output {
        report::write_undocumented_json(&mut stdout, &missing)?;
    } else {
        report::write_undocumented(&mut stdout, &missing)?;
    }

    if missing.is_empty() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the verify command.
pub fn run_verify(args: &VerifyArgs, config: &Config) -> anyhow::Result<i32> {
    let path = config.catalog_path(args.catalog.as_deref());
    let pretty = args.format == OutputFormat::Pretty;

    let catalog = Catalog::load(&path)?;
    if pretty {
        println!("Loaded catalog with {} environment variables", catalog.len());
    }

    let exists = existence_check(args.definition.as_deref())?;

    let selected = catalog.filter_by_tag(args.tag.as_slice());
    if pretty {
        if args.tag.is_empty() {
            println!("No tags filter specified, checking all variables in catalog");
        } else {
            println!(
                "Filtered to {} variables used in service(s): {}",
                selected.len(),
                args.tag.join(", ")
            );
        }
    }

    let warning_as_error = args.warning_as_error || config.warning_as_error;
    let report = verify::verify(selected.entries(), warning_as_error, &*exists);

    let mut stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Json => report::write_verification_json(&mut stdout, &report)?,
        OutputFormat::Pretty => report::write_verification(&mut stdout, &report)?,
    }

    if report.passed() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the tags-from-env command.
pub fn run_tags_from_env(args: &TagsFromEnvArgs, config: &Config) -> anyhow::Result<i32> {
    let path = config.catalog_path(args.catalog.as_deref());
    let mut catalog = Catalog::load(&path)?;
    println!("Loaded catalog with {} environment variables", catalog.len());

    if args.tag.is_empty() {
        eprintln!("Warning: no tags given, catalog left unchanged");
    }

    let exists = existence_check(args.definition.as_deref())?;
    let inserted = catalog.tag_present(args.tag.as_slice(), &*exists);

    let output = args.output.clone().unwrap_or(path);
    catalog.save(&output, KeyOrder::Sorted)?;

    println!("Added {} tags", inserted);
    println!("Catalog written to {}", output.display());
    Ok(EXIT_SUCCESS)
}
