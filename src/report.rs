//! Output formatting for verification and catalog checks.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//!
//! Every writer takes an `io::Write` so callers decide where output goes.

use std::io::{self, Write};

use colored::*;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::catalog::{CatalogEntry, DefaultValue, Location};
use crate::verify::{Status, Summary, VerificationReport};

const SEPARATOR_WIDTH: usize = 80;

/// Locations listed per entry before collapsing the rest into a count.
const SHOWN_LOCATIONS: usize = 3;

// =============================================================================
// Verification
// =============================================================================

/// Write the per-entry verification report followed by a summary.
pub fn write_verification<W: Write>(out: &mut W, report: &VerificationReport) -> io::Result<()> {
    let total = report.checks.len();
    let separator = "-".repeat(SEPARATOR_WIDTH);

    writeln!(out)?;
    writeln!(out, "Checking {} environment variables:", total)?;
    writeln!(out, "{}", separator)?;

    for (idx, check) in report.checks.iter().enumerate() {
        write_entry(out, idx + 1, total, check.entry, check.status)?;
        writeln!(out, "{}", separator)?;
    }

    write_summary(out, &report.summary(), report.warning_as_error)
}

fn write_entry<W: Write>(
    out: &mut W,
    idx: usize,
    total: usize,
    entry: &CatalogEntry,
    status: Status,
) -> io::Result<()> {
    writeln!(out, "[{}/{}] {}", idx, total, entry.name.bold())?;
    writeln!(out, "  Tags:          {}", joined_or_unknown(&entry.tags))?;
    writeln!(out, "  Used in:       {}", joined_or_unknown(&entry.packages))?;
    writeln!(out, "  Has default:   {}", if entry.has_default { "True" } else { "False" })?;
    if entry.has_default {
        writeln!(out, "  Default value: {}", entry.default_text())?;
    }

    let status_text = match status {
        Status::Present => "✓ SET".green(),
        Status::Warning => {
            format!("⚠ WARNING - Not set, using default: {}", entry.default_text()).yellow()
        }
        Status::Error if entry.has_default => format!(
            "✗ ERROR - Not set, default {} not allowed",
            entry.default_text()
        )
        .red(),
        Status::Error => "✗ ERROR - Required variable not set".red(),
    };
    writeln!(out, "  Status:        {}", status_text)?;

    if !entry.locations.is_empty() {
        writeln!(out, "  Referenced in:")?;
        for loc in entry.locations.iter().take(SHOWN_LOCATIONS) {
            writeln!(out, "    • {}", loc.to_string().blue())?;
        }
        if entry.locations.len() > SHOWN_LOCATIONS {
            writeln!(
                out,
                "    • ... and {} more locations",
                entry.locations.len() - SHOWN_LOCATIONS
            )?;
        }
    }
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, summary: &Summary, warning_as_error: bool) -> io::Result<()> {
    let missing_required = summary.errors - summary.elevated_defaults;
    let missing_with_default = summary.warnings + summary.elevated_defaults;

    writeln!(out)?;
    writeln!(out, "{}", "SUMMARY:".bold())?;
    writeln!(out, "  Total variables checked: {}", summary.total)?;
    writeln!(out, "  Variables present:       {}", summary.present)?;
    if warning_as_error {
        writeln!(
            out,
            "  Missing with default:    {} {}",
            missing_with_default,
            "(treated as errors)".dimmed()
        )?;
    } else {
        writeln!(out, "  Missing with default:    {}", missing_with_default)?;
    }
    writeln!(out, "  Missing without default: {}", missing_required)?;
    writeln!(out)?;

    if missing_required > 0 {
        writeln!(
            out,
            "{} {} required environment variables are missing",
            "ERROR:".red().bold(),
            missing_required
        )
    } else if summary.elevated_defaults > 0 {
        writeln!(
            out,
            "{} {} environment variables are using defaults but warnings are treated as errors",
            "ERROR:".red().bold(),
            summary.elevated_defaults
        )
    } else if summary.warnings > 0 {
        writeln!(
            out,
            "{} {} environment variables are using defaults",
            "WARNING:".yellow().bold(),
            summary.warnings
        )
    } else {
        writeln!(
            out,
            "{} All required environment variables are set",
            "SUCCESS:".green().bold()
        )
    }
}

fn joined_or_unknown(values: &IndexSet<String>) -> String {
    if values.is_empty() {
        return "unknown".to_string();
    }
    values.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// JSON verification report.
#[derive(Serialize)]
pub struct JsonVerification<'a> {
    pub version: &'static str,
    pub passed: bool,
    pub warning_as_error: bool,
    pub summary: Summary,
    pub checks: Vec<JsonCheck<'a>>,
}

#[derive(Serialize)]
pub struct JsonCheck<'a> {
    pub name: &'a str,
    pub status: Status,
    pub has_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<&'a DefaultValue>,
    pub tags: &'a IndexSet<String>,
    pub packages: &'a IndexSet<String>,
}

/// Write the verification outcome as pretty-printed JSON.
pub fn write_verification_json<W: Write>(
    out: &mut W,
    report: &VerificationReport,
) -> anyhow::Result<()> {
    let json = JsonVerification {
        version: env!("CARGO_PKG_VERSION"),
        passed: report.passed(),
        warning_as_error: report.warning_as_error,
        summary: report.summary(),
        checks: report
            .checks
            .iter()
            .map(|c| JsonCheck {
                name: &c.entry.name,
                status: c.status,
                has_default: c.entry.has_default,
                default_value: c.entry.default_value.as_ref(),
                tags: &c.entry.tags,
                packages: &c.entry.packages,
            })
            .collect(),
    };
    serde_json::to_writer_pretty(&mut *out, &json)?;
    writeln!(out)?;
    Ok(())
}

// =============================================================================
// Undocumented variables
// =============================================================================

/// Write the variables found in code but missing from the catalog.
pub fn write_undocumented<W: Write>(out: &mut W, missing: &[&CatalogEntry]) -> io::Result<()> {
    if missing.is_empty() {
        return writeln!(
            out,
            "{}",
            "All environment variables in code are documented in the catalog.".green()
        );
    }

    writeln!(
        out,
        "{} Found {} environment variables in code that are not in the catalog:",
        "WARNING:".yellow().bold(),
        missing.len()
    )?;
    for entry in missing {
        let mut locations = entry
            .locations
            .iter()
            .take(SHOWN_LOCATIONS)
            .map(Location::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        if entry.locations.len() > SHOWN_LOCATIONS {
            locations.push_str(&format!(
                " and {} more",
                entry.locations.len() - SHOWN_LOCATIONS
            ));
        }
        writeln!(
            out,
            "- {} (default: {}) in {}",
            entry.name.bold(),
            entry.default_text(),
            locations
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct UndocumentedJson<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    default_value: Option<&'a DefaultValue>,
    #[serde(skip_serializing_if = "no_locations")]
    locations: &'a [Location],
}

fn no_locations(locations: &&[Location]) -> bool {
    locations.is_empty()
}

/// Write `{NAME: {default_value?, locations?}}` on one line.
///
/// Falsy defaults (empty string, zero, false) are omitted. Two entries
/// with the same name collapse into one key, the later one winning.
pub fn write_undocumented_json<W: Write>(out: &mut W, missing: &[&CatalogEntry]) -> anyhow::Result<()> {
    let mut by_name: IndexMap<&str, UndocumentedJson> = IndexMap::new();
    for entry in missing {
        by_name.insert(
            &entry.name,
            UndocumentedJson {
                default_value: entry.default_value.as_ref().filter(|v| v.is_truthy()),
                locations: &entry.locations,
            },
        );
    }
    serde_json::to_writer(&mut *out, &by_name)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::verify;
    use pretty_assertions::assert_eq;

    fn render(report: &VerificationReport) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        write_verification(&mut out, report).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn entry(name: &str, default: Option<DefaultValue>, locations: usize) -> CatalogEntry {
        let mut entry = CatalogEntry::new(name, default.is_some(), default);
        entry.tags.insert("api".to_string());
        entry.packages.insert("config".to_string());
        for line in 1..=locations {
            entry.locations.push(Location::new("config/settings.py", line));
        }
        entry
    }

    #[test]
    fn test_verification_report() {
        let entries = vec![
            entry("DATABASE_URL", None, 1),
            entry("DEBUG", Some(DefaultValue::Bool(false)), 5),
            entry("API_SECRET", None, 0),
        ];
        let exists = |name: &str| name == "DATABASE_URL";
        let text = render(&verify(&entries, false, &exists));

        assert!(text.contains("Checking 3 environment variables:"));
        assert!(text.contains("[1/3] DATABASE_URL\n  Tags:          api\n  Used in:       config\n  Has default:   False\n  Status:        ✓ SET\n  Referenced in:\n    • config/settings.py:1\n"));
        assert!(text.contains("  Default value: False\n  Status:        ⚠ WARNING - Not set, using default: False\n"));
        assert!(text.contains("    • config/settings.py:3\n    • ... and 2 more locations\n"));
        assert!(text.contains("  Status:        ✗ ERROR - Required variable not set\n"));
        assert!(text.contains("  Missing with default:    1\n  Missing without default: 1\n"));
        assert!(text.ends_with("ERROR: 1 required environment variables are missing\n"));
    }

    #[test]
    fn test_elevated_defaults_summary() {
        let entries = vec![entry("PORT", Some(DefaultValue::Str("8080".into())), 1)];
        let text = render(&verify(&entries, true, &|_: &str| false));

        assert!(text.contains("✗ ERROR - Not set, default 8080 not allowed"));
        assert!(text.contains("Missing with default:    1 (treated as errors)"));
        assert!(text.contains("Missing without default: 0"));
        assert!(text.ends_with(
            "ERROR: 1 environment variables are using defaults but warnings are treated as errors\n"
        ));
    }

    #[test]
    fn test_success_summary() {
        let entries = vec![entry("HOME", None, 1)];
        let text = render(&verify(&entries, false, &|_: &str| true));
        assert!(text.ends_with("SUCCESS: All required environment variables are set\n"));
    }

    #[test]
    fn test_verification_json() {
        let entries = vec![entry("PORT", Some(DefaultValue::Int(8080)), 1)];
        let report = verify(&entries, false, &|_: &str| false);

        let mut out = Vec::new();
        write_verification_json(&mut out, &report).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["passed"], true);
        assert_eq!(value["summary"]["warnings"], 1);
        assert_eq!(value["checks"][0]["status"], "warning");
        assert_eq!(value["checks"][0]["default_value"], 8080);
    }

    #[test]
    fn test_undocumented_json_omits_falsy_defaults() {
        let entries = vec![
            entry("A", Some(DefaultValue::Str("x".into())), 1),
            entry("B", Some(DefaultValue::Str(String::new())), 0),
            entry("C", None, 2),
        ];
        let missing: Vec<&CatalogEntry> = entries.iter().collect();

        let mut out = Vec::new();
        write_undocumented_json(&mut out, &missing).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            concat!(
                r#"{"A":{"default_value":"x","locations":[{"file":"config/settings.py","line":1}]},"#,
                r#""B":{},"#,
                r#""C":{"locations":[{"file":"config/settings.py","line":1},{"file":"config/settings.py","line":2}]}}"#,
                "\n"
            )
        );
    }

    #[test]
    fn test_undocumented_pretty() {
        colored::control::set_override(false);
        let entries = vec![entry("A", None, 4)];
        let missing: Vec<&CatalogEntry> = entries.iter().collect();

        let mut out = Vec::new();
        write_undocumented(&mut out, &missing).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("WARNING: Found 1 environment variables"));
        assert!(text.contains(
            "- A (default: None) in config/settings.py:1, config/settings.py:2, config/settings.py:3 and 1 more\n"
        ));

        let mut out = Vec::new();
        write_undocumented(&mut out, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "All environment variables in code are documented in the catalog.\n"
        );
    }
}
