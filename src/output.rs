//! CLI output formatting for bundle runs.
//!
//! A successful run prints a header naming the mode and the artifact, one
//! indented line per input with its size before and after its step, and the
//! compression totals:
//!
//! ```text
//! Combine → dist/index.html.gz
//!     HTML: index.html (1204 → 1688 bytes)
//!     CSS: style.css (642 → 401 bytes)
//!     JS: app.js (910 → 533 bytes)
//!     Output: 1688 → 702 bytes (41.6%)
//! Saved to: dist/index.html.gz
//! ```
//!
//! When the config switched a minifier off, a `Not minified: CSS, JS` line
//! follows the inputs.
//!
//! Format functions return `Vec<String>` and do no I/O; `print_*` wrappers
//! write to stdout.

use crate::pipeline::Outcome;
use crate::types::{BundleReport, InputSummary};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn input_line(input: &InputSummary) -> String {
    format!(
        "{}{}: {} ({} → {} bytes)",
        indent(1),
        input.kind,
        input.display_name(),
        input.original_bytes,
        input.minified_bytes
    )
}

/// Format a successful run's report.
pub fn format_report(report: &BundleReport) -> Vec<String> {
    let mut lines = vec![format!("{} → {}", report.mode, report.output_path.display())];
    lines.extend(report.inputs.iter().map(input_line));
    if !report.unminified.is_empty() {
        let kinds: Vec<String> = report.unminified.iter().map(|k| k.to_string()).collect();
        lines.push(format!("{}Not minified: {}", indent(1), kinds.join(", ")));
    }
    lines.push(format!(
        "{}Output: {} → {} bytes ({:.1}%)",
        indent(1),
        report.document_bytes,
        report.compressed_bytes,
        report.ratio_percent()
    ));
    lines
}

/// Format any outcome: the report (on success) followed by the result message.
pub fn format_outcome(outcome: &Outcome) -> Vec<String> {
    let mut lines = match outcome {
        Outcome::Success(report) => format_report(report),
        Outcome::Failure(_) => Vec::new(),
    };
    lines.push(outcome.message());
    lines
}

/// Print a successful outcome to stdout, or the failure message to stderr.
pub fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Success(_) => {
            for line in format_outcome(outcome) {
                println!("{}", line);
            }
        }
        Outcome::Failure(message) => eprintln!("{}", message),
    }
}

/// Print a successful report as pretty JSON.
pub fn print_report_json(report: &BundleReport) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
