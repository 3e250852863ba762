//! Data carried through a single pipeline run.
//!
//! Nothing here outlives the run: sources are read, transformed, compressed,
//! and dropped. [`BundleReport`] is what a run hands back to its caller.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// The three kinds of input a run can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Html,
    Css,
    Js,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceKind::Html => "HTML",
            SourceKind::Css => "CSS",
            SourceKind::Js => "JS",
        };
        f.write_str(label)
    }
}

/// Full UTF-8 contents of one input file.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub kind: SourceKind,
    pub path: PathBuf,
    pub text: String,
}

impl SourceDocument {
    /// Summary of this source after it was reduced to `minified_bytes`.
    pub fn summarize(&self, minified_bytes: usize) -> InputSummary {
        InputSummary {
            kind: self.kind,
            path: self.path.clone(),
            original_bytes: self.text.len(),
            minified_bytes,
        }
    }
}

/// Which pipeline produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleMode {
    /// HTML, CSS and JS merged into one document.
    Combine,
    /// A single HTML document that already carries its CSS and JS.
    HtmlOnly,
}

impl fmt::Display for BundleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleMode::Combine => f.write_str("Combine"),
            BundleMode::HtmlOnly => f.write_str("HTML only"),
        }
    }
}

/// Size of one input before and after its transformation step.
///
/// In combine mode the HTML entry's `minified_bytes` is the size of the merged
/// document, which includes the inlined CSS and JS.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSummary {
    pub kind: SourceKind,
    pub path: PathBuf,
    pub original_bytes: usize,
    pub minified_bytes: usize,
}

impl InputSummary {
    /// File name for display, falling back to the full path.
    pub fn display_name(&self) -> String {
        display_name(&self.path)
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundleReport {
    pub mode: BundleMode,
    pub inputs: Vec<InputSummary>,
    pub output_path: PathBuf,
    /// Bytes of the final document before compression.
    pub document_bytes: usize,
    /// Bytes of the gzip artifact.
    pub compressed_bytes: usize,
    /// Inputs whose minifier was switched off by configuration and were
    /// carried through verbatim.
    pub unminified: Vec<SourceKind>,
}

impl BundleReport {
    /// Compressed size as a percentage of the document size.
    pub fn ratio_percent(&self) -> f64 {
        if self.document_bytes == 0 {
            return 0.0;
        }
        self.compressed_bytes as f64 * 100.0 / self.document_bytes as f64
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(document_bytes: usize, compressed_bytes: usize) -> BundleReport {
        BundleReport {
            mode: BundleMode::HtmlOnly,
            inputs: Vec::new(),
            output_path: PathBuf::from("dist/index.html.gz"),
            document_bytes,
            compressed_bytes,
            unminified: Vec::new(),
        }
    }

    #[test]
    fn ratio_percent() {
        assert_eq!(report(200, 50).ratio_percent(), 25.0);
    }

    #[test]
    fn ratio_percent_empty_document() {
        assert_eq!(report(0, 20).ratio_percent(), 0.0);
    }

    #[test]
    fn summarize_uses_source_length() {
        let doc = SourceDocument {
            kind: SourceKind::Css,
            path: PathBuf::from("assets/site.css"),
            text: "a { color: red; }".to_string(),
        };
        let summary = doc.summarize(13);
        assert_eq!(summary.original_bytes, 17);
        assert_eq!(summary.minified_bytes, 13);
        assert_eq!(summary.display_name(), "site.css");
    }

    #[test]
    fn report_serializes_mode_kebab_case() {
        let json = serde_json::to_string(&report(1, 1)).unwrap();
        assert!(json.contains(r#""mode":"html-only""#));
    }

    #[test]
    fn report_serializes_unminified_kinds() {
        let mut report = report(1, 1);
        report.unminified = vec![SourceKind::Css, SourceKind::Js];
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""unminified":["css","js"]"#), "{json}");
    }
}
