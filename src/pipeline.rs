//! The two bundling pipelines and their error boundary.
//!
//! ```text
//! combine    page.html + style.css + app.js ─┐
//!              minify CSS, minify JS         │
//!              merge into the DOM            ├─→  <dest>/page.html.gz
//! html-only  page.html                       │
//!              minify HTML                  ─┘
//! ```
//!
//! Every run reads all of its inputs first, transforms them in memory, and
//! writes the artifact as the very last step, so a failure anywhere leaves the
//! destination untouched.
//!
//! [`combine`] and [`html_only`] return typed errors for library callers.
//! [`run_combine`] and [`run_html_only`] are the boundary a front end calls:
//! they never fail, and fold every outcome into a single [`Outcome`].

use crate::compress::{self, CompressError};
use crate::config::{BundleConfig, ConfigError};
use crate::merge::{self, MergeError};
use crate::minify::{self, MinifyError};
use crate::types::{BundleMode, BundleReport, InputSummary, SourceDocument, SourceKind};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{}", unreadable_message(path, source))]
    MissingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error(transparent)]
    Minify(#[from] MinifyError),
    #[error(transparent)]
    Compress(#[from] CompressError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// `file not found: <path>` for a missing input, otherwise the reason the
/// read failed.
fn unreadable_message(path: &Path, source: &std::io::Error) -> String {
    match source.kind() {
        ErrorKind::NotFound => format!("file not found: {}", path.display()),
        kind => format!("cannot read {}: {kind}", path.display()),
    }
}

impl PipelineError {
    /// Human-readable description for the end user.
    ///
    /// Missing inputs and missing `<head>`/`<body>` are things the user can fix
    /// in their files; everything else is reported as unexpected.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::MissingFile { .. } => format!("Error: {self}"),
            PipelineError::Merge(e) if e.is_structural() => format!("Error: {e}"),
            _ => format!("Unexpected error: {self}"),
        }
    }
}

/// Single result of a run, ready to show to a user.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(BundleReport),
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The success or failure message.
    pub fn message(&self) -> String {
        match self {
            Outcome::Success(report) => format!("Saved to: {}", report.output_path.display()),
            Outcome::Failure(message) => message.clone(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl From<Result<BundleReport, PipelineError>> for Outcome {
    fn from(result: Result<BundleReport, PipelineError>) -> Self {
        match result {
            Ok(report) => Outcome::Success(report),
            Err(e) => {
                info!(error = %e, "bundle failed");
                Outcome::Failure(e.user_message())
            }
        }
    }
}

/// Read one input fully into memory.
pub fn read_source(kind: SourceKind, path: &Path) -> Result<SourceDocument, PipelineError> {
    let bytes = fs::read(path).map_err(|source| PipelineError::MissingFile {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| PipelineError::Encoding {
        path: path.to_path_buf(),
    })?;
    debug!(%kind, path = %path.display(), bytes = text.len(), "read source");
    Ok(SourceDocument {
        kind,
        path: path.to_path_buf(),
        text,
    })
}

/// Minify `css` and `js`, inline them into `html`, and gzip the result into
/// `dest_dir`.
pub fn combine(
    html: &Path,
    css: &Path,
    js: &Path,
    dest_dir: &Path,
    config: &BundleConfig,
) -> Result<BundleReport, PipelineError> {
    info!(html = %html.display(), css = %css.display(), js = %js.display(), "combining");

    let html = read_source(SourceKind::Html, html)?;
    let css = read_source(SourceKind::Css, css)?;
    let js = read_source(SourceKind::Js, js)?;

    let css_min = if config.minify.css {
        minify::minify_css(&css.text)
    } else {
        css.text.clone()
    };
    let js_min = if config.minify.js {
        minify::minify_js(&js.text)?
    } else {
        js.text.clone()
    };
    debug!(css = css_min.len(), js = js_min.len(), "minified fragments");

    let document = merge::merge_document(&html.text, &css_min, &js_min)?;

    let inputs = vec![
        html.summarize(document.len()),
        css.summarize(css_min.len()),
        js.summarize(js_min.len()),
    ];
    let unminified = [(SourceKind::Css, config.minify.css), (SourceKind::Js, config.minify.js)]
        .into_iter()
        .filter_map(|(kind, enabled)| (!enabled).then_some(kind))
        .collect();
    finish(BundleMode::Combine, &html, &document, inputs, unminified, dest_dir, config)
}

/// Minify an HTML document that already inlines its CSS and JS, and gzip it
/// into `dest_dir`.
pub fn html_only(
    html: &Path,
    dest_dir: &Path,
    config: &BundleConfig,
) -> Result<BundleReport, PipelineError> {
    info!(html = %html.display(), "minifying html");

    let html = read_source(SourceKind::Html, html)?;
    let document = if config.minify.html {
        minify::minify_html(&html.text)
    } else {
        html.text.clone()
    };

    let inputs = vec![html.summarize(document.len())];
    let unminified = if config.minify.html {
        Vec::new()
    } else {
        vec![SourceKind::Html]
    };
    finish(BundleMode::HtmlOnly, &html, &document, inputs, unminified, dest_dir, config)
}

fn finish(
    mode: BundleMode,
    html: &SourceDocument,
    document: &str,
    inputs: Vec<InputSummary>,
    unminified: Vec<SourceKind>,
    dest_dir: &Path,
    config: &BundleConfig,
) -> Result<BundleReport, PipelineError> {
    if !unminified.is_empty() {
        warn!(?unminified, "minification disabled by config");
    }
    let output_path = compress::artifact_path(&html.path, dest_dir)?;
    let compressed_bytes =
        compress::write_artifact(document, &output_path, config.compression.level)?;
    info!(output = %output_path.display(), compressed_bytes, "artifact written");

    Ok(BundleReport {
        mode,
        inputs,
        output_path,
        document_bytes: document.len(),
        compressed_bytes,
        unminified,
    })
}

/// [`combine`], folded into an [`Outcome`].
pub fn run_combine(
    html: &Path,
    css: &Path,
    js: &Path,
    dest_dir: &Path,
    config: &BundleConfig,
) -> Outcome {
    combine(html, css, js, dest_dir, config).into()
}

/// [`html_only`], folded into an [`Outcome`].
pub fn run_html_only(html: &Path, dest_dir: &Path, config: &BundleConfig) -> Outcome {
    html_only(html, dest_dir, config).into()
}
