//! # gz-bundle
//!
//! Bundle a small static page into one gzip file: minify the HTML, CSS and
//! JavaScript, inline the CSS and JS into the document, and compress the
//! result. Typical use is a single `index.html.gz` served as-is by an
//! embedded web server.
//!
//! # Architecture: Two Linear Pipelines
//!
//! ```text
//! combine    read html/css/js → minify css, js → merge into DOM → gzip → write
//! html-only  read html        → minify html                     → gzip → write
//! ```
//!
//! Each run is a synchronous function from input paths to one artifact at
//! `<dest>/<html file name>.gz`. All transformations happen in memory and the
//! artifact is written last, atomically, so a failed run leaves nothing
//! behind.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | The `combine` and `html-only` runs, error taxonomy, and the [`Outcome`](pipeline::Outcome) boundary |
//! | [`minify`] | Regex CSS and HTML minifiers; JavaScript minification through `oxc` |
//! | [`merge`] | Inlines CSS/JS into the parsed document and removes external references |
//! | [`compress`] | Artifact naming, gzip, atomic write |
//! | [`config`] | Optional TOML config: compression level, minifier switches |
//! | [`types`] | Source documents and run reports |
//! | [`output`] | CLI formatting of run reports |
//!
//! # Design Decisions
//!
//! ## Substitution-Based Minifiers
//!
//! The CSS and HTML minifiers are a short, fixed list of regex substitutions.
//! They can damage string literals containing `;` or `{`, and whitespace in
//! `<pre>`. The output of each step is fixed and pinned by tests.
//!
//! ## A Real Parser For The Merge
//!
//! Inlining goes through html5ever, the same HTML5 parser browsers implement,
//! so tag soup still yields a sensible tree. The one thing it does that is not
//! wanted here is inventing `<head>` and `<body>`; see [`merge`] for how the
//! source's own tags are checked first.

pub mod compress;
pub mod config;
pub mod merge;
pub mod minify;
pub mod output;
pub mod pipeline;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
