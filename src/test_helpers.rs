//! Shared test utilities for the gz-bundle test suite.
//!
//! Provides a throwaway site layout on disk and helpers to read artifacts
//! back.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = write_site("<html>...</html>", "a { color: red; }", "var x = 1;");
//! let report = combine(&site.html, &site.css, &site.js, &site.dest, &config).unwrap();
//! let html = read_artifact(&report.output_path);
//! ```

use flate2::read::GzDecoder;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// Inputs under `<tmp>/src/` and an empty destination at `<tmp>/dist/`.
pub struct SiteFiles {
    tmp: TempDir,
    pub html: PathBuf,
    pub css: PathBuf,
    pub js: PathBuf,
    pub dest: PathBuf,
}

impl SiteFiles {
    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// Move the HTML input to a new file name in the same directory.
    pub fn rename_html(mut self, name: &str) -> Self {
        let renamed = self.html.with_file_name(name);
        std::fs::rename(&self.html, &renamed).unwrap();
        self.html = renamed;
        self
    }
}

/// Write `index.html`, `style.css` and `app.js` into a fresh temp directory.
pub fn write_site(html: &str, css: &str, js: &str) -> SiteFiles {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let dest = tmp.path().join("dist");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::create_dir_all(&dest).unwrap();

    let files = SiteFiles {
        html: src.join("index.html"),
        css: src.join("style.css"),
        js: src.join("app.js"),
        dest,
        tmp,
    };
    std::fs::write(&files.html, html).unwrap();
    std::fs::write(&files.css, css).unwrap();
    std::fs::write(&files.js, js).unwrap();
    files
}

// =========================================================================
// Artifact inspection
// =========================================================================

/// Decompress gzip bytes into a UTF-8 string. Panics on invalid input.
pub fn gunzip(bytes: &[u8]) -> String {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = String::new();
    decoder
        .read_to_string(&mut out)
        .unwrap_or_else(|e| panic!("artifact is not valid gzip/UTF-8: {e}"));
    out
}

/// Read and decompress an artifact file.
pub fn read_artifact(path: &Path) -> String {
    let bytes = std::fs::read(path)
        .unwrap_or_else(|e| panic!("artifact {} not readable: {e}", path.display()));
    gunzip(&bytes)
}

pub fn dir_is_empty(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}
