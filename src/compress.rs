//! Gzip compression and the final artifact write.
//!
//! The artifact name is derived from the HTML input: `<dest>/<file name>.gz`,
//! keeping the original extension (`index.html` → `index.html.gz`).
//!
//! The document is compressed in memory, written to a temporary file inside the
//! destination directory, and renamed onto the final path. A failed run leaves
//! no file at the target path and no temporary file behind. The artifact gets
//! the same permissions a plain file create would give it (`0666` less the
//! umask on Unix), not the owner-only mode of a fresh temporary file.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Destination is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Input path has no file name: {0}")]
    NoFileName(PathBuf),
}

/// Path of the artifact for `html_path` inside `dest_dir`.
///
/// Only the base file name of `html_path` is used; `.gz` is appended to it.
pub fn artifact_path(html_path: &Path, dest_dir: &Path) -> Result<PathBuf, CompressError> {
    let file_name = html_path
        .file_name()
        .ok_or_else(|| CompressError::NoFileName(html_path.to_path_buf()))?;
    let mut name = OsString::from(file_name);
    name.push(".gz");
    Ok(dest_dir.join(name))
}

/// Gzip `data` at `level` (0-9, clamped).
///
/// The header carries no file name and a zero mtime, so equal input gives
/// equal output.
pub fn gzip(data: &[u8], level: u32) -> Result<Vec<u8>, CompressError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Compress `document` and write it to `target` atomically.
///
/// The parent of `target` must be an existing directory. Returns the number of
/// compressed bytes written.
pub fn write_artifact(document: &str, target: &Path, level: u32) -> Result<usize, CompressError> {
    let dest_dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if !dest_dir.is_dir() {
        return Err(CompressError::NotADirectory(dest_dir.to_path_buf()));
    }

    let compressed = gzip(document.as_bytes(), level)?;
    debug!(
        uncompressed = document.len(),
        compressed = compressed.len(),
        level,
        "document compressed"
    );

    let mut tmp = artifact_temp_file(dest_dir)?;
    tmp.write_all(&compressed)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;

    Ok(compressed.len())
}

/// Temporary file in `dir` created with the mode of an ordinary new file.
fn artifact_temp_file(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".gz-bundle-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}
