//! Bundle configuration.
//!
//! Every option has a default, and a run with no config file uses them. A TOML
//! file is read only when one is passed explicitly (`--config <FILE>`); nothing
//! is looked up from the working directory or the environment.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [compression]
//! level = 9       # gzip level, 0 (store only) to 9 (smallest)
//!
//! [minify]
//! css = true      # minify the stylesheet before inlining it
//! js = true       # minify the script before inlining it
//! html = true     # minify the document in html-only mode
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! [minify]
//! js = false
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Bundle configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleConfig {
    /// Gzip settings for the artifact.
    pub compression: CompressionConfig,
    /// Which minifiers run.
    pub minify: MinifyConfig,
}

impl BundleConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compression.level > 9 {
            return Err(ConfigError::Validation(
                "compression.level must be 0-9".into(),
            ));
        }
        Ok(())
    }
}

/// Gzip settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    /// Deflate level: 0 stores, 9 compresses hardest.
    pub level: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { level: 9 }
    }
}

/// Minifier switches. A disabled minifier passes its source through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinifyConfig {
    pub css: bool,
    pub js: bool,
    pub html: bool,
}

impl Default for MinifyConfig {
    fn default() -> Self {
        Self {
            css: true,
            js: true,
            html: true,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BundleConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BundleConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BundleConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// `None` gives the stock defaults without touching the filesystem.
pub fn load_config(path: Option<&Path>) -> Result<BundleConfig, ConfigError> {
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# gz-bundle Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Pass this file explicitly:  gz-bundle --config bundle.toml combine ...
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Compression
# ---------------------------------------------------------------------------
[compression]
# Gzip level: 0 stores the document uncompressed, 9 produces the smallest file.
level = 9

# ---------------------------------------------------------------------------
# Minification
# ---------------------------------------------------------------------------
[minify]
# Minify the stylesheet before inlining it (combine).
css = true

# Minify the script before inlining it (combine).
js = true

# Minify the document (html).
html = true
"##
}
