//! Project configuration.
//!
//! Handles loading, validating, and merging `treasures.toml`. The file lives at
//! the project root and overrides stock defaults; every key is optional.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! data_dir = "sources"                 # Taxonomy files
//! staging_dir = "sources/to_integrate" # One <title>.json per staged entry
//! store = "sources/treasures.json"     # The entry database
//! output = "docs/index.html"           # Generated page
//! assets_dir = "docs/assets"           # Where site.assets are copied
//!
//! [site]
//! title = "Treasures"
//! description = "A curated collection of links worth keeping"
//! stylesheets = ["assets/bootstrap/bootstrap.min.css", "assets/bootstrap-icons/bootstrap-icons.min.css"]
//! scripts = ["assets/bootstrap/bootstrap.bundle.min.js"]
//! assets = [                           # Copied into paths.assets_dir
//!     "node_modules/bootstrap/dist/css/bootstrap.min.css",
//!     "node_modules/bootstrap/dist/js/bootstrap.bundle.min.js",
//!     "node_modules/bootstrap-icons/font/bootstrap-icons.min.css",
//!     "node_modules/bootstrap-icons/font/fonts",
//! ]
//!
//! [render]
//! validate = true   # Structural HTML check before writing
//! pretty = true     # Indent the generated HTML
//! ```
//!
//! Relative paths are resolved against the project root. Unknown keys are
//! rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "treasures.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `treasures.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreasuresConfig {
    /// Where the data, staging area and output live.
    pub paths: PathsConfig,
    /// Page chrome and front-end assets.
    pub site: SiteConfig,
    /// Post-processing of the generated HTML.
    pub render: RenderConfig,
}

impl TreasuresConfig {
    /// Validate values that deserialization alone can't check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let paths = [
            ("paths.data_dir", &self.paths.data_dir),
            ("paths.staging_dir", &self.paths.staging_dir),
            ("paths.store", &self.paths.store),
            ("paths.output", &self.paths.output),
            ("paths.assets_dir", &self.paths.assets_dir),
        ];
        for (key, value) in paths {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if !self.paths.store.ends_with(".json") {
            return Err(ConfigError::Validation(
                "paths.store must be a .json file".into(),
            ));
        }
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation("site.title must not be empty".into()));
        }
        Ok(())
    }
}

/// File locations, relative to the project root unless absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub data_dir: String,
    pub staging_dir: String,
    pub store: String,
    pub output: String,
    pub assets_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: "sources".to_string(),
            staging_dir: "sources/to_integrate".to_string(),
            store: "sources/treasures.json".to_string(),
            output: "docs/index.html".to_string(),
            assets_dir: "docs/assets".to_string(),
        }
    }
}

/// Page chrome. Stylesheet and script paths are emitted verbatim, relative to
/// the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub title: String,
    pub description: String,
    pub stylesheets: Vec<String>,
    pub scripts: Vec<String>,
    /// Files or directories, relative to the project root, copied into
    /// `paths.assets_dir` on every build.
    pub assets: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Treasures".to_string(),
            description: "A curated collection of links worth keeping".to_string(),
            stylesheets: vec![
                "assets/bootstrap/bootstrap.min.css".to_string(),
                "assets/bootstrap-icons/bootstrap-icons.min.css".to_string(),
            ],
            scripts: vec!["assets/bootstrap/bootstrap.bundle.min.js".to_string()],
            assets: vec![
                "node_modules/bootstrap/dist/css/bootstrap.min.css".to_string(),
                "node_modules/bootstrap/dist/js/bootstrap.bundle.min.js".to_string(),
                "node_modules/bootstrap-icons/font/bootstrap-icons.min.css".to_string(),
                "node_modules/bootstrap-icons/font/fonts".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Run the structural HTML check and log its findings.
    pub validate: bool,
    /// Indent the generated HTML before writing.
    pub pretty: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            validate: true,
            pretty: true,
        }
    }
}

/// Absolute locations derived from the config and a project root.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub store: PathBuf,
    pub output: PathBuf,
    pub assets_dir: PathBuf,
}

impl ProjectPaths {
    pub fn resolve(root: &Path, paths: &PathsConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            data_dir: root.join(&paths.data_dir),
            staging_dir: root.join(&paths.staging_dir),
            store: root.join(&paths.store),
            output: root.join(&paths.output),
            assets_dir: root.join(&paths.assets_dir),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(TreasuresConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
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

/// Load `treasures.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<TreasuresConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: TreasuresConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `treasures.toml` in the project root, over stock defaults.
pub fn load_config(root: &Path) -> Result<TreasuresConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `treasures.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Treasures Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Paths (relative to the project root)
# ---------------------------------------------------------------------------
[paths]
# Directory holding types.json, topics.json, flags.json, tags.json and
# ressources.json.
data_dir = "sources"

# Staged entries waiting for integration, one <title>.json each.
staging_dir = "sources/to_integrate"

# The entry database: a JSON object keyed by title.
store = "sources/treasures.json"

# The generated page.
output = "docs/index.html"

# Where site.assets are copied. Keep it next to the page so the links in
# site.stylesheets and site.scripts resolve.
assets_dir = "docs/assets"

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
title = "Treasures"
description = "A curated collection of links worth keeping"

# Front-end assets, linked relative to the output file.
stylesheets = [
    "assets/bootstrap/bootstrap.min.css",
    "assets/bootstrap-icons/bootstrap-icons.min.css",
]
scripts = ["assets/bootstrap/bootstrap.bundle.min.js"]

# Files or directories copied into paths.assets_dir on every build. Sources
# inside node_modules/<package>/ land in <assets_dir>/<package>/. Missing
# sources are skipped with a warning.
assets = [
    "node_modules/bootstrap/dist/css/bootstrap.min.css",
    "node_modules/bootstrap/dist/js/bootstrap.bundle.min.js",
    "node_modules/bootstrap-icons/font/bootstrap-icons.min.css",
    "node_modules/bootstrap-icons/font/fonts",
]

# ---------------------------------------------------------------------------
# Rendering
# ---------------------------------------------------------------------------
[render]
# Check the generated HTML structure and log problems (never blocks output).
validate = true

# Indent the generated HTML.
pretty = true
"##
}
