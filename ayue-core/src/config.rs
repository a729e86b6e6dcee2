//! `ayue.yaml` persistence.
//!
//! # Storage layout
//!
//! ```text
//! <project root>/
//!   ayue.yaml        (optional, every field has a default)
//! ```
//!
//! Every function takes the project root explicitly; nothing here reads the
//! process working directory.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::{ThemeConfig, ThemePaths};

/// File name of the project config.
pub const CONFIG_FILE: &str = "ayue.yaml";

/// `<root>/ayue.yaml`. Pure, no I/O.
pub fn config_path_at(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Load `<root>/ayue.yaml`.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(root: &Path) -> Result<ThemeConfig, ConfigError> {
    let path = config_path_at(root);
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    if contents.trim().is_empty() {
        return Ok(ThemeConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// Like [`load_at`], but a missing file yields the defaults.
pub fn load_or_default_at(root: &Path) -> Result<ThemeConfig, ConfigError> {
    match load_at(root) {
        Err(ConfigError::NotFound { .. }) => Ok(ThemeConfig::default()),
        other => other,
    }
}

/// Load (or default) and resolve against `root` in one step.
pub fn resolve_at(root: &Path) -> Result<ThemePaths, ConfigError> {
    load_or_default_at(root)?.resolve(root)
}

/// Save `config` to `<root>/ayue.yaml`.
///
/// Write flow: serialize → `ayue.yaml.tmp` sibling → `rename`.
pub fn save_at(root: &Path, config: &ThemeConfig) -> Result<PathBuf, ConfigError> {
    let path = config_path_at(root);
    let yaml = serde_yaml::to_string(config)?;
    let tmp_path = path.with_file_name(format!("{CONFIG_FILE}.tmp"));
    std::fs::write(&tmp_path, yaml)?;
    if let Err(e) = std::fs::rename(&tmp_path, &path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(path)
}

/// Write a default `ayue.yaml` under `root`.
///
/// Refuses to overwrite an existing file.
pub fn init_at(root: &Path) -> Result<PathBuf, ConfigError> {
    let path = config_path_at(root);
    if path.exists() {
        return Err(ConfigError::AlreadyExists { path });
    }
    std::fs::create_dir_all(root)?;
    save_at(root, &ThemeConfig::default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
