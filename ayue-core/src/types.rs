//! Domain types for the ayue theme configuration.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! [`ThemeConfig`] is the on-disk shape (paths relative to the project root);
//! [`ThemePaths`] is the resolved shape every component receives.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Base name of a template file: the file name with the template extension
/// stripped (`sections/home.liquid` -> `home`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateName(pub String);

impl TemplateName {
    /// Derive the base name of `path`, stripping `.<ext>` only when present.
    pub fn from_path(path: &Path, ext: &str) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = format!(".{ext}");
        match file_name.strip_suffix(&suffix) {
            Some(stem) if !stem.is_empty() => Self(stem.to_owned()),
            _ => Self(file_name),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TemplateName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TemplateName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Exclusion
// ---------------------------------------------------------------------------

/// File-name suffixes that never take part in the entrypoint mirror.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExcludeRule {
    suffixes: Vec<String>,
}

impl ExcludeRule {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
        }
    }

    /// `true` when the final component of `path` ends with an excluded suffix.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Contents of `ayue.yaml`. Every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Source tree holding templates and frontend entry files.
    pub entry_dir: PathBuf,
    /// Output directory for extracted schema documents.
    pub doc_dir: PathBuf,
    /// Output directory for injected templates.
    pub build_dir: PathBuf,
    /// Build manifest produced by the bundler.
    pub manifest: PathBuf,
    /// Directory the manifest's `file` entries are relative to.
    pub assets_dir: PathBuf,
    /// Mirror of the entry tree without templates.
    pub entrypoints_dir: PathBuf,
    /// Flat copy of every template in the entry tree.
    pub sections_dir: PathBuf,
    /// Template extension without the leading dot.
    pub template_ext: String,
    /// File-name suffixes left out of the entrypoint mirror.
    pub exclude: Vec<String>,
    /// Glob (relative to `entry_dir`) selecting files copied to `sections_dir`.
    pub sections_pattern: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            entry_dir: PathBuf::from("src/theme"),
            doc_dir: PathBuf::from("ayue_doc"),
            build_dir: PathBuf::from("ayue_build"),
            manifest: PathBuf::from("assets/.vite/manifest.json"),
            assets_dir: PathBuf::from("assets"),
            entrypoints_dir: PathBuf::from("frontend/entrypoints"),
            sections_dir: PathBuf::from("sections"),
            template_ext: "liquid".to_string(),
            exclude: vec![".liquid".to_string(), ".DS_Store".to_string()],
            sections_pattern: "**/*.liquid".to_string(),
        }
    }
}

impl ThemeConfig {
    /// Resolve every path against `root`. Absolute entries are kept as-is.
    pub fn resolve(&self, root: &Path) -> Result<ThemePaths, ConfigError> {
        let template_ext = self.template_ext.trim_start_matches('.').to_string();
        if template_ext.is_empty() {
            return Err(ConfigError::Invalid {
                field: "template_ext",
                message: "must not be empty".to_string(),
            });
        }
        if self.sections_pattern.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "sections_pattern",
                message: "must not be empty".to_string(),
            });
        }

        Ok(ThemePaths {
            root: root.to_path_buf(),
            entry_dir: root.join(&self.entry_dir),
            doc_dir: root.join(&self.doc_dir),
            build_dir: root.join(&self.build_dir),
            manifest: root.join(&self.manifest),
            assets_dir: root.join(&self.assets_dir),
            entrypoints_dir: root.join(&self.entrypoints_dir),
            sections_dir: root.join(&self.sections_dir),
            template_ext,
            exclude: ExcludeRule::new(self.exclude.iter().cloned()),
            sections_pattern: self.sections_pattern.clone(),
        })
    }
}

/// Absolute paths and rules for one theme project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemePaths {
    pub root: PathBuf,
    pub entry_dir: PathBuf,
    pub doc_dir: PathBuf,
    pub build_dir: PathBuf,
    pub manifest: PathBuf,
    pub assets_dir: PathBuf,
    pub entrypoints_dir: PathBuf,
    pub sections_dir: PathBuf,
    pub template_ext: String,
    pub exclude: ExcludeRule,
    pub sections_pattern: String,
}

impl ThemePaths {
    /// Whether `path` names a template file (by extension).
    pub fn is_template(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == self.template_ext)
            .unwrap_or(false)
    }

    /// Show `path` relative to the project root for log lines.
    pub fn display_relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
