//! Bundler manifest: logical source keys mapped to emitted files.
//!
//! ```json
//! {
//!   "frontend/entrypoints/home.js": { "file": "home.abc123.js", "isEntry": true },
//!   "frontend/entrypoints/home.scss": { "file": "home.4f2e.css" }
//! }
//! ```
//!
//! Entries keep the document order of the JSON object: when several keys
//! match one template their injections compound in that order.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use ayue_core::TemplateName;

use crate::error::{io_err, InjectError};

/// How an emitted file is spliced into a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Stylesheet,
    Script,
    Other,
}

/// One emission record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Emitted file, relative to the assets directory.
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, rename = "isEntry")]
    pub is_entry: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css: Vec<String>,
}

impl ManifestEntry {
    pub fn kind(&self) -> AssetKind {
        if self.file.ends_with(".css") {
            AssetKind::Stylesheet
        } else if self.file.ends_with(".js") {
            AssetKind::Script
        } else {
            AssetKind::Other
        }
    }

    /// Location of the emitted file under `assets_root`.
    pub fn asset_path(&self, assets_root: &Path) -> PathBuf {
        assets_root.join(&self.file)
    }
}

/// Parsed manifest, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<(String, ManifestEntry)>,
}

impl Manifest {
    /// Read and parse the manifest at `path`. Never cached: every call reads
    /// the file again.
    pub fn load(path: &Path) -> Result<Self, InjectError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(InjectError::ManifestNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(err) => return Err(io_err(path, err)),
        };
        Self::from_json_str(&contents).map_err(|source| InjectError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_str(contents: &str) -> Result<Self, serde_json::Error> {
        let object: Map<String, Value> = serde_json::from_str(contents)?;
        let mut entries = Vec::with_capacity(object.len());
        for (key, value) in object {
            let entry: ManifestEntry = serde_json::from_value(value)?;
            entries.push((key, entry));
        }
        Ok(Self { entries })
    }

    /// Entries whose key contains `name` as a substring, in document order.
    ///
    /// Keys are source paths such as `frontend/entrypoints/home.js`; `home`
    /// matches that key and any other key containing it.
    pub fn matching<'a>(
        &'a self,
        name: &'a TemplateName,
    ) -> impl Iterator<Item = (&'a str, &'a ManifestEntry)> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key.contains(name.as_str()))
            .map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VITE: &str = r#"{
        "frontend/entrypoints/zeta.js": { "file": "zeta.1.js", "isEntry": true, "imports": ["_x.js"] },
        "frontend/entrypoints/home.scss": { "file": "home.2.css" },
        "frontend/entrypoints/home.js": { "file": "home.3.js", "src": "frontend/entrypoints/home.js" }
    }"#;

    #[test]
    fn preserves_document_order() {
        let manifest = Manifest::from_json_str(VITE).unwrap();
        let keys: Vec<_> = manifest.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "frontend/entrypoints/zeta.js",
                "frontend/entrypoints/home.scss",
                "frontend/entrypoints/home.js",
            ]
        );
    }

    #[test]
    fn matching_is_substring_based() {
        let manifest = Manifest::from_json_str(VITE).unwrap();
        let name = TemplateName::from("home");
        let files: Vec<_> = manifest.matching(&name).map(|(_, e)| e.file.as_str()).collect();
        assert_eq!(files, vec!["home.2.css", "home.3.js"]);
    }

    #[test]
    fn entry_kind_from_extension() {
        let manifest = Manifest::from_json_str(VITE).unwrap();
        let kinds: Vec<_> = manifest.iter().map(|(_, e)| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![AssetKind::Script, AssetKind::Stylesheet, AssetKind::Script]
        );
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let manifest = Manifest::from_json_str(VITE).unwrap();
        let (_, first) = manifest.iter().next().unwrap();
        assert!(first.is_entry);
    }

    #[test]
    fn load_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = Manifest::load(&tmp.path().join("manifest.json")).unwrap_err();
        assert!(matches!(err, InjectError::ManifestNotFound { .. }), "got: {err}");
    }

    #[test]
    fn load_invalid_json_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("manifest.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, InjectError::ManifestParse { .. }), "got: {err}");
        assert!(err.to_string().contains("manifest.json"));
    }

    #[test]
    fn load_entry_without_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("manifest.json");
        std::fs::write(&path, r#"{"home": {"src": "home.js"}}"#).unwrap();
        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, InjectError::ManifestParse { .. }), "got: {err}");
    }

    #[test]
    fn load_array_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("manifest.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(
            Manifest::load(&path),
            Err(InjectError::ManifestParse { .. })
        ));
    }
}
