//! Error types for ayue-inject.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while reading the manifest or transforming a template.
#[derive(Debug, Error)]
pub enum InjectError {
    /// The build manifest does not exist.
    #[error("manifest not found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// The build manifest is not a JSON object of `{ "file": ... }` records.
    #[error("failed to parse manifest at {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A manifest entry points at an emitted asset that cannot be read.
    #[error("asset {asset} for template {template} could not be read: {source}")]
    MissingAsset {
        template: PathBuf,
        asset: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem error while reading a template or writing an output.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A built-in pattern failed to compile.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> InjectError {
    InjectError::Io {
        path: path.into(),
        source,
    }
}
