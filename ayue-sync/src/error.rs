//! Error types for ayue-sync.

use std::path::PathBuf;

use thiserror::Error;

use ayue_core::ConfigError;
use ayue_inject::InjectError;

/// All errors that can arise from build and reconcile operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from manifest loading or template injection.
    #[error(transparent)]
    Inject(#[from] InjectError),

    /// An error from the project config.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output directory could not be removed or recreated.
    #[error("failed to recreate {path}: {source}")]
    DirectoryRecreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A destination entry without a source counterpart could not be removed.
    #[error("failed to delete orphan {path}: {source}")]
    OrphanDelete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failure.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Invalid sections glob.
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
