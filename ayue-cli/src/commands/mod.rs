pub mod build;
pub mod daemon;
pub mod init;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use ayue_core::{config, ThemePaths};

/// Canonical project root.
pub fn project_root(root: &Path) -> Result<PathBuf> {
    root.canonicalize()
        .with_context(|| format!("cannot resolve project root '{}'", root.display()))
}

/// Load `ayue.yaml` (or the defaults) and resolve it against the project root.
pub fn project_paths(root: &Path) -> Result<ThemePaths> {
    let root = project_root(root)?;
    config::resolve_at(&root)
        .with_context(|| format!("failed to load config under '{}'", root.display()))
}
