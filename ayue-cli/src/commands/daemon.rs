//! Daemon lifecycle and signals: `dev`, `stop`, `status`, `notify-build`,
//! `hot-update`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use ayue_daemon::paths::socket_path;
use ayue_daemon::{
    request_build, request_hot_update, request_status, request_stop, start_blocking, DaemonError,
};
use ayue_sync::{MirrorAction, MirrorTarget};

pub fn dev(root: &Path) -> Result<()> {
    let paths = super::project_paths(root)?;
    start_blocking(paths).context("daemon exited with error")
}

pub fn stop(root: &Path) -> Result<()> {
    let root = super::project_root(root)?;
    match request_stop(&root) {
        Ok(()) => println!("daemon stop requested"),
        Err(DaemonError::DaemonNotRunning { .. }) => println!("daemon is not running"),
        Err(err) => return Err(err).context("failed to stop daemon"),
    }
    Ok(())
}

pub fn status(root: &Path) -> Result<()> {
    let root = super::project_root(root)?;
    let payload = match request_status(&root) {
        Ok(status) => status,
        Err(DaemonError::DaemonNotRunning { .. }) => serde_json::json!({
            "running": false,
            "socket": socket_path(&root).display().to_string(),
        }),
        Err(err) => return Err(err).context("failed to query daemon status"),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to render daemon status JSON")?
    );
    Ok(())
}

pub fn notify_build(root: &Path) -> Result<()> {
    let root = super::project_root(root)?;
    let summary = request_build(&root).context("build request failed")?;
    for (key, label) in [("docs", " Doc ".on_blue().white()), ("outputs", " Build-Liquid ".on_green().black())] {
        for path in summary[key].as_array().into_iter().flatten() {
            println!("{label} {}", path.as_str().unwrap_or_default());
        }
    }
    for failure in summary["failures"].as_array().into_iter().flatten() {
        eprintln!("{} {}", " Error ".on_red().white(), failure.as_str().unwrap_or_default());
    }
    Ok(())
}

/// Arguments for `ayue hot-update`.
#[derive(Args, Debug)]
pub struct HotUpdateArgs {
    /// Changed template, absolute or relative to the current directory.
    pub path: PathBuf,
}

impl HotUpdateArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let path = self
            .path
            .canonicalize()
            .with_context(|| format!("cannot resolve path '{}'", self.path.display()))?;
        let root = super::project_root(root)?;

        match request_hot_update(&root, &path) {
            Ok(data) => {
                for copied in data["copied"].as_array().into_iter().flatten() {
                    println!("{} {}", " HotUpdate ".on_magenta().white(), copied.as_str().unwrap_or_default());
                }
                Ok(())
            }
            Err(DaemonError::DaemonNotRunning { .. }) => self.apply_directly(&root, &path),
            Err(err) => Err(err).context("hot update request failed"),
        }
    }

    fn apply_directly(&self, root: &Path, path: &Path) -> Result<()> {
        let paths = super::project_paths(root)?;
        let entry_dir = paths
            .entry_dir
            .canonicalize()
            .with_context(|| format!("cannot resolve entry dir '{}'", paths.entry_dir.display()))?;
        let sections = MirrorTarget::sections(&paths).context("invalid sections pattern")?;

        match ayue_sync::hot_update(&entry_dir, &sections, path)
            .with_context(|| format!("hot update failed for '{}'", path.display()))?
        {
            MirrorAction::Copied(result) => println!(
                "{} {}",
                " HotUpdate ".on_magenta().white(),
                paths.display_relative(result.path())
            ),
            _ => println!(
                "{} is not a template under '{}'; nothing to do",
                path.display(),
                paths.display_relative(&paths.entry_dir)
            ),
        }
        Ok(())
    }
}
