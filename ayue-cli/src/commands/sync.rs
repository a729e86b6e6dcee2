//! `ayue sync`: one-shot mirror of the entry tree.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use ayue_sync::{sync_entrypoints, WriteResult};

/// Arguments for `ayue sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Also list files that were already up to date.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl SyncArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let paths = super::project_paths(root)?;
        let verbose = self.verbose;
        let report = sync_entrypoints(&paths, |entry| {
            let dest = paths.display_relative(entry.dest());
            match entry.result {
                WriteResult::Written { .. } => {
                    println!("{} {dest}", " sync file ".on_green().black());
                }
                WriteResult::Unchanged { .. } if verbose => {
                    println!("{} {dest}", " unchanged ".dimmed());
                }
                WriteResult::Unchanged { .. } => {}
            }
        })
        .with_context(|| {
            format!(
                "failed to sync '{}' into '{}'",
                paths.display_relative(&paths.entry_dir),
                paths.display_relative(&paths.entrypoints_dir)
            )
        })?;

        for removed in &report.removed {
            println!("{} {}", " Unlink ".on_yellow().black(), paths.display_relative(removed));
        }
        for (path, err) in &report.failures {
            eprintln!("{} {}: {err}", " Error ".on_red().white(), path.display());
        }

        println!(
            "{} {} written, {} unchanged, {} removed",
            "✓".green(),
            report.written(),
            report.unchanged(),
            report.removed.len()
        );
        Ok(())
    }
}
