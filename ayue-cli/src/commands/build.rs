//! `ayue build`: one build pass.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use ayue_sync::build;

/// Arguments for `ayue build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Emit the build summary as JSON instead of labelled lines.
    #[arg(long)]
    pub json: bool,
}

impl BuildArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let paths = super::project_paths(root)?;
        let report = build::run(&paths);
        let summary = report.summary(&paths);

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("failed to render build summary")?
            );
            return Ok(());
        }

        for doc in &summary.docs {
            println!("{} {doc}", " Doc ".on_blue().white());
        }
        for output in &summary.outputs {
            println!("{} {output}", " Build-Liquid ".on_green().black());
        }
        for failure in &summary.failures {
            eprintln!("{} {failure}", " Error ".on_red().white());
        }

        let line = format!(
            "{} template(s), {} injected, {} schema doc(s)",
            summary.templates,
            summary.outputs.len(),
            summary.docs.len()
        );
        if report.is_clean() {
            println!("{} {line}", "✓".green());
        } else {
            println!("{} {line}, {} failure(s)", "!".yellow(), summary.failures.len());
        }
        Ok(())
    }
}
