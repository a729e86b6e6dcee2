//! `ayue init`

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use ayue_core::config;

/// Write a default `ayue.yaml` into the project root.
#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let path = config::init_at(root)
            .with_context(|| format!("failed to init ayue.yaml under '{}'", root.display()))?;
        println!("{} Wrote {}", "✓".green(), path.display());
        Ok(())
    }
}
