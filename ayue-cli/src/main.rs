//! ayue: Liquid theme asset injection and live directory sync.
//!
//! # Usage
//!
//! ```text
//! ayue [--root <dir>] init
//! ayue [--root <dir>] build [--json]
//! ayue [--root <dir>] sync
//! ayue [--root <dir>] dev
//! ayue [--root <dir>] stop|status|notify-build
//! ayue [--root <dir>] hot-update <path>
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{build::BuildArgs, daemon::HotUpdateArgs, init::InitArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "ayue",
    version,
    about = "Inject bundled assets into Liquid templates and keep theme directories in sync",
    long_about = None,
)]
struct Cli {
    /// Theme project root (where `ayue.yaml` lives).
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default ayue.yaml.
    Init(InitArgs),

    /// Run one build pass: schema documents and injected templates.
    Build(BuildArgs),

    /// Mirror the entry tree into the entrypoints directory once.
    Sync(SyncArgs),

    /// Run the daemon in the foreground (initial sync, watcher, socket).
    Dev,

    /// Ask a running daemon to shut down.
    Stop,

    /// Query a running daemon.
    Status,

    /// Tell the running daemon the bundler finished a build.
    NotifyBuild,

    /// Copy a changed template into the sections directory.
    HotUpdate(HotUpdateArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let root = cli.root;
    match cli.command {
        Commands::Init(args) => args.run(&root),
        Commands::Build(args) => args.run(&root),
        Commands::Sync(args) => args.run(&root),
        Commands::Dev => commands::daemon::dev(&root),
        Commands::Stop => commands::daemon::stop(&root),
        Commands::Status => commands::daemon::status(&root),
        Commands::NotifyBuild => commands::daemon::notify_build(&root),
        Commands::HotUpdate(args) => args.run(&root),
    }
}
