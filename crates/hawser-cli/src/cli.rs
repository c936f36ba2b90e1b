use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hawser",
    about = "Keeps a content-addressable store moored to an on-chain reference ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the TOML configuration file.
    #[arg(short, long, global = true, default_value = "hawser.toml")]
    pub config: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the watcher daemon
    Run,
    /// Run one reconciliation sweep and exit
    Sweep,
    /// Inspect or invalidate the processing checkpoint
    Checkpoint {
        #[command(subcommand)]
        action: CheckpointAction,
    },
}

#[derive(Subcommand)]
pub enum CheckpointAction {
    /// Print the current checkpoint
    Show,
    /// Delete the checkpoint so the next watch starts from genesis
    Clear,
}
