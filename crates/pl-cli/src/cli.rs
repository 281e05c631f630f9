//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pl_core::{AccountId, ApplicationId};

/// Console play history viewer.
///
/// Reconstructs play sessions and playtime statistics from the system's
/// play event log.
#[derive(Debug, Parser)]
#[command(name = "pl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Play log to read, overriding the configured path.
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a summary of the play log.
    Status,

    /// List every application id found in the log.
    Titles {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List play sessions of one application for one account.
    Sessions {
        /// Application id in hex (e.g., 0100000000010000).
        #[arg(long)]
        app: ApplicationId,

        /// Account id in hex.
        #[arg(long)]
        account: AccountId,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show playtime and launches per application within a time range.
    Stats {
        /// Account id in hex.
        #[arg(long)]
        account: AccountId,

        /// Range start, ISO 8601 or relative (default: 7 days ago).
        #[arg(long)]
        start: Option<String>,

        /// Range end, ISO 8601 or relative (default: now).
        #[arg(long)]
        end: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
