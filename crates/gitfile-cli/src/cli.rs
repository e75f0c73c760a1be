//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// git-file - Keep a single file in a remote git repository at its declared state
#[derive(Parser, Debug)]
#[command(name = "git-file")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Provider configuration file (.toml, .json, .yaml)
    #[arg(long, global = true, env = "GIT_FILE_PROVIDER", default_value = "provider.toml")]
    pub provider: PathBuf,

    /// State file tracking the observed file and its private state
    #[arg(long, global = true, env = "GIT_FILE_STATE", default_value = "git-file.state.json")]
    pub state: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show what apply would do
    Plan {
        /// Resource document describing the desired file
        #[arg(long)]
        resource: PathBuf,

        /// Plan against the stored state without reading the remote first
        #[arg(long)]
        no_refresh: bool,
    },

    /// Converge the remote file to the resource document
    Apply {
        /// Resource document describing the desired file
        #[arg(long)]
        resource: PathBuf,

        /// Plan against the stored state without reading the remote first
        #[arg(long)]
        no_refresh: bool,
    },

    /// Read the tracked file back from the remote
    Refresh,

    /// Delete the tracked file from the remote
    Destroy,

    /// Start tracking an existing file
    ///
    /// Examples:
    ///   git-file import main:docs/readme.md
    Import {
        /// Identifier in the form <branch>:<path>
        id: String,
    },
}
