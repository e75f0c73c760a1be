//! git-file CLI
//!
//! Command-line host that keeps one file in a remote git repository at the
//! state declared in a resource document.

mod cli;
mod commands;
mod context;
mod error;
mod logging;
mod state;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use context::Context;
use error::Result;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to initialize logging: {}", "warning".yellow().bold(), e);
    }

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let context = Context::new(cli.provider, cli.state);
    let files = context.files()?;
    let mut state = context.load_state()?;

    let result = match cli.command {
        Commands::Plan {
            resource,
            no_refresh,
        } => {
            // Plan never persists what it refreshed.
            return commands::run_plan(&files, &mut state, &resource, !no_refresh).map(drop);
        }
        Commands::Apply {
            resource,
            no_refresh,
        } => commands::run_apply(&files, &mut state, &resource, !no_refresh),
        Commands::Refresh => commands::run_refresh(&files, &mut state),
        Commands::Destroy => commands::run_destroy(&files, &mut state),
        Commands::Import { id } => commands::run_import(&files, &mut state, &id),
    };

    // Persist partial progress, e.g. the delete half of a replace.
    context.save_state(&state)?;
    tracing::debug!(path = %context.state_path().display(), "Saved state");
    result
}
