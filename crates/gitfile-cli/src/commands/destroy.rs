//! Destroy command implementation

use colored::Colorize;
use gitfile_core::{Operation, RepositoryFiles};

use crate::error::{CliError, Result};
use crate::state::StateFile;

/// Delete the tracked file and forget it.
pub fn run_destroy(files: &RepositoryFiles, state: &mut StateFile) -> Result<()> {
    let Some(prior) = &state.resource else {
        println!("Nothing to destroy.");
        return Ok(());
    };

    files
        .delete(prior)
        .map_err(CliError::operation(Operation::Delete))?;
    println!("{} {}", "Destroyed:".green().bold(), prior.locator());

    *state = StateFile::default();
    Ok(())
}
