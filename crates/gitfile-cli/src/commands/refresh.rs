//! Refresh command implementation

use colored::Colorize;
use gitfile_core::{Operation, RepositoryFiles};

use crate::error::{CliError, Result};
use crate::state::StateFile;

/// Read the tracked file and print what changed.
pub fn run_refresh(files: &RepositoryFiles, state: &mut StateFile) -> Result<()> {
    let Some(path) = state.resource.as_ref().map(|r| r.locator().to_string()) else {
        println!("Nothing to refresh.");
        return Ok(());
    };

    if refresh_state(files, state)? {
        println!("{} {}", "Refreshed:".green().bold(), path);
    } else {
        println!("{} {} no longer exists", "Gone:".yellow().bold(), path);
    }
    Ok(())
}

/// Replace the stored state with a fresh read.
///
/// Returns whether the file still exists; a vanished file is dropped from
/// the state.
pub(crate) fn refresh_state(files: &RepositoryFiles, state: &mut StateFile) -> Result<bool> {
    let Some(prior) = &state.resource else {
        return Ok(false);
    };

    let observed = files
        .read(prior, &mut state.private)
        .map_err(CliError::operation(Operation::Read))?;

    let exists = observed.exists();
    state.resource = exists.then_some(observed);
    Ok(exists)
}
