//! Import command implementation

use colored::Colorize;
use gitfile_core::{Operation, RepositoryFiles};

use crate::error::{CliError, Result};
use crate::state::StateFile;

/// Start tracking the file identified by `branch:path`.
pub fn run_import(files: &RepositoryFiles, state: &mut StateFile, id: &str) -> Result<()> {
    if let Some(existing) = &state.resource {
        return Err(CliError::user(format!(
            "state already tracks {}; destroy it or use another state file",
            existing.locator()
        )));
    }

    let imported = files
        .import(id)
        .map_err(CliError::operation(Operation::Import))?;
    println!("{} {}", "Imported:".green().bold(), id);

    state.resource = Some(imported);
    Ok(())
}
