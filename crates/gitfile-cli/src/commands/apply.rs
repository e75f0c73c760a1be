//! Apply command implementation

use std::path::Path;

use colored::Colorize;
use gitfile_core::{Action, Operation, RepositoryFiles};

use super::plan::run_plan;
use crate::error::{CliError, Result};
use crate::state::StateFile;

/// Plan, then run the lifecycle operation the plan calls for.
pub fn run_apply(
    files: &RepositoryFiles,
    state: &mut StateFile,
    resource: &Path,
    refresh: bool,
) -> Result<()> {
    let plan = run_plan(files, state, resource, refresh)?;

    match plan.action {
        Action::NoOp => {
            println!("{}", "No changes.".green());
            return Ok(());
        }
        Action::Create => {
            let created = files
                .create(&plan.planned)
                .map_err(CliError::operation(Operation::Create))?;
            state.resource = Some(created);
        }
        Action::Update => {
            let updated = files
                .update(&plan.planned)
                .map_err(CliError::operation(Operation::Update))?;
            state.resource = Some(updated);
        }
        Action::Replace => {
            if let Some(prior) = &state.resource {
                files
                    .delete(prior)
                    .map_err(CliError::operation(Operation::Delete))?;
            }
            state.resource = None;

            let created = files
                .create(&plan.planned)
                .map_err(CliError::operation(Operation::Create))?;
            state.resource = Some(created);
        }
    }

    println!("{} {}", "Applied:".green().bold(), plan.planned.path);
    Ok(())
}
