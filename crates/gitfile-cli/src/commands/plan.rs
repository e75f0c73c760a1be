//! Plan command implementation

use std::path::Path;

use colored::Colorize;
use gitfile_core::config::load_document;
use gitfile_core::{Action, Plan, RepositoryFile, RepositoryFiles, plan};

use super::refresh::refresh_state;
use crate::error::Result;
use crate::state::StateFile;

/// Compute and print the plan for the resource document at `resource`.
pub fn run_plan(
    files: &RepositoryFiles,
    state: &mut StateFile,
    resource: &Path,
    refresh: bool,
) -> Result<Plan> {
    let desired: RepositoryFile = load_document(resource)?;

    if refresh {
        refresh_state(files, state)?;
    }

    let plan = plan::plan(state.resource.as_ref(), &desired, &state.private);
    print_plan(&plan);
    Ok(plan)
}

fn print_plan(plan: &Plan) {
    let action = match plan.action {
        Action::Create => plan.action.to_string().green(),
        Action::Update => plan.action.to_string().yellow(),
        Action::Replace => plan.action.to_string().red(),
        Action::NoOp => plan.action.to_string().dimmed(),
    };
    println!("{} {} {}", "Plan:".bold(), action, plan.planned.path);

    if plan.content_frozen {
        println!("  content change ignored: updates are frozen for this provider");
    }
}
