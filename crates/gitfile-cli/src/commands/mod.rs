//! Command implementations for the git-file CLI

mod apply;
mod destroy;
mod import;
mod plan;
mod refresh;

pub use apply::run_apply;
pub use destroy::run_destroy;
pub use import::run_import;
pub use plan::run_plan;
pub use refresh::run_refresh;
