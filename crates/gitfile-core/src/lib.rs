//! Repository file reconciliation engine
//!
//! Converges a single file in a remote git repository towards its declared
//! state: create, read, update, delete and import, each in its own clone,
//! with bounded push retries and an optional drift freeze at plan time.

pub mod config;
pub mod diagnostics;
pub mod drift;
pub mod error;
pub mod plan;
pub mod probe;
pub mod reconciler;
pub mod resource;
pub mod retry;

pub use config::{CommitDefaults, ProviderConfig};
pub use diagnostics::{Diagnostic, Operation};
pub use drift::{PlanValue, PrivateState};
pub use error::{Error, ErrorKind, Result};
pub use plan::{Action, Plan};
pub use probe::Existence;
pub use reconciler::RepositoryFiles;
pub use resource::{FileState, RepositoryFile, Timeouts};
pub use retry::RetryPolicy;
