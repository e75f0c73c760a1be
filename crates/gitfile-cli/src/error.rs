//! Error types for gitfile-cli

use std::path::PathBuf;

use gitfile_core::{Diagnostic, Operation};

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A lifecycle operation failed; displayed as its diagnostic
    #[error("{}", Diagnostic::from_error(*operation, source))]
    Operation {
        operation: Operation,
        #[source]
        source: gitfile_core::Error,
    },

    /// Error from gitfile-core outside a lifecycle operation
    #[error(transparent)]
    Core(#[from] gitfile_core::Error),

    /// State file could not be read or written
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State file is not valid JSON
    #[error("Invalid state file {path}: {source}")]
    State {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Wrap a failure of `operation`.
    pub fn operation(operation: Operation) -> impl FnOnce(gitfile_core::Error) -> Self {
        move |source| Self::Operation { operation, source }
    }
}
