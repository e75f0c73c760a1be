//! Error types for gitfile-git

use std::path::PathBuf;

/// Result type for gitfile-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gitfile-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid repository url '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("scheme {scheme:?} is not supported")]
    UnsupportedScheme { scheme: String },

    #[error("{scheme} scheme requires a '{block}' credentials block")]
    MissingCredentials {
        scheme: String,
        block: &'static str,
    },

    #[error("ssh scheme cannot be used without private key")]
    SshWithoutPrivateKey,

    #[error("credentials cannot be sent over plain http unless allow_insecure_http is set")]
    InsecureCredentials,

    #[error("Host key scan for {host} failed: {message}")]
    HostKeyScan { host: String, message: String },

    #[error("Failed to clone {url} at branch '{branch}': {message}")]
    CloneFailed {
        url: String,
        branch: String,
        message: String,
    },

    #[error("Push failed: {message}")]
    PushFailed { message: String },

    #[error("Remote not found: {name}")]
    RemoteNotFound { name: String },

    #[error("Nothing to commit")]
    NoChanges,
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Errors caused by the declared configuration rather than the remote.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl { .. }
                | Self::UnsupportedScheme { .. }
                | Self::MissingCredentials { .. }
                | Self::SshWithoutPrivateKey
                | Self::InsecureCredentials
        )
    }
}
