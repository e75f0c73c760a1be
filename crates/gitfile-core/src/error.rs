//! Error types for gitfile-core

use std::path::PathBuf;

/// Result type for gitfile-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling a repository file
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Create found the path already committed and overriding is disabled
    #[error("cannot override existing file: {path}")]
    OverrideConflict { path: String },

    /// Update, delete or import target is missing from the branch
    #[error("file doesn't exist: {path}")]
    FileNotFound { path: String },

    /// The path exists but is not a regular file
    #[error("file is a directory: {path}")]
    NotARegularFile { path: String },

    /// Import identifier is not `branch:path`
    #[error("expected id to have format branch:path, got {id:?}")]
    InvalidImportId { id: String },

    /// Resource path cannot be used inside the working tree
    #[error("invalid file path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// Provider or resource configuration is invalid
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A configuration document could not be parsed
    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// Configuration file extension is not recognised
    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Git error from gitfile-git
    #[error(transparent)]
    Git(#[from] gitfile_git::Error),
}

/// How an error should be treated by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Declared configuration is wrong; retrying cannot help
    Config,
    /// Network or remote-state failure; retried within the deadline
    Transient,
    /// A directory sits where the file should be
    NotARegularFile,
    /// Local filesystem failure
    Io,
    /// Clone, commit or other repository failure
    Repository,
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OverrideConflict { .. }
            | Self::FileNotFound { .. }
            | Self::InvalidImportId { .. }
            | Self::InvalidPath { .. }
            | Self::InvalidConfig { .. }
            | Self::ConfigParse { .. }
            | Self::UnsupportedFormat { .. } => ErrorKind::Config,
            Self::NotARegularFile { .. } => ErrorKind::NotARegularFile,
            Self::Io { .. } => ErrorKind::Io,
            Self::Git(gitfile_git::Error::PushFailed { .. }) => ErrorKind::Transient,
            Self::Git(gitfile_git::Error::Io { .. }) => ErrorKind::Io,
            Self::Git(e) if e.is_configuration() => ErrorKind::Config,
            Self::Git(_) => ErrorKind::Repository,
        }
    }
}
