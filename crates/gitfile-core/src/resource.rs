//! Repository file resource model

use std::time::Duration;

use gitfile_git::{Commit, Signature};
use serde::{Deserialize, Serialize};

use crate::config::CommitDefaults;
use crate::diagnostics::Operation;
use crate::{Error, Result};

pub const DEFAULT_AUTHOR_NAME: &str = "Terraform Provider Git";
pub const DEFAULT_MESSAGE: &str = "Write file with Terraform Provider Git.";

/// Signature email used when none is declared; libgit2 rejects empty emails.
pub const FALLBACK_AUTHOR_EMAIL: &str = "terraform-provider-git@localhost";

const DEFAULT_TIMEOUT_SECS: u64 = 600;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Per-operation deadlines, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(default = "default_timeout")]
    pub create: u64,
    #[serde(default = "default_timeout")]
    pub read: u64,
    #[serde(default = "default_timeout")]
    pub update: u64,
    #[serde(default = "default_timeout")]
    pub delete: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: DEFAULT_TIMEOUT_SECS,
            read: DEFAULT_TIMEOUT_SECS,
            update: DEFAULT_TIMEOUT_SECS,
            delete: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Timeouts {
    /// Deadline for `operation`; import uses the read timeout.
    pub fn for_operation(&self, operation: Operation) -> Duration {
        let secs = match operation {
            Operation::Create => self.create,
            Operation::Read | Operation::Import => self.read,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        };
        Duration::from_secs(secs)
    }
}

/// Declared state of one tracked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryFile {
    /// Branch holding the file; replacing it recreates the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Path relative to the repository root; replacing it recreates the file
    pub path: String,

    pub content: String,

    /// Allow create to overwrite a file that is already committed
    #[serde(default)]
    pub override_on_create: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default)]
    pub timeouts: Timeouts,
}

impl RepositoryFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            branch: None,
            path: path.into(),
            content: content.into(),
            override_on_create: false,
            author_name: None,
            author_email: None,
            message: None,
            timeouts: Timeouts::default(),
        }
    }

    /// Declared branch, if set and non-empty.
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref().filter(|b| !b.is_empty())
    }

    /// Commit metadata: declared value, then provider default, then built-in.
    pub fn commit(&self, defaults: Option<&CommitDefaults>) -> Commit {
        let pick = |own: &Option<String>, provider: fn(&CommitDefaults) -> &Option<String>| {
            own.as_deref()
                .filter(|v| !v.is_empty())
                .or_else(|| defaults.and_then(|d| provider(d).as_deref()).filter(|v| !v.is_empty()))
                .map(str::to_string)
        };

        Commit {
            message: pick(&self.message, |d| &d.message).unwrap_or_else(|| DEFAULT_MESSAGE.into()),
            author: Signature {
                name: pick(&self.author_name, |d| &d.author_name)
                    .unwrap_or_else(|| DEFAULT_AUTHOR_NAME.into()),
                email: pick(&self.author_email, |d| &d.author_email)
                    .unwrap_or_else(|| FALLBACK_AUTHOR_EMAIL.into()),
            },
        }
    }

    /// Fill computed metadata (author name, message) the way it was committed.
    pub fn with_resolved_metadata(mut self, defaults: Option<&CommitDefaults>) -> Self {
        let commit = self.commit(defaults);
        self.author_name = Some(commit.author.name);
        self.message = Some(commit.message);
        self
    }
}

/// Observed state of one tracked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    /// Equal to the path once created; `None` once the file is gone
    pub id: Option<String>,

    #[serde(flatten)]
    pub file: RepositoryFile,
}

impl FileState {
    pub fn created(file: RepositoryFile) -> Self {
        Self {
            id: Some(file.path.clone()),
            file,
        }
    }

    /// Whether the file still exists as far as the last read knows.
    pub fn exists(&self) -> bool {
        self.id.is_some()
    }

    /// Path used to locate the file: the id, else the declared path.
    pub fn locator(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.file.path)
    }
}

/// Split an import identifier `branch:path`.
pub fn parse_import_id(id: &str) -> Result<(String, String)> {
    let invalid = || Error::InvalidImportId { id: id.to_string() };

    let (branch, path) = id.split_once(':').ok_or_else(invalid)?;
    if branch.is_empty() || path.is_empty() || path.contains(':') {
        return Err(invalid());
    }

    Ok((branch.to_string(), path.to_string()))
}
