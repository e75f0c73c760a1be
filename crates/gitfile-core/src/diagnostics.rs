//! Diagnostics reported back to the host

use std::fmt;

use serde::Serialize;

use crate::error::{Error, ErrorKind};

/// Lifecycle operation of a repository file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl Operation {
    /// Summary line used when the operation fails.
    pub fn error_summary(self) -> &'static str {
        match self {
            Self::Create => "Git File Create Error",
            Self::Read => "Git File Read Error",
            Self::Update => "Git File Update Error",
            Self::Delete => "Git File Remove Error",
            Self::Import => "Git File Import Error",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Import => "import",
        };
        f.write_str(name)
    }
}

/// A named error as surfaced to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub summary: String,
    pub detail: String,
    pub retryable: bool,
}

impl Diagnostic {
    pub fn from_error(operation: Operation, error: &Error) -> Self {
        Self {
            summary: operation.error_summary().to_string(),
            detail: error.to_string(),
            retryable: error.kind() == ErrorKind::Transient,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_from_error() {
        let diag = Diagnostic::from_error(
            Operation::Delete,
            &Error::NotARegularFile {
                path: "docs".into(),
            },
        );
        assert_eq!(diag.summary, "Git File Remove Error");
        assert_eq!(diag.detail, "file is a directory: docs");
        assert!(!diag.retryable);
        assert_eq!(diag.to_string(), "Git File Remove Error: file is a directory: docs");
    }
}
