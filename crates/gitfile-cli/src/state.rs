//! Local state file
//!
//! Stands in for the host's state store: the last observed file plus the
//! resource's private key/value state, kept as pretty-printed JSON.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use gitfile_core::{FileState, PrivateState};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    pub resource: Option<FileState>,

    #[serde(default)]
    pub private: PrivateState,
}

impl StateFile {
    /// Load `path`; a missing file is an empty state.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No state file, starting empty");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(CliError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&content).map_err(|source| CliError::State {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|source| CliError::State {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, content + "\n").map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitfile_core::RepositoryFile;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_state() {
        let temp = TempDir::new().unwrap();
        let state = StateFile::load(&temp.path().join("state.json")).unwrap();
        assert_eq!(state, StateFile::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");

        let mut state = StateFile {
            resource: Some(FileState::created(RepositoryFile::new("a.txt", "a"))),
            ..StateFile::default()
        };
        state.private.set_ignore_updates(true);
        state.save(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains(r#""IgnoreUpdates": "true""#));
        assert_eq!(StateFile::load(&path).unwrap(), state);
    }

    #[test]
    fn test_corrupt_state_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let err = StateFile::load(&path).unwrap_err();
        assert!(matches!(err, CliError::State { .. }));
    }
}
