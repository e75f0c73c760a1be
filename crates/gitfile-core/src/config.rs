//! Provider configuration
//!
//! Configuration documents are loaded by extension: `.toml`, `.json`,
//! `.yaml` / `.yml`.

use std::fs;
use std::path::Path;

use gitfile_git::{HttpConfig, SshConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Provider-wide commit metadata defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitDefaults {
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub message: Option<String>,
}

/// Settings shared by every repository file of one provider.
///
/// ```toml
/// url = "https://git.example.com/org/config.git"
/// branch = "main"
/// ignore_updates = false
///
/// [http]
/// username = "bot"
/// password = "token"
///
/// [commits]
/// author_email = "bot@example.com"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Remote repository URL (`http`, `https` or `ssh`)
    pub url: String,

    /// Branch used by files that do not declare one
    pub branch: Option<String>,

    pub ssh: Option<SshConfig>,
    pub http: Option<HttpConfig>,
    pub commits: Option<CommitDefaults>,

    /// Freeze tracked content against drift detection
    pub ignore_updates: bool,
}

impl ProviderConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Load and validate a provider configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = load_document(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "provider url is required".into(),
            });
        }
        Ok(())
    }

    pub fn allow_insecure_http(&self) -> bool {
        self.http.as_ref().is_some_and(|h| h.allow_insecure_http)
    }

    /// Provider branch, if set and non-empty.
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref().filter(|b| !b.is_empty())
    }
}

/// Deserialize a document, picking the format from the file extension.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let parse_error = |format: &str, message: String| Error::ConfigParse {
        path: path.to_path_buf(),
        format: format.into(),
        message,
    };

    match extension.as_str() {
        "toml" => toml::from_str(&content).map_err(|e| parse_error("TOML", e.to_string())),
        "json" => serde_json::from_str(&content).map_err(|e| parse_error("JSON", e.to_string())),
        "yaml" | "yml" => {
            serde_yaml::from_str(&content).map_err(|e| parse_error("YAML", e.to_string()))
        }
        _ => Err(Error::UnsupportedFormat { extension }),
    }
}
