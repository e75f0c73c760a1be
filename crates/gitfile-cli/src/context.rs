//! Paths and services shared by every command

use std::path::{Path, PathBuf};

use gitfile_core::{ProviderConfig, RepositoryFiles};

use crate::error::Result;
use crate::state::StateFile;

#[derive(Debug, Clone)]
pub struct Context {
    provider: PathBuf,
    state: PathBuf,
}

impl Context {
    pub fn new(provider: PathBuf, state: PathBuf) -> Self {
        Self { provider, state }
    }

    pub fn state_path(&self) -> &Path {
        &self.state
    }

    /// Reconciler for the configured provider.
    pub fn files(&self) -> Result<RepositoryFiles> {
        let provider = ProviderConfig::load(&self.provider)?;
        tracing::debug!(url = %provider.url, branch = ?provider.branch(), "Loaded provider");
        Ok(RepositoryFiles::new(provider))
    }

    pub fn load_state(&self) -> Result<StateFile> {
        StateFile::load(&self.state)
    }

    pub fn save_state(&self, state: &StateFile) -> Result<()> {
        StateFile::save(state, &self.state)
    }
}
