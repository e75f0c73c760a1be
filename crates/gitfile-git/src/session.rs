//! One-shot clone sessions
//!
//! Every lifecycle operation opens its own [`Session`]: a fresh temporary
//! workspace holding a full clone of the target branch. Nothing is cached.
//! Dropping the session deletes the workspace.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use tempfile::TempDir;

use crate::auth::{Credentials, HttpTransport};
use crate::client::{Git2Client, GitClient};
use crate::{Error, Result};

/// Branch used when none is configured.
pub const DEFAULT_BRANCH: &str = "main";

/// Prefix of session workspace directories.
const WORKSPACE_PREFIX: &str = "git-file-";

/// libgit2 keeps TLS trust roots in process-global state. Holds the PEM
/// installed last so repeated sessions do not reinstall it.
static INSTALLED_CA: Mutex<Option<String>> = Mutex::new(None);

/// Repository and ref an operation works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub url: String,
    pub branch: Option<String>,
}

impl RemoteTarget {
    pub fn new(url: impl Into<String>, branch: Option<String>) -> Self {
        Self {
            url: url.into(),
            branch,
        }
    }

    /// Configured branch, or [`DEFAULT_BRANCH`].
    pub fn branch(&self) -> &str {
        self.branch
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BRANCH)
    }
}

/// Knobs for [`SessionProvider::open`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    /// Allow credentials over plain `http://`
    pub allow_insecure_http: bool,

    /// Abandon the clone after this instant
    pub deadline: Option<Instant>,
}

/// A cloned working copy owned by a single operation.
pub struct Session {
    // Declared before `workspace` so the repository handle closes first.
    client: Box<dyn GitClient>,
    workspace: TempDir,
}

impl Session {
    pub fn new(workspace: TempDir, client: Box<dyn GitClient>) -> Self {
        Self { client, workspace }
    }

    /// Working tree root.
    pub fn path(&self) -> &Path {
        self.client.path()
    }

    /// Temporary directory removed when the session is dropped.
    pub fn workspace(&self) -> &Path {
        self.workspace.path()
    }

    pub fn client(&self) -> &dyn GitClient {
        self.client.as_ref()
    }

    pub fn client_mut(&mut self) -> &mut dyn GitClient {
        self.client.as_mut()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::trace!(workspace = %self.workspace.path().display(), "Removing session workspace");
    }
}

/// Factory for sessions.
pub trait SessionProvider: Send + Sync {
    /// Clone `target` with `credentials` into a new workspace.
    fn open(
        &self,
        target: &RemoteTarget,
        credentials: &Credentials,
        options: OpenOptions,
    ) -> Result<Session>;
}

/// [`SessionProvider`] that clones with libgit2.
#[derive(Debug, Clone, Copy, Default)]
pub struct Git2Sessions;

impl Git2Sessions {
    pub fn new() -> Self {
        Self
    }
}

impl SessionProvider for Git2Sessions {
    fn open(
        &self,
        target: &RemoteTarget,
        credentials: &Credentials,
        options: OpenOptions,
    ) -> Result<Session> {
        if let Credentials::Http(http) = credentials
            && http.transport == HttpTransport::Http
            && http.has_userinfo()
            && !options.allow_insecure_http
        {
            return Err(Error::InsecureCredentials);
        }

        if let Credentials::Http(http) = credentials
            && let Some(pem) = &http.ca_certificate
        {
            install_certificate_authority(pem)?;
        }

        let workspace = new_workspace()?;
        let client = Git2Client::clone_into(
            workspace.path(),
            &target.url,
            target.branch(),
            Some(credentials.clone()),
            options.deadline,
        )?;

        tracing::debug!(
            url = %target.url,
            branch = %target.branch(),
            workspace = %workspace.path().display(),
            "Opened repository session"
        );

        Ok(Session::new(workspace, Box::new(client)))
    }
}

/// Create a uniquely named, empty workspace directory.
pub fn new_workspace() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(WORKSPACE_PREFIX)
        .tempdir()
        .map_err(|e| Error::io(std::env::temp_dir(), e))
}

/// Add `pem` to libgit2's trust locations.
///
/// The setting is process-wide and outlives the session. It also applies to
/// clones already in flight on other threads; callers within one process
/// are expected to share a single provider CA.
fn install_certificate_authority(pem: &str) -> Result<()> {
    let mut installed = INSTALLED_CA
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if installed.as_deref() == Some(pem) {
        return Ok(());
    }

    let mut file = tempfile::NamedTempFile::new().map_err(|e| Error::io(std::env::temp_dir(), e))?;
    std::io::Write::write_all(&mut file, pem.as_bytes()).map_err(|e| Error::io(file.path(), e))?;

    // SAFETY: libgit2 loads the file during the call, before the temporary
    // file is dropped. INSTALLED_CA serializes installs against each other
    // only; it does not order them against running transfers.
    unsafe { git2::opts::set_ssl_cert_file(file.path())? };

    *installed = Some(pem.to_string());
    tracing::debug!("Installed certificate authority for HTTPS remotes");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::HttpCredentials;

    fn plain_http(username: &str) -> Credentials {
        Credentials::Http(HttpCredentials {
            transport: HttpTransport::Http,
            username: username.into(),
            password: String::new(),
            ca_certificate: None,
        })
    }

    #[test]
    fn test_branch_defaults_to_main() {
        assert_eq!(RemoteTarget::new("https://x/y.git", None).branch(), "main");
        assert_eq!(RemoteTarget::new("https://x/y.git", Some(String::new())).branch(), "main");
        assert_eq!(RemoteTarget::new("https://x/y.git", Some("dev".into())).branch(), "dev");
    }

    #[test]
    fn test_plain_http_credentials_refused_without_opt_in() {
        let target = RemoteTarget::new("http://127.0.0.1:9/repo.git", None);
        let result = Git2Sessions.open(&target, &plain_http("bot"), OpenOptions::default());
        assert!(matches!(result, Err(Error::InsecureCredentials)));
    }

    #[test]
    fn test_already_installed_authority_is_not_reinstalled() {
        let pem = "-----BEGIN CERTIFICATE-----\nnot a real certificate\n-----END CERTIFICATE-----\n";
        *INSTALLED_CA.lock().unwrap() = Some(pem.to_string());

        assert!(install_certificate_authority(pem).is_ok());
        assert_eq!(INSTALLED_CA.lock().unwrap().as_deref(), Some(pem));
    }

    #[test]
    fn test_workspace_is_removed_on_drop() {
        let workspace = new_workspace().unwrap();
        let path = workspace.path().to_path_buf();
        assert!(path.exists());
        drop(workspace);
        assert!(!path.exists());
    }
}
