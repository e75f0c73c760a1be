#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use gitfile_core::{ProviderConfig, RepositoryFiles, RetryPolicy};
use gitfile_git::session::new_workspace;
use gitfile_git::{
    Commit, Credentials, FileEdit, Git2Client, GitClient, HostKeyScanner, HttpConfig, KnownHosts,
    OpenOptions, RemoteTarget, Session, SessionProvider,
};
use gitfile_test_utils::BareRemote;

/// Provider URL used by tests; sessions never connect to it.
pub const PROVIDER_URL: &str = "https://git.example.com/org/config.git";

/// Clones a [`BareRemote`] over the local transport, whatever the target URL.
///
/// The clone ignores the operation deadline, so exhausting it always ends on
/// a push failure.
///
/// Counts opened sessions and push attempts, and can fail a number of
/// pushes before letting them through.
pub struct LocalSessions {
    remote_url: String,
    opened: AtomicUsize,
    pushes: Arc<AtomicUsize>,
    failing_pushes: Arc<AtomicUsize>,
}

impl LocalSessions {
    pub fn new(remote: &BareRemote) -> Self {
        Self {
            remote_url: remote.url(),
            opened: AtomicUsize::new(0),
            pushes: Arc::new(AtomicUsize::new(0)),
            failing_pushes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail the next `count` pushes.
    pub fn fail_pushes(self, count: usize) -> Self {
        self.failing_pushes.store(count, Ordering::SeqCst);
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn pushes(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }
}

impl SessionProvider for LocalSessions {
    fn open(
        &self,
        target: &RemoteTarget,
        _credentials: &Credentials,
        _options: OpenOptions,
    ) -> gitfile_git::Result<Session> {
        self.opened.fetch_add(1, Ordering::SeqCst);

        let workspace = new_workspace()?;
        let inner = Git2Client::clone_into(
            workspace.path(),
            &self.remote_url,
            target.branch(),
            None,
            None,
        )?;

        let client = FlakyClient {
            inner,
            pushes: self.pushes.clone(),
            failing_pushes: self.failing_pushes.clone(),
        };
        Ok(Session::new(workspace, Box::new(client)))
    }
}

struct FlakyClient {
    inner: Git2Client,
    pushes: Arc<AtomicUsize>,
    failing_pushes: Arc<AtomicUsize>,
}

impl GitClient for FlakyClient {
    fn path(&self) -> &Path {
        self.inner.path()
    }

    fn branch(&self) -> &str {
        self.inner.branch()
    }

    fn commit(&mut self, commit: &Commit, edits: &[FileEdit]) -> gitfile_git::Result<String> {
        self.inner.commit(commit, edits)
    }

    fn push(&mut self) -> gitfile_git::Result<()> {
        let attempt = self.pushes.fetch_add(1, Ordering::SeqCst) + 1;
        let failed = self
            .failing_pushes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();

        if failed {
            return Err(gitfile_git::Error::PushFailed {
                message: format!("remote hung up on attempt {attempt}"),
            });
        }
        self.inner.push()
    }
}

/// Scanner returning no keys without running anything.
pub struct StaticScanner;

impl HostKeyScanner for StaticScanner {
    fn scan(&self, _host: &str, _port: Option<u16>) -> gitfile_git::Result<KnownHosts> {
        Ok(KnownHosts::default())
    }
}

pub fn provider() -> ProviderConfig {
    let mut provider = ProviderConfig::new(PROVIDER_URL);
    provider.http = Some(HttpConfig {
        username: Some("bot".into()),
        password: Some("token".into()),
        ..HttpConfig::default()
    });
    provider
}

/// Reconciler over `sessions` with a fast fixed retry interval.
pub fn reconciler(provider: ProviderConfig, sessions: Arc<LocalSessions>) -> RepositoryFiles {
    RepositoryFiles::new(provider)
        .with_sessions(sessions)
        .with_scanner(Arc::new(StaticScanner))
        .with_retry_policy(RetryPolicy::fixed(Duration::from_millis(5)))
}
