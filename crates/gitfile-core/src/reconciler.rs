//! Repository file reconciler
//!
//! Each lifecycle operation opens its own session, inspects the target path,
//! mutates and commits when needed, and pushes. Only the push is retried;
//! every other failure ends the operation on the spot.

use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gitfile_git::auth;
use gitfile_git::{
    Commit, Credentials, FileEdit, Git2Sessions, HostKeyScanner, OpenOptions, RemoteTarget,
    Session, SessionProvider, SshKeyscan,
};

use crate::config::ProviderConfig;
use crate::diagnostics::Operation;
use crate::drift::PrivateState;
use crate::probe::{self, Existence};
use crate::resource::{self, FileState, RepositoryFile};
use crate::retry::{Attempt, Classify, RetryPolicy, retry_until};
use crate::{Error, Result};

/// Lifecycle operations for files of one provider.
pub struct RepositoryFiles {
    provider: ProviderConfig,
    sessions: Arc<dyn SessionProvider>,
    scanner: Arc<dyn HostKeyScanner>,
    retry: RetryPolicy,
}

impl RepositoryFiles {
    /// Reconciler cloning with libgit2 and scanning host keys with `ssh-keyscan`.
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            sessions: Arc::new(Git2Sessions::new()),
            scanner: Arc::new(SshKeyscan::new()),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_sessions(mut self, sessions: Arc<dyn SessionProvider>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_scanner(mut self, scanner: Arc<dyn HostKeyScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    /// Commit `desired` to its branch.
    ///
    /// Fails if the path is already committed, unless `override_on_create`
    /// is set.
    pub fn create(&self, desired: &RepositoryFile) -> Result<FileState> {
        let operation = Operation::Create;
        probe::check_path(&desired.path)?;
        let credentials = self.credentials()?;
        let commit = desired.commit(self.provider.commits.as_ref());
        let timeout = desired.timeouts.for_operation(operation);
        let deadline = deadline_after(timeout);

        retry_until(&self.retry, timeout, operation, || -> Attempt<()> {
            let mut session = self
                .open_session(self.branch_for(desired), &credentials, deadline)
                .permanent()?;
            let target = probe::workspace_path(session.path(), &desired.path).permanent()?;

            match probe::probe(&target).permanent()? {
                Existence::Present if !desired.override_on_create => {
                    return Err(Error::OverrideConflict {
                        path: desired.path.clone(),
                    })
                    .permanent();
                }
                Existence::NotARegularFile => {
                    return Err(Error::NotARegularFile {
                        path: desired.path.clone(),
                    })
                    .permanent();
                }
                _ => {}
            }

            let edit = FileEdit::write(&desired.path, &desired.content);
            commit_and_push(&mut session, &commit, &[edit])
        })?;

        tracing::info!(path = %desired.path, branch = ?desired.branch(), "Created file");
        Ok(FileState::created(
            desired.clone().with_resolved_metadata(self.provider.commits.as_ref()),
        ))
    }

    /// Refresh `state` from the remote.
    ///
    /// With `ignore_updates` set on the provider the prior state is returned
    /// untouched and no clone is made. A file that no longer exists comes
    /// back with its id cleared.
    pub fn read(&self, state: &FileState, private: &mut PrivateState) -> Result<FileState> {
        if self.provider.ignore_updates {
            private.set_ignore_updates(true);
            tracing::debug!(path = %state.locator(), "Updates ignored, keeping prior state");
            return Ok(state.clone());
        }

        private.set_ignore_updates(false);
        self.read_file(Operation::Read, state)
    }

    /// Overwrite an existing file with `desired`. Never creates the file.
    pub fn update(&self, desired: &RepositoryFile) -> Result<FileState> {
        let operation = Operation::Update;
        probe::check_path(&desired.path)?;
        let credentials = self.credentials()?;
        let commit = desired.commit(self.provider.commits.as_ref());
        let timeout = desired.timeouts.for_operation(operation);
        let deadline = deadline_after(timeout);

        retry_until(&self.retry, timeout, operation, || -> Attempt<()> {
            let mut session = self
                .open_session(self.branch_for(desired), &credentials, deadline)
                .permanent()?;
            let target = probe::workspace_path(session.path(), &desired.path).permanent()?;
            require_regular_file(&target, &desired.path).permanent()?;

            let edit = FileEdit::write(&desired.path, &desired.content);
            commit_and_push(&mut session, &commit, &[edit])
        })?;

        tracing::info!(path = %desired.path, branch = ?desired.branch(), "Updated file");
        Ok(FileState::created(
            desired.clone().with_resolved_metadata(self.provider.commits.as_ref()),
        ))
    }

    /// Remove the file described by `state`. A file that is already gone is
    /// not an error.
    pub fn delete(&self, state: &FileState) -> Result<()> {
        let operation = Operation::Delete;
        let path = state.locator();
        probe::check_path(path)?;
        let credentials = self.credentials()?;
        let commit = state.file.commit(self.provider.commits.as_ref());
        let timeout = state.file.timeouts.for_operation(operation);
        let deadline = deadline_after(timeout);

        retry_until(&self.retry, timeout, operation, || -> Attempt<()> {
            let mut session = self
                .open_session(self.branch_for(&state.file), &credentials, deadline)
                .permanent()?;
            let target = probe::workspace_path(session.path(), path).permanent()?;

            match probe::probe(&target).permanent()? {
                Existence::Absent => {
                    tracing::debug!(path, "File already absent, nothing to delete");
                    return Ok(());
                }
                Existence::NotARegularFile => {
                    return Err(Error::NotARegularFile {
                        path: path.to_string(),
                    })
                    .permanent();
                }
                Existence::Present => {}
            }

            commit_and_push(&mut session, &commit, &[FileEdit::remove(path)])
        })?;

        tracing::info!(path, branch = ?state.file.branch(), "Deleted file");
        Ok(())
    }

    /// Adopt an existing file identified by `branch:path`.
    pub fn import(&self, id: &str) -> Result<FileState> {
        let (branch, path) = resource::parse_import_id(id)?;

        let mut seed = RepositoryFile::new(path, String::new());
        seed.branch = Some(branch);
        seed.override_on_create = true;
        let seed = FileState::created(seed.with_resolved_metadata(self.provider.commits.as_ref()));

        let state = self.read_file(Operation::Import, &seed)?;
        if !state.exists() {
            return Err(Error::FileNotFound {
                path: seed.file.path,
            });
        }

        tracing::info!(id, "Imported file");
        Ok(state)
    }

    fn read_file(&self, operation: Operation, state: &FileState) -> Result<FileState> {
        let path = state.locator().to_string();
        probe::check_path(&path)?;
        let credentials = self.credentials()?;
        let deadline = deadline_after(state.file.timeouts.for_operation(operation));

        let session = self.open_session(self.branch_for(&state.file), &credentials, deadline)?;
        let target = probe::workspace_path(session.path(), &path)?;

        match probe::probe(&target)? {
            Existence::Absent => {
                tracing::debug!(path = %path, "File no longer exists, clearing id");
                return Ok(FileState {
                    id: None,
                    file: state.file.clone(),
                });
            }
            Existence::NotARegularFile => return Err(Error::NotARegularFile { path }),
            Existence::Present => {}
        }

        let bytes = fs::read(&target).map_err(|e| Error::io(&target, e))?;
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path, "File is not valid UTF-8, replacing invalid bytes");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok(FileState {
            id: Some(path.clone()),
            file: RepositoryFile {
                path,
                content,
                ..state.file.clone()
            },
        })
    }

    /// Resource branch, then provider branch; the session defaults the rest.
    fn branch_for<'a>(&'a self, file: &'a RepositoryFile) -> Option<&'a str> {
        file.branch().or_else(|| self.provider.branch())
    }

    fn credentials(&self) -> Result<Credentials> {
        let credentials = auth::resolve(
            &self.provider.url,
            self.provider.http.as_ref(),
            self.provider.ssh.as_ref(),
            self.scanner.as_ref(),
        )?;
        Ok(credentials)
    }

    fn open_session(
        &self,
        branch: Option<&str>,
        credentials: &Credentials,
        deadline: Option<Instant>,
    ) -> Result<Session> {
        let target = RemoteTarget::new(&self.provider.url, branch.map(str::to_string));
        let options = OpenOptions {
            allow_insecure_http: self.provider.allow_insecure_http(),
            deadline,
        };
        Ok(self.sessions.open(&target, credentials, options)?)
    }
}

/// Clone deadline `timeout` from now; none if it does not fit an `Instant`.
fn deadline_after(timeout: Duration) -> Option<Instant> {
    let deadline = Instant::now().checked_add(timeout);
    if deadline.is_none() {
        tracing::debug!(timeout = ?timeout, "Timeout out of range, clone runs without deadline");
    }
    deadline
}

fn require_regular_file(target: &std::path::Path, path: &str) -> Result<()> {
    match probe::probe(target)? {
        Existence::Present => Ok(()),
        Existence::Absent => Err(Error::FileNotFound {
            path: path.to_string(),
        }),
        Existence::NotARegularFile => Err(Error::NotARegularFile {
            path: path.to_string(),
        }),
    }
}

/// Commit `edits` and push. An unchanged tree counts as converged.
fn commit_and_push(session: &mut Session, commit: &Commit, edits: &[FileEdit]) -> Attempt<()> {
    match session.client_mut().commit(commit, edits) {
        Ok(revision) => {
            tracing::debug!(revision = %revision, "Committed, pushing");
        }
        Err(gitfile_git::Error::NoChanges) => {
            tracing::debug!("Tree unchanged, skipping push");
            return Ok(());
        }
        Err(e) => return Err(e).permanent(),
    }

    session.client_mut().push().retryable()
}
