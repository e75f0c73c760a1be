//! Repository client used inside a session
//!
//! The reconciler only needs three things from git: where the working tree
//! lives, how to record a commit, and how to publish it.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use git2::build::RepoBuilder;
use git2::{
    CertificateCheckStatus, Cred, FetchOptions, IndexAddOption, PushOptions, RemoteCallbacks,
    Repository,
};

use crate::auth::Credentials;
use crate::{Error, Result};

/// libgit2 re-invokes the credential callback after every rejection.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Commit author identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
}

/// Commit metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub message: String,
    pub author: Signature,
}

/// A change applied to the working tree before committing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEdit {
    /// Create or overwrite `path` (relative to the working tree)
    Write { path: String, content: String },

    /// Remove `path` if present
    Remove { path: String },
}

impl FileEdit {
    pub fn write(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Write {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self::Remove { path: path.into() }
    }
}

/// Operations available on a cloned repository.
pub trait GitClient: Send {
    /// Root of the working tree
    fn path(&self) -> &Path;

    /// Branch checked out by the clone
    fn branch(&self) -> &str;

    /// Apply `edits`, stage every working tree change and commit on the
    /// checked out branch.
    ///
    /// Returns the new revision, or [`Error::NoChanges`] when the resulting
    /// tree is identical to the current one.
    fn commit(&mut self, commit: &Commit, edits: &[FileEdit]) -> Result<String>;

    /// Push the checked out branch to `origin`.
    fn push(&mut self) -> Result<()>;
}

/// [`GitClient`] backed by libgit2 with on-disk storage.
pub struct Git2Client {
    repo: Repository,
    workdir: PathBuf,
    branch: String,
    credentials: Option<Credentials>,
}

impl Git2Client {
    /// Clone `url` at `branch` into `dir`, which must be empty.
    ///
    /// The transfer is abandoned once `deadline` has passed.
    pub fn clone_into(
        dir: &Path,
        url: &str,
        branch: &str,
        credentials: Option<Credentials>,
        deadline: Option<Instant>,
    ) -> Result<Self> {
        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(remote_callbacks(credentials.as_ref(), deadline));

        let repo = RepoBuilder::new()
            .branch(branch)
            .fetch_options(fetch)
            .clone(url, dir)
            .map_err(|e| {
                let message = if deadline.is_some_and(|d| Instant::now() >= d) {
                    format!("deadline exceeded ({})", e.message())
                } else {
                    e.message().to_string()
                };
                Error::CloneFailed {
                    url: url.to_string(),
                    branch: branch.to_string(),
                    message,
                }
            })?;

        Ok(Self {
            repo,
            workdir: dir.to_path_buf(),
            branch: branch.to_string(),
            credentials,
        })
    }

    fn apply(&self, edit: &FileEdit) -> Result<()> {
        match edit {
            FileEdit::Write { path, content } => {
                let target = self.workdir.join(path);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
                }
                fs::write(&target, content).map_err(|e| Error::io(&target, e))
            }
            FileEdit::Remove { path } => {
                let target = self.workdir.join(path);
                match fs::remove_file(&target) {
                    Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(Error::io(&target, e)),
                    _ => Ok(()),
                }
            }
        }
    }
}

impl GitClient for Git2Client {
    fn path(&self) -> &Path {
        &self.workdir
    }

    fn branch(&self) -> &str {
        &self.branch
    }

    fn commit(&mut self, commit: &Commit, edits: &[FileEdit]) -> Result<String> {
        for edit in edits {
            self.apply(edit)?;
        }

        let mut index = self.repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        // add_all honours .gitignore; written files must be staged regardless.
        for edit in edits {
            if let FileEdit::Write { path, .. } = edit {
                index.add_path(&index_path(path))?;
            }
        }
        index.write()?;
        let tree_id = index.write_tree()?;

        let parent = self.repo.head()?.peel_to_commit()?;
        if parent.tree_id() == tree_id {
            return Err(Error::NoChanges);
        }

        let tree = self.repo.find_tree(tree_id)?;
        let signature = git2::Signature::now(&commit.author.name, &commit.author.email)?;
        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &commit.message,
            &tree,
            &[&parent],
        )?;

        tracing::debug!(revision = %oid, branch = %self.branch, "Created commit");
        Ok(oid.to_string())
    }

    fn push(&mut self) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote("origin")
            .map_err(|_| Error::RemoteNotFound {
                name: "origin".to_string(),
            })?;

        let refspec = format!("refs/heads/{0}:refs/heads/{0}", self.branch);

        // A rejected ref update does not fail `push` itself.
        let mut rejected: Option<String> = None;
        {
            let mut callbacks = remote_callbacks(self.credentials.as_ref(), None);
            callbacks.push_update_reference(|reference, status| {
                if let Some(status) = status {
                    rejected = Some(format!("{reference} rejected by remote: {status}"));
                }
                Ok(())
            });

            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);

            remote
                .push(&[refspec.as_str()], Some(&mut options))
                .map_err(|e| Error::PushFailed {
                    message: e.message().to_string(),
                })?;
        }

        match rejected {
            Some(message) => Err(Error::PushFailed { message }),
            None => Ok(()),
        }
    }
}

/// Working-tree relative path as the index expects it, without `.` parts.
fn index_path(path: &str) -> PathBuf {
    Path::new(path)
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

fn remote_callbacks<'a>(
    credentials: Option<&'a Credentials>,
    deadline: Option<Instant>,
) -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();

    let mut attempts = 0;
    callbacks.credentials(move |_url, _username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str(
                "authentication failed: credentials were rejected",
            ));
        }

        match credentials {
            Some(Credentials::Ssh(ssh)) if allowed.is_ssh_key() => Cred::ssh_key_from_memory(
                &ssh.username,
                None,
                &ssh.private_key,
                ssh.password.as_deref(),
            ),
            Some(Credentials::Ssh(ssh)) if allowed.is_username() => Cred::username(&ssh.username),
            Some(Credentials::Http(http)) if allowed.is_user_pass_plaintext() => {
                Cred::userpass_plaintext(&http.username, &http.password)
            }
            _ => Cred::default(),
        }
    });

    callbacks.certificate_check(move |cert, host| match credentials {
        Some(Credentials::Ssh(ssh)) => match cert.as_hostkey().and_then(|key| key.hostkey()) {
            Some(key) if ssh.known_hosts.contains_key(key) => Ok(CertificateCheckStatus::CertificateOk),
            Some(_) => Err(git2::Error::from_str(&format!(
                "host key presented by {host} does not match the scanned known hosts"
            ))),
            None => Ok(CertificateCheckStatus::CertificatePassthrough),
        },
        _ => Ok(CertificateCheckStatus::CertificatePassthrough),
    });

    callbacks.transfer_progress(move |_| deadline.is_none_or(|d| Instant::now() < d));

    callbacks
}
