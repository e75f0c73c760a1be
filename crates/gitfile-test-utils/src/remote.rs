//! [`BareRemote`] fixture.
//!
//! A bare repository in a temporary directory, seeded with one commit on
//! `main`. Sessions clone it over the local transport, and tests use the
//! helpers below to inspect what was pushed or to simulate commits made by
//! somebody else.

use std::path::Path;

use git2::build::TreeUpdateBuilder;
use git2::{FileMode, Repository};
use tempfile::TempDir;

/// A bare git repository acting as the remote.
pub struct BareRemote {
    dir: TempDir,
}

impl Default for BareRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl BareRemote {
    /// Create a bare repository whose `main` branch holds `README.md`.
    ///
    /// # Panics
    /// Panics if any git operation fails.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init_bare(dir.path())
            .unwrap_or_else(|e| panic!("BareRemote::new: failed to init bare repo: {e}"));
        repo.set_head("refs/heads/main").unwrap();

        let blob = repo.blob(b"# Fixture\n").unwrap();
        let mut builder = repo.treebuilder(None).unwrap();
        builder.insert("README.md", blob, FileMode::Blob.into()).unwrap();
        let tree = repo.find_tree(builder.write().unwrap()).unwrap();

        let sig = signature();
        repo.commit(Some("refs/heads/main"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();

        Self { dir }
    }

    /// Filesystem path of the bare repository.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Clone URL (a local path).
    pub fn url(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    fn repo(&self) -> Repository {
        Repository::open_bare(self.dir.path()).unwrap()
    }

    /// Create `name` pointing at the tip of `from`.
    pub fn create_branch(&self, name: &str, from: &str) {
        let repo = self.repo();
        let commit = repo
            .find_reference(&format!("refs/heads/{from}"))
            .unwrap()
            .peel_to_commit()
            .unwrap();
        repo.branch(name, &commit, false).unwrap();
    }

    /// Commit `content` at `path` on `branch` directly in the remote.
    pub fn write_file(&self, branch: &str, path: &str, content: &str) {
        self.write_bytes(branch, path, content.as_bytes());
    }

    /// Commit raw `content` at `path` on `branch`, e.g. non-UTF-8 data.
    pub fn write_bytes(&self, branch: &str, path: &str, content: &[u8]) {
        self.commit_change(branch, &format!("fixture: write {path}"), |repo, update| {
            let blob = repo.blob(content).unwrap();
            update.upsert(path, blob, FileMode::Blob);
        });
    }

    /// Commit the removal of `path` on `branch` directly in the remote.
    pub fn remove_file(&self, branch: &str, path: &str) {
        self.commit_change(branch, &format!("fixture: remove {path}"), |_, update| {
            update.remove(path);
        });
    }

    /// Content of `path` at the tip of `branch`, if it is a file.
    pub fn read_file(&self, branch: &str, path: &str) -> Option<String> {
        let repo = self.repo();
        let tree = repo
            .find_reference(&format!("refs/heads/{branch}"))
            .ok()?
            .peel_to_tree()
            .ok()?;
        let entry = tree.get_path(Path::new(path)).ok()?;
        let blob = entry.to_object(&repo).ok()?.peel_to_blob().ok()?;
        Some(String::from_utf8_lossy(blob.content()).into_owned())
    }

    /// `(author name, author email, message)` of the tip of `branch`.
    pub fn head_commit(&self, branch: &str) -> (String, String, String) {
        let repo = self.repo();
        let commit = repo
            .find_reference(&format!("refs/heads/{branch}"))
            .unwrap()
            .peel_to_commit()
            .unwrap();
        let author = commit.author();
        (
            author.name().unwrap_or_default().to_string(),
            author.email().unwrap_or_default().to_string(),
            commit.message().unwrap_or_default().to_string(),
        )
    }

    /// Number of commits reachable from `branch`.
    pub fn commit_count(&self, branch: &str) -> usize {
        let repo = self.repo();
        let oid = repo
            .find_reference(&format!("refs/heads/{branch}"))
            .unwrap()
            .target()
            .unwrap();
        let mut walk = repo.revwalk().unwrap();
        walk.push(oid).unwrap();
        walk.count()
    }

    fn commit_change(
        &self,
        branch: &str,
        message: &str,
        change: impl FnOnce(&Repository, &mut TreeUpdateBuilder),
    ) {
        let repo = self.repo();
        let refname = format!("refs/heads/{branch}");
        let parent = repo
            .find_reference(&refname)
            .unwrap_or_else(|e| panic!("BareRemote: branch {branch} not found: {e}"))
            .peel_to_commit()
            .unwrap();

        let mut update = TreeUpdateBuilder::new();
        change(&repo, &mut update);
        let tree_id = update.create_updated(&repo, &parent.tree().unwrap()).unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let sig = signature();
        repo.commit(Some(&refname), &sig, &sig, message, &tree, &[&parent])
            .unwrap();
    }
}

fn signature() -> git2::Signature<'static> {
    git2::Signature::now("Fixture", "fixture@example.com").unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_remote_has_readme_on_main() {
        let remote = BareRemote::new();
        assert_eq!(remote.read_file("main", "README.md").as_deref(), Some("# Fixture\n"));
        assert_eq!(remote.commit_count("main"), 1);
    }

    #[test]
    fn test_write_and_remove_nested_file() {
        let remote = BareRemote::new();
        remote.write_file("main", "docs/guide/intro.md", "intro");
        assert_eq!(remote.read_file("main", "docs/guide/intro.md").as_deref(), Some("intro"));

        remote.remove_file("main", "docs/guide/intro.md");
        assert_eq!(remote.read_file("main", "docs/guide/intro.md"), None);
        assert_eq!(remote.commit_count("main"), 3);
    }

    #[test]
    fn test_branches_are_independent() {
        let remote = BareRemote::new();
        remote.create_branch("dev", "main");
        remote.write_file("dev", "only-dev.txt", "x");

        assert!(remote.read_file("dev", "only-dev.txt").is_some());
        assert!(remote.read_file("main", "only-dev.txt").is_none());
    }
}
