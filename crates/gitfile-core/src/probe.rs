//! Existence probe and working-tree path resolution

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// What sits at a path in the working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    Absent,
    Present,
    NotARegularFile,
}

/// Check `path` on disk.
pub fn probe(path: &Path) -> Result<Existence> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(Existence::Present),
        Ok(_) => Ok(Existence::NotARegularFile),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Existence::Absent),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Resolve a resource path against the working tree root.
///
/// The path must be relative, stay inside the tree and not point into `.git`.
pub fn workspace_path(root: &Path, path: &str) -> Result<PathBuf> {
    let invalid = |reason| Error::InvalidPath {
        path: path.to_string(),
        reason,
    };

    let mut resolved = root.to_path_buf();
    let mut depth = 0;

    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => {
                if depth == 0 && part == ".git" {
                    return Err(invalid("path points into the .git directory"));
                }
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => return Err(invalid("parent directory components are not allowed")),
            Component::RootDir | Component::Prefix(_) => return Err(invalid("path must be relative")),
        }
    }

    if depth == 0 {
        return Err(invalid("path is empty"));
    }

    Ok(resolved)
}

/// Validate a resource path without touching the filesystem.
pub fn check_path(path: &str) -> Result<()> {
    workspace_path(Path::new(""), path).map(drop)
}
