//! Git collaborator: scoped worktree checkouts for loading a package at a
//! specific revision.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::debug;

use crate::error::GitError;

/// A detached worktree of one revision, removed again when dropped. The
/// backing temp directory guarantees cleanup on every exit path.
pub struct WorktreeCheckout {
    repo: PathBuf,
    path: PathBuf,
    _dir: TempDir,
}

impl std::fmt::Debug for WorktreeCheckout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorktreeCheckout")
            .field("repo", &self.repo)
            .field("path", &self.path)
            .finish()
    }
}

impl WorktreeCheckout {
    pub fn create(repo: &Path, rev: &str) -> Result<Self, GitError> {
        let dir = TempDir::new()?;
        let path = dir.path().join("worktree");
        let output = Command::new("git")
            .arg("-C")
            .arg(repo)
            .args(["worktree", "add", "--detach"])
            .arg(&path)
            .arg(rev)
            .output()
            .map_err(GitError::GitMissing)?;
        if !output.status.success() {
            return Err(GitError::Command {
                command: format!("worktree add {rev}"),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(Self {
            repo: repo.to_path_buf(),
            path,
            _dir: dir,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Search roots inside the checkout: its top level, plus `src/` when
    /// the repository uses a src layout.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.path.clone()];
        let src = self.path.join("src");
        if src.is_dir() {
            paths.push(src);
        }
        paths
    }
}

impl Drop for WorktreeCheckout {
    fn drop(&mut self) {
        let result = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .args(["worktree", "remove", "--force"])
            .arg(&self.path)
            .output();
        if let Err(error) = result {
            debug!(%error, "failed to remove git worktree");
        }
    }
}
