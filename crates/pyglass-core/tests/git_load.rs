//! Loading a package out of a git revision through a scoped worktree.

use std::path::Path;
use std::process::Command;

use pyglass_core::{load_git, LoadOptions};
use tempfile::TempDir;

fn git(repo: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .env("GIT_AUTHOR_NAME", "test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[test]
fn test_load_git_reads_old_revision_and_cleans_up() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let repo = TempDir::new().unwrap();
    assert!(git(repo.path(), &["init", "-q"]));

    std::fs::create_dir_all(repo.path().join("pkg")).unwrap();
    std::fs::write(repo.path().join("pkg/__init__.py"), "def old(): ...\n").unwrap();
    assert!(git(repo.path(), &["add", "."]));
    assert!(git(repo.path(), &["commit", "-q", "-m", "old api"]));

    std::fs::write(repo.path().join("pkg/__init__.py"), "def new(): ...\n").unwrap();
    assert!(git(repo.path(), &["add", "."]));
    assert!(git(repo.path(), &["commit", "-q", "-m", "new api"]));

    let loader = load_git(
        "pkg",
        repo.path(),
        "HEAD~1",
        LoadOptions::default(),
    )
    .unwrap();
    let root = loader.root("pkg").unwrap();
    assert!(root.get_member("old").is_some());
    assert!(root.get_member("new").is_none());

    // The worktree was removed again.
    let worktrees = Command::new("git")
        .arg("-C")
        .arg(repo.path())
        .args(["worktree", "list"])
        .output()
        .unwrap();
    let listing = String::from_utf8_lossy(&worktrees.stdout);
    assert_eq!(listing.lines().count(), 1);
}
