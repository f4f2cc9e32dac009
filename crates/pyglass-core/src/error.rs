use std::path::PathBuf;
use thiserror::Error;

/// Errors surfacing from package discovery and loading.
///
/// A failing submodule is logged and omitted; these become fatal only when
/// the requested package itself cannot be analyzed at all.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("module {name} not found in search paths {searched:?}")]
    ModuleNotFound { name: String, searched: Vec<PathBuf> },

    #[error("unhandled editable module format in {path} ({reason})")]
    UnhandledEditableModule { path: PathBuf, reason: String },

    #[error("cannot analyze compiled module {name} without an inspector")]
    InspectorRequired { name: String },

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Errors from the git worktree collaborator.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("git executable not found")]
    GitMissing(#[source] std::io::Error),

    #[error("git {command} failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
