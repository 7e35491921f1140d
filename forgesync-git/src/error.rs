//! Error types for forgesync-git.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("git executable not found in PATH")]
    GitNotInstalled,

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `args` and `stderr` have credentials stripped from any URL.
    #[error("`git {args}` failed: {stderr}")]
    CommandFailed { args: String, stderr: String },

    #[error("{path} is not a git working copy (no .git entry)")]
    NotAGitWorkingCopy { path: PathBuf },

    /// Every branch attempted for `remote` was rejected.
    #[error("push to remote `{remote}` failed (tried {attempted}): {stderr}")]
    PushFailed {
        remote: String,
        attempted: String,
        stderr: String,
    },

    #[error("target directory {path} already exists")]
    TargetExists { path: PathBuf },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> GitError {
    GitError::Io {
        path: path.into(),
        source,
    }
}
