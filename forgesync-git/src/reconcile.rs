//! Local Remote Reconciler.
//!
//! Converges a working copy toward "the primary host is reachable under a
//! known remote name and the current branch is pushed and tracked":
//!
//! | State             | Action                                                     |
//! |-------------------|------------------------------------------------------------|
//! | `NoOrigin`        | add `origin`, push current branch with `-u`                 |
//! | `OriginIsPrimary` | `set-url origin` (token may have rotated), push current branch |
//! | `OriginIsOther`   | leave `origin`, replace the alternate remote, push `main` then `master` |

use std::fmt;
use std::path::Path;

use forgesync_core::{redact_url, RemoteConfig, RepositoryIdentity};

use crate::access::RemoteAccess;
use crate::error::GitError;
use crate::runner::run_git;

/// Branches tried, in order, when pushing to the alternate remote. The
/// current branch is deliberately not consulted in that state.
pub const FALLBACK_BRANCHES: [&str; 2] = ["main", "master"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteState {
    NoOrigin,
    OriginIsPrimary,
    /// `origin` exists and points elsewhere. The URL is stored redacted.
    OriginIsOther { url: String },
}

impl fmt::Display for RemoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteState::NoOrigin => f.write_str("no origin"),
            RemoteState::OriginIsPrimary => f.write_str("origin is primary"),
            RemoteState::OriginIsOther { url } => write!(f, "origin points at {url}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Remote name used when `origin` belongs to someone else.
    pub alternate_name: String,
    /// Branch pushed when HEAD is detached.
    pub default_branch: String,
}

impl From<&RemoteConfig> for ReconcileOptions {
    fn from(remote: &RemoteConfig) -> Self {
        Self {
            alternate_name: remote.alternate_name.clone(),
            default_branch: remote.default_branch.clone(),
        }
    }
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self::from(&RemoteConfig::default())
    }
}

/// What reconciliation did: the state it found, and the remote + branch it
/// pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub state: RemoteState,
    pub remote: String,
    pub branch: String,
}

/// Fails with `NotAGitWorkingCopy` unless `path/.git` exists (directory, or
/// file for linked worktrees).
pub fn ensure_working_copy(path: &Path) -> Result<(), GitError> {
    if path.join(".git").exists() {
        Ok(())
    } else {
        Err(GitError::NotAGitWorkingCopy {
            path: path.to_path_buf(),
        })
    }
}

pub struct Reconciler<'a> {
    access: &'a dyn RemoteAccess,
    options: ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(access: &'a dyn RemoteAccess, options: ReconcileOptions) -> Self {
        Self { access, options }
    }

    /// Classifies the working copy's `origin`. Absence of `origin` is a
    /// state, not an error.
    pub fn inspect(&self, path: &Path) -> Result<RemoteState, GitError> {
        ensure_working_copy(path)?;
        if !has_remote(path, "origin")? {
            return Ok(RemoteState::NoOrigin);
        }
        let url = run_git(path, &["remote", "get-url", "origin"])?;
        if self.access.points_at_primary(&url) {
            Ok(RemoteState::OriginIsPrimary)
        } else {
            Ok(RemoteState::OriginIsOther {
                url: redact_url(&url),
            })
        }
    }

    pub fn reconcile(
        &self,
        path: &Path,
        repo: &RepositoryIdentity,
    ) -> Result<ReconcileOutcome, GitError> {
        let state = self.inspect(path)?;
        let remote_url = self.access.remote_url(repo);
        tracing::debug!(path = %path.display(), repo = %repo, state = %state, "reconciling remotes");

        match state {
            RemoteState::NoOrigin => {
                run_git(path, &["remote", "add", "origin", &remote_url])?;
                let branch = self.current_branch(path)?;
                push(path, "origin", &branch)?;
                Ok(ReconcileOutcome {
                    state,
                    remote: "origin".into(),
                    branch,
                })
            }
            RemoteState::OriginIsPrimary => {
                run_git(path, &["remote", "set-url", "origin", &remote_url])?;
                let branch = self.current_branch(path)?;
                push(path, "origin", &branch)?;
                Ok(ReconcileOutcome {
                    state,
                    remote: "origin".into(),
                    branch,
                })
            }
            RemoteState::OriginIsOther { .. } => {
                let alternate = self.options.alternate_name.as_str();
                if has_remote(path, alternate)? {
                    run_git(path, &["remote", "remove", alternate])?;
                }
                run_git(path, &["remote", "add", alternate, &remote_url])?;
                let branch = push_first_accepted(path, alternate, &FALLBACK_BRANCHES)?;
                Ok(ReconcileOutcome {
                    state,
                    remote: alternate.to_string(),
                    branch,
                })
            }
        }
    }

    /// `git branch --show-current`, or the configured default when detached.
    pub fn current_branch(&self, path: &Path) -> Result<String, GitError> {
        let branch = run_git(path, &["branch", "--show-current"])?;
        if branch.is_empty() {
            Ok(self.options.default_branch.clone())
        } else {
            Ok(branch)
        }
    }
}

fn has_remote(path: &Path, name: &str) -> Result<bool, GitError> {
    let remotes = run_git(path, &["remote"])?;
    Ok(remotes.lines().any(|line| line.trim() == name))
}

/// `git push -u <remote> <branch>`; a rejected push becomes `PushFailed`.
pub(crate) fn push(path: &Path, remote: &str, branch: &str) -> Result<(), GitError> {
    match run_git(path, &["push", "-u", remote, branch]) {
        Ok(_) => {
            tracing::info!(remote, branch, "pushed");
            Ok(())
        }
        Err(GitError::CommandFailed { stderr, .. }) => Err(GitError::PushFailed {
            remote: remote.to_string(),
            attempted: branch.to_string(),
            stderr,
        }),
        Err(other) => Err(other),
    }
}

/// Tries each branch in order and returns the first one the remote accepted.
fn push_first_accepted(path: &Path, remote: &str, branches: &[&str]) -> Result<String, GitError> {
    let mut last_stderr = String::new();
    for branch in branches {
        match push(path, remote, branch) {
            Ok(()) => return Ok(branch.to_string()),
            Err(GitError::PushFailed { stderr, .. }) => {
                tracing::debug!(remote, branch, "push rejected, trying next branch");
                last_stderr = stderr;
            }
            Err(other) => return Err(other),
        }
    }
    Err(GitError::PushFailed {
        remote: remote.to_string(),
        attempted: branches.join(", "),
        stderr: last_stderr,
    })
}
