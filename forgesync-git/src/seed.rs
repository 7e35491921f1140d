//! Initial commit for a brand-new repository, and the clone that follows.

use std::path::{Path, PathBuf};

use crate::error::{io_err, GitError};
use crate::reconcile::push;
use crate::runner::run_git;

/// One file of the initial commit, relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl SeedFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Turns `dir` into a repository on `branch` holding `files` in a single
/// `init` commit, adds `origin` at `remote_url` and pushes with `-u`.
pub fn seed_repository(
    dir: &Path,
    files: &[SeedFile],
    remote_url: &str,
    branch: &str,
) -> Result<(), GitError> {
    run_git(dir, &["init", "--quiet"])?;
    let head = format!("refs/heads/{branch}");
    run_git(dir, &["symbolic-ref", "HEAD", &head])?;

    for file in files {
        let target = dir.join(&file.path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        std::fs::write(&target, &file.contents).map_err(|e| io_err(&target, e))?;
    }

    run_git(dir, &["add", "."])?;
    run_git(dir, &["commit", "--quiet", "-m", "init"])?;
    run_git(dir, &["remote", "add", "origin", remote_url])?;
    push(dir, "origin", branch)?;
    tracing::info!(dir = %dir.display(), branch, files = files.len(), "seeded repository");
    Ok(())
}

/// Branch names `url` advertises, via `git ls-remote --heads`. Empty for a
/// repository nothing has been pushed to yet. `dir` is only the working
/// directory for the command.
pub fn remote_branches(dir: &Path, url: &str) -> Result<Vec<String>, GitError> {
    let out = run_git(dir, &["ls-remote", "--heads", url])?;
    Ok(out
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|r| r.strip_prefix("refs/heads/"))
        .map(str::to_string)
        .collect())
}

/// `git clone <url> <target>`, checking out `branch` when given and the
/// remote's HEAD otherwise. Refuses to touch an existing `target`.
pub fn clone_repository(
    url: &str,
    target: &Path,
    branch: Option<&str>,
) -> Result<(), GitError> {
    if target.exists() {
        return Err(GitError::TargetExists {
            path: target.to_path_buf(),
        });
    }
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| target.to_string_lossy().into_owned());

    let mut args = vec!["clone", "--quiet"];
    if let Some(branch) = branch {
        args.extend(["--branch", branch]);
    }
    args.extend([url, name.as_str()]);
    run_git(&parent, &args)?;
    tracing::info!(
        target = %target.display(),
        branch = branch.unwrap_or("HEAD"),
        "cloned repository"
    );
    Ok(())
}
