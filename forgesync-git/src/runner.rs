//! Blocking `git` child-process runner.

use std::path::Path;
use std::process::Command;

use forgesync_core::redact_url;

use crate::error::{io_err, GitError};

/// Runs `git -C <dir> <args>` and returns trimmed stdout.
///
/// Terminal prompts are disabled so a push that needs credentials fails
/// instead of hanging.
pub fn run_git(dir: &Path, args: &[&str]) -> Result<String, GitError> {
    tracing::trace!(dir = %dir.display(), args = %redact_args(args), "running git");

    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                tracing::warn!("git not found in PATH");
                GitError::GitNotInstalled
            } else {
                io_err(dir, e)
            }
        })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(GitError::CommandFailed {
            args: redact_args(args),
            stderr: scrub(&stderr),
        })
    }
}

/// Joined argument list with user-info removed from any URL argument.
fn redact_args(args: &[&str]) -> String {
    args.iter()
        .map(|a| redact_url(a))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strips user-info from URLs git echoes back in its diagnostics.
pub(crate) fn scrub(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let core = word.trim_matches(|c: char| c == '\'' || c == '"' || c.is_whitespace());
            if core.contains("://") && core.contains('@') {
                word.replace(core, &redact_url(core))
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
