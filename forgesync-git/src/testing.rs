//! Fixtures for tests that drive real `git` against local bare repositories.
//! Compiled for this crate's tests and, with the `test-support` feature, for
//! other crates' tests.

use std::path::{Path, PathBuf};
use std::sync::Once;

use crate::runner::run_git;

/// Returns from the enclosing test when `$name --version` cannot be run.
#[macro_export]
macro_rules! require_program {
    ($name:expr) => {{
        let exists = ::std::process::Command::new($name)
            .arg("--version")
            .stdout(::std::process::Stdio::null())
            .stderr(::std::process::Stdio::null())
            .status()
            .is_ok();
        if !exists {
            eprintln!("Couldn't find \"{}\"", $name);
            return;
        }
    }};
}

static IDENTITY: Once = Once::new();

/// Author and committer for test commits, so runs don't depend on the
/// machine's global git config.
pub fn commit_identity() {
    IDENTITY.call_once(|| {
        std::env::set_var("GIT_AUTHOR_NAME", "forgesync");
        std::env::set_var("GIT_AUTHOR_EMAIL", "forgesync@example.invalid");
        std::env::set_var("GIT_COMMITTER_NAME", "forgesync");
        std::env::set_var("GIT_COMMITTER_EMAIL", "forgesync@example.invalid");
    });
}

/// Empty bare repository at `<host>/me/<repo>.git` with HEAD on `main`,
/// the way a fresh repository on the primary host is served.
pub fn bare_repo(host: &Path, repo: &str) -> PathBuf {
    let path = host.join("me").join(format!("{repo}.git"));
    std::fs::create_dir_all(&path).expect("create bare repo dir");
    run_git(&path, &["init", "--bare", "--quiet"]).expect("git init --bare");
    // Independent of the machine's init.defaultBranch.
    run_git(&path, &["symbolic-ref", "HEAD", "refs/heads/main"]).expect("set bare HEAD");
    path
}

/// Working copy at `dir` with one commit of `file` on `branch`.
pub fn working_copy(dir: &Path, branch: &str, file: &str) {
    commit_identity();
    run_git(dir, &["init", "--quiet"]).expect("git init");
    let head = format!("refs/heads/{branch}");
    run_git(dir, &["symbolic-ref", "HEAD", &head]).expect("set HEAD");
    std::fs::write(dir.join(file), "hello\n").expect("write file");
    run_git(dir, &["add", "."]).expect("git add");
    run_git(dir, &["commit", "--quiet", "-m", "first"]).expect("git commit");
}

/// Whether the bare repository at `bare` has `refs/heads/<branch>`.
pub fn has_branch(bare: &Path, branch: &str) -> bool {
    let name = format!("refs/heads/{branch}");
    run_git(bare, &["rev-parse", "--verify", "--quiet", &name]).is_ok()
}
