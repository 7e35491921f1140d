//! forgesync-git: everything that shells out to `git`.
//!
//! - [`runner`]: blocking `git -C <dir>` invocation with redacted diagnostics
//! - [`access`]: credential-injection strategies for primary-host remotes
//! - [`reconcile`]: the Local Remote Reconciler
//! - [`seed`]: initial commit + clone for brand-new repositories
//! - `testing` (feature `test-support`): bare-repository fixtures for tests

pub mod access;
pub mod error;
pub mod reconcile;
pub mod runner;
pub mod seed;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use access::{remote_access, EmbeddedCredentials, HelperCredentials, RemoteAccess};
pub use error::GitError;
pub use reconcile::{
    ensure_working_copy, ReconcileOptions, ReconcileOutcome, Reconciler, RemoteState,
    FALLBACK_BRANCHES,
};
pub use runner::run_git;
pub use seed::{clone_repository, remote_branches, seed_repository, SeedFile};
