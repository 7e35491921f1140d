//! # forgesync-sync
//!
//! The orchestrator. [`Orchestrator`] provisions a repository on the
//! secondary platform and the primary host, registers the push mirror
//! between them and reconciles the local working copy; [`Orchestrator::provision_batch`]
//! back-fills the primary host and mirror for many names at once.

pub mod error;
pub mod pipeline;
pub mod progress;

pub use error::{Stage, StageError, SyncError};
pub use pipeline::{
    BatchEntry, BatchReport, Orchestrator, ProvisionReport, Provisioned, RepositoryUrl,
    SEED_BRANCH,
};
pub use progress::{NullSink, ProgressEvent, ProgressSink, RecordingSink};
