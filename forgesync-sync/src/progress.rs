//! Human-readable progress, separate from `tracing` logs.
//!
//! The orchestrator reports each step as a [`ProgressEvent`]; the CLI prints
//! them, tests record them.

use std::sync::Mutex;

use crate::error::Stage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A batch moved on to the next repository.
    RepositoryStarted { repo: String },
    /// A step is about to run.
    Step { stage: Stage, message: String },
    /// A step finished (including "already there").
    Done { stage: Stage, message: String },
    /// A repository in a batch failed; the batch continues.
    Failed { repo: String, message: String },
    Info { message: String },
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Discards everything.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Keeps every event in order.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: ProgressEvent) {
        let mut events = self.events.lock().unwrap_or_else(|p| p.into_inner());
        events.push(event);
    }
}
