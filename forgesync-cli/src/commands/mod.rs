pub mod add;
pub mod bulk;
pub mod create;
pub mod init;
pub mod mirror;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use forgesync_core::config;
use forgesync_forge::UreqTransport;
use forgesync_sync::Orchestrator;

use crate::console::ConsoleSink;

pub(crate) fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

/// Loads the stored credentials and wires an orchestrator that talks HTTP
/// through `ureq` and prints progress to the terminal.
pub(crate) fn orchestrator() -> Result<Orchestrator> {
    let home = home_dir()?;
    let config = config::load_at(&home).context("failed to load configuration")?;
    tracing::debug!(
        primary = %config.primary.url,
        credentials = ?config.remote.credentials,
        "wiring orchestrator"
    );
    Ok(Orchestrator::new(config, Arc::new(UreqTransport::new()))
        .with_progress(Arc::new(ConsoleSink))
        .with_home(&home))
}
