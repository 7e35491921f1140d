//! Error types for forgesync-sync.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use forgesync_core::ConfigError;
use forgesync_forge::ForgeError;
use forgesync_git::GitError;
use forgesync_renderer::RenderError;

/// The step of a provisioning run that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    SecondaryProvisioning,
    PrimaryProvisioning,
    MirrorRegistration,
    LocalRemote,
    Seeding,
    Clone,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::SecondaryProvisioning => "secondary provisioning",
            Stage::PrimaryProvisioning => "primary provisioning",
            Stage::MirrorRegistration => "mirror registration",
            Stage::LocalRemote => "local remote reconciliation",
            Stage::Seeding => "seeding",
            Stage::Clone => "clone",
        })
    }
}

/// Lower-layer failure carried by [`SyncError::Stage`].
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Forge(#[from] ForgeError),
    #[error(transparent)]
    Git(#[from] GitError),
}

#[derive(Debug, Error)]
pub enum SyncError {
    /// A credential the selected operation needs is absent. Raised before
    /// any provider is contacted.
    #[error("precondition failed: {0}")]
    PreconditionMissing(#[source] ConfigError),

    #[error(transparent)]
    Config(ConfigError),

    /// Mirror requested for a repository the primary host does not have.
    #[error("repository {repo} does not exist on the primary host")]
    RepositoryNotFound { repo: String },

    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: StageError,
    },

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no repositories provided")]
    EmptyBatch,
}

impl SyncError {
    /// Wraps a gateway, registrar or git failure with the stage it hit.
    pub fn at(stage: Stage, source: impl Into<StageError>) -> Self {
        SyncError::Stage {
            stage,
            source: source.into(),
        }
    }

    /// The failing stage, when the error came from one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SyncError::Stage { stage, .. } => Some(*stage),
            SyncError::RepositoryNotFound { .. } => Some(Stage::PrimaryProvisioning),
            _ => None,
        }
    }
}

impl From<ConfigError> for SyncError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingCredentials { .. } => SyncError::PreconditionMissing(err),
            other => SyncError::Config(other),
        }
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
