//! Error types for forgesync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading, saving, or reading the config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, disk full, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// No config file has been written yet.
    #[error("config not found at {path}; run `forgesync init` to create it")]
    ConfigNotFound { path: PathBuf },

    /// A field the selected operation needs is blank or absent.
    #[error("missing `{section}.{field}` in config; run `forgesync init` to configure {section}")]
    MissingCredentials {
        section: &'static str,
        field: &'static str,
    },
}
