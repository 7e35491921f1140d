//! forgesync core library: domain types, credential config store, errors.
//!
//! - [`types`]: repository identity, visibility, platform, mirror spec
//! - [`config`]: the YAML credential set at `~/.forgesync/config.yaml`
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    Config, CredentialMode, GitHubConfig, GitLabConfig, PrimaryAccount, PrimaryConfig,
    RemoteConfig, SecondaryAccount,
};
pub use error::ConfigError;
pub use types::{
    format_interval, redact_url, DestinationCredential, MirrorSpec, Platform,
    ProvisioningRequest, RepositoryIdentity, Secret, Visibility, DEFAULT_MIRROR_INTERVAL,
};
