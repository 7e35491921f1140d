//! Error types for forgesync-forge.

use thiserror::Error;

/// Failures talking to a hosting provider's REST API.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// Network, DNS, TLS or timeout failure before a status line arrived.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The provider answered with a status outside the expected set.
    #[error("{provider} returned unexpected status {status} for {url}: {body}")]
    UnexpectedStatus {
        provider: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// Repository creation was not acknowledged with the provider's
    /// "created" status.
    #[error("{provider} did not create {repo} (status {status}): {body}")]
    CreateFailed {
        provider: &'static str,
        repo: String,
        status: u16,
        body: String,
    },

    /// The primary host rejected the push mirror and the body did not say
    /// the mirror was already there.
    #[error("push mirror registration for {repo} failed (status {status}): {body}")]
    MirrorRegistrationFailed {
        repo: String,
        status: u16,
        body: String,
    },
}

impl ForgeError {
    /// HTTP status carried by the error, if the provider responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ForgeError::Transport { .. } => None,
            ForgeError::UnexpectedStatus { status, .. }
            | ForgeError::CreateFailed { status, .. }
            | ForgeError::MirrorRegistrationFailed { status, .. } => Some(*status),
        }
    }
}
