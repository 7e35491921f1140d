//! Mirror Registrar: asks the primary host to push a repository to a
//! destination on every commit and on a fixed interval.

use std::sync::Arc;

use forgesync_core::{format_interval, redact_url, MirrorSpec, PrimaryAccount, Secret};
use serde_json::{json, Value};

use crate::error::ForgeError;
use crate::transport::{HttpRequest, Transport};

/// Text the primary host puts in an error body when the same push mirror is
/// registered twice. The host has no upsert endpoint; this substring is the
/// only idempotency signal it gives.
pub const ALREADY_EXISTS_MARKER: &str = "already exists";

/// Whether a rejected registration actually means "already registered".
pub fn is_already_registered(body: &str) -> bool {
    body.contains(ALREADY_EXISTS_MARKER)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    Registered,
    AlreadyRegistered,
}

pub struct MirrorRegistrar {
    base_url: String,
    token: Secret,
    transport: Arc<dyn Transport>,
}

impl MirrorRegistrar {
    pub fn new(account: &PrimaryAccount, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: account.url.trim_end_matches('/').to_string(),
            token: account.token.clone(),
            transport,
        }
    }

    pub fn endpoint(&self, owner: &str, repo: &str) -> String {
        format!(
            "{}/api/v1/repos/{}/{}/push_mirrors",
            self.base_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        )
    }

    pub fn request_body(spec: &MirrorSpec) -> Value {
        json!({
            "remote_address": spec.destination_url,
            "remote_username": spec.credential.username,
            "remote_password": spec.credential.secret.expose(),
            "sync_on_commit": spec.sync_on_commit,
            "interval": format_interval(spec.interval),
        })
    }

    /// Registers `spec` on the primary host. 200 and 201 are success; any
    /// other status is success only when the body carries
    /// [`ALREADY_EXISTS_MARKER`].
    pub fn register_push_mirror(&self, spec: &MirrorSpec) -> Result<MirrorOutcome, ForgeError> {
        let source = &spec.source;
        let request = HttpRequest::post(
            self.endpoint(&source.owner, &source.name),
            Self::request_body(spec),
        )
        .header("Authorization", format!("token {}", self.token.expose()));

        let response = self.transport.send(&request)?;
        let destination = redact_url(&spec.destination_url);
        match response.status {
            200 | 201 => {
                tracing::info!(repo = %source, destination = %destination, "push mirror registered");
                Ok(MirrorOutcome::Registered)
            }
            status if is_already_registered(&response.body) => {
                tracing::info!(
                    repo = %source,
                    destination = %destination,
                    status,
                    "push mirror already registered; treating as success"
                );
                Ok(MirrorOutcome::AlreadyRegistered)
            }
            status => Err(ForgeError::MirrorRegistrationFailed {
                repo: source.to_string(),
                status,
                body: response.body,
            }),
        }
    }
}
