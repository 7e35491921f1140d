//! forgesync-forge: hosting-provider REST clients.
//!
//! - [`provider`]: table-driven Provider Gateway (Gitea, GitHub, GitLab)
//! - [`mirror`]: push-mirror registration on the primary host
//! - [`transport`]: the blocking HTTP seam and its `ureq` implementation
//! - `testing` (feature `test-support`): scripted in-memory transport

pub mod error;
pub mod mirror;
pub mod provider;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::ForgeError;
pub use mirror::{is_already_registered, MirrorOutcome, MirrorRegistrar, ALREADY_EXISTS_MARKER};
pub use provider::{CreateSpec, ProviderGateway, ProviderProfile, RepositoryGateway};
pub use transport::{HttpRequest, HttpResponse, Method, Transport, UreqTransport};
