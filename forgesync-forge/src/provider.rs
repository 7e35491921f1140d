//! Provider Gateway: "does it exist" and "create it" for one hosting provider.
//!
//! The three supported providers differ only in endpoint templates, the auth
//! header and the JSON field that carries visibility. Those differences live
//! in a [`ProviderProfile`] table; a single [`ProviderGateway`] drives all of
//! them.

use std::sync::Arc;

use forgesync_core::{Platform, PrimaryAccount, SecondaryAccount, Secret, Visibility};
use serde_json::{json, Map, Value};

use crate::error::ForgeError;
use crate::transport::{HttpRequest, Transport};

// ---------------------------------------------------------------------------
// 1. Profile table
// ---------------------------------------------------------------------------

/// How a single repository is addressed in the lookup endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// `{base}{prefix}/repos/{owner}/{repo}`
    OwnerAndName,
    /// `{base}{prefix}/projects/{urlencode(owner/repo)}`
    EncodedProjectPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: token <t>`
    AuthorizationToken,
    /// `PRIVATE-TOKEN: <t>`
    PrivateToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityField {
    /// `"private": true|false`
    PrivateFlag,
    /// `"visibility": "private"|"public"`
    Level,
}

/// Everything that distinguishes one provider's REST surface from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderProfile {
    pub name: &'static str,
    pub api_prefix: &'static str,
    pub lookup: Lookup,
    pub create_path: &'static str,
    pub auth: AuthScheme,
    pub accept: Option<&'static str>,
    pub visibility: VisibilityField,
    /// Field that asks the provider to skip creating an initial commit.
    pub auto_init_field: &'static str,
}

pub const GITEA: ProviderProfile = ProviderProfile {
    name: "Gitea",
    api_prefix: "/api/v1",
    lookup: Lookup::OwnerAndName,
    create_path: "/user/repos",
    auth: AuthScheme::AuthorizationToken,
    accept: None,
    visibility: VisibilityField::PrivateFlag,
    auto_init_field: "auto_init",
};

pub const GITHUB: ProviderProfile = ProviderProfile {
    name: "GitHub",
    api_prefix: "",
    lookup: Lookup::OwnerAndName,
    create_path: "/user/repos",
    auth: AuthScheme::AuthorizationToken,
    accept: Some("application/vnd.github+json"),
    visibility: VisibilityField::PrivateFlag,
    auto_init_field: "auto_init",
};

pub const GITLAB: ProviderProfile = ProviderProfile {
    name: "GitLab",
    api_prefix: "/api/v4",
    lookup: Lookup::EncodedProjectPath,
    create_path: "/projects",
    auth: AuthScheme::PrivateToken,
    accept: None,
    visibility: VisibilityField::Level,
    auto_init_field: "initialize_with_readme",
};

impl ProviderProfile {
    /// Profile for the secondary platform the user selected.
    pub fn for_platform(platform: Platform) -> &'static ProviderProfile {
        match platform {
            Platform::GitHub => &GITHUB,
            Platform::GitLab => &GITLAB,
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Gateway contract
// ---------------------------------------------------------------------------

/// What to create. Content is always pushed by the caller afterwards, so the
/// provider is never asked to initialise the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSpec {
    pub name: String,
    pub visibility: Visibility,
}

impl CreateSpec {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
        }
    }
}

/// The uniform two-call contract the orchestrator drives for every provider.
pub trait RepositoryGateway {
    /// Human-readable provider name for progress and errors.
    fn provider(&self) -> &'static str;

    /// `true` on 200, `false` on 404, error on anything else.
    fn exists(&self, owner: &str, repo: &str) -> Result<bool, ForgeError>;

    /// Succeeds only on 201.
    fn create(&self, spec: &CreateSpec) -> Result<(), ForgeError>;
}

// ---------------------------------------------------------------------------
// 3. Table-driven implementation
// ---------------------------------------------------------------------------

pub struct ProviderGateway {
    profile: &'static ProviderProfile,
    base_url: String,
    token: Secret,
    transport: Arc<dyn Transport>,
}

impl ProviderGateway {
    pub fn new(
        profile: &'static ProviderProfile,
        base_url: &str,
        token: Secret,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            profile,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            transport,
        }
    }

    /// Gateway for the primary (Gitea-compatible) host.
    pub fn primary(account: &PrimaryAccount, transport: Arc<dyn Transport>) -> Self {
        Self::new(&GITEA, &account.url, account.token.clone(), transport)
    }

    /// Gateway for the selected secondary platform.
    pub fn secondary(account: &SecondaryAccount, transport: Arc<dyn Transport>) -> Self {
        Self::new(
            ProviderProfile::for_platform(account.platform),
            &account.api_url,
            account.token.clone(),
            transport,
        )
    }

    pub fn profile(&self) -> &'static ProviderProfile {
        self.profile
    }

    pub fn lookup_url(&self, owner: &str, repo: &str) -> String {
        let api = format!("{}{}", self.base_url, self.profile.api_prefix);
        match self.profile.lookup {
            Lookup::OwnerAndName => format!(
                "{api}/repos/{}/{}",
                urlencoding::encode(owner),
                urlencoding::encode(repo)
            ),
            Lookup::EncodedProjectPath => {
                format!("{api}/projects/{}", urlencoding::encode(&format!("{owner}/{repo}")))
            }
        }
    }

    pub fn create_url(&self) -> String {
        format!(
            "{}{}{}",
            self.base_url, self.profile.api_prefix, self.profile.create_path
        )
    }

    /// JSON body for the create call.
    pub fn create_body(&self, spec: &CreateSpec) -> Value {
        let mut body = Map::new();
        body.insert("name".into(), json!(spec.name));
        match self.profile.visibility {
            VisibilityField::PrivateFlag => {
                body.insert("private".into(), json!(spec.visibility.is_private()));
            }
            VisibilityField::Level => {
                body.insert("visibility".into(), json!(spec.visibility.as_str()));
            }
        }
        body.insert(self.profile.auto_init_field.into(), json!(false));
        Value::Object(body)
    }

    fn authorize(&self, mut request: HttpRequest) -> HttpRequest {
        request = match self.profile.auth {
            AuthScheme::AuthorizationToken => request.header(
                "Authorization",
                format!("token {}", self.token.expose()),
            ),
            AuthScheme::PrivateToken => request.header("PRIVATE-TOKEN", self.token.expose()),
        };
        if let Some(accept) = self.profile.accept {
            request = request.header("Accept", accept);
        }
        request
    }
}

impl RepositoryGateway for ProviderGateway {
    fn provider(&self) -> &'static str {
        self.profile.name
    }

    fn exists(&self, owner: &str, repo: &str) -> Result<bool, ForgeError> {
        let url = self.lookup_url(owner, repo);
        let response = self.transport.send(&self.authorize(HttpRequest::get(&url)))?;
        tracing::debug!(provider = self.profile.name, owner, repo, status = response.status, "existence check");
        match response.status {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(ForgeError::UnexpectedStatus {
                provider: self.profile.name,
                url,
                status,
                body: response.body,
            }),
        }
    }

    fn create(&self, spec: &CreateSpec) -> Result<(), ForgeError> {
        let request = self.authorize(HttpRequest::post(self.create_url(), self.create_body(spec)));
        let response = self.transport.send(&request)?;
        if response.status != 201 {
            return Err(ForgeError::CreateFailed {
                provider: self.profile.name,
                repo: spec.name.clone(),
                status: response.status,
                body: response.body,
            });
        }
        tracing::info!(
            provider = self.profile.name,
            repo = %spec.name,
            visibility = %spec.visibility,
            "repository created"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;

    fn gateway(profile: &'static ProviderProfile, base: &str) -> ProviderGateway {
        ProviderGateway::new(
            profile,
            base,
            Secret::from("tok"),
            Arc::new(ScriptedTransport::new()),
        )
    }

    #[test]
    fn lookup_urls_follow_each_profile() {
        assert_eq!(
            gateway(&GITEA, "http://nas:3000/").lookup_url("me", "demo"),
            "http://nas:3000/api/v1/repos/me/demo"
        );
        assert_eq!(
            gateway(&GITHUB, "https://api.github.com").lookup_url("me", "demo"),
            "https://api.github.com/repos/me/demo"
        );
        assert_eq!(
            gateway(&GITLAB, "https://gitlab.com").lookup_url("me", "demo"),
            "https://gitlab.com/api/v4/projects/me%2Fdemo"
        );
    }

    #[test]
    fn create_urls_follow_each_profile() {
        assert_eq!(gateway(&GITEA, "http://nas").create_url(), "http://nas/api/v1/user/repos");
        assert_eq!(gateway(&GITHUB, "https://api.github.com").create_url(), "https://api.github.com/user/repos");
        assert_eq!(gateway(&GITLAB, "https://gitlab.com").create_url(), "https://gitlab.com/api/v4/projects");
    }

    #[test]
    fn gitlab_body_uses_visibility_level() {
        let body = gateway(&GITLAB, "https://gitlab.com")
            .create_body(&CreateSpec::new("demo", Visibility::Private));
        assert_eq!(body["visibility"], "private");
        assert_eq!(body["initialize_with_readme"], false);
        assert!(body.get("private").is_none());
    }

    #[test]
    fn private_flag_body_never_auto_inits() {
        let body = gateway(&GITHUB, "https://api.github.com")
            .create_body(&CreateSpec::new("demo", Visibility::Public));
        assert_eq!(body["private"], false);
        assert_eq!(body["auto_init"], false);
        assert_eq!(body["name"], "demo");
    }

    #[test]
    fn auth_headers_differ_per_profile() {
        let gh = gateway(&GITHUB, "https://api.github.com").authorize(HttpRequest::get("x"));
        assert_eq!(gh.header_value("authorization"), Some("token tok"));
        assert_eq!(gh.header_value("accept"), Some("application/vnd.github+json"));

        let gl = gateway(&GITLAB, "https://gitlab.com").authorize(HttpRequest::get("x"));
        assert_eq!(gl.header_value("private-token"), Some("tok"));
        assert_eq!(gl.header_value("authorization"), None);
    }
}
