//! Credential config store.
//!
//! # Storage layout
//!
//! ```text
//! ~/.forgesync/
//!   config.yaml      (mode 0600)
//!   templates/       (optional seed-file overrides, see forgesync-renderer)
//! ```
//!
//! # API pattern
//!
//! Every filesystem function has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! The core only ever reads the loaded [`Config`]; `init` is the sole writer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Platform, Secret};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_WEB_URL: &str = "https://github.com";
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";
pub const DEFAULT_ALTERNATE_REMOTE: &str = "gitea";
pub const DEFAULT_BRANCH: &str = "main";

// ---------------------------------------------------------------------------
// 1. Schema
// ---------------------------------------------------------------------------

/// Root of `config.yaml`. Every section defaults to empty so a partially
/// filled file still loads; missing fields surface later as
/// [`ConfigError::MissingCredentials`] for the operation that needs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub primary: PrimaryConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub gitlab: GitLabConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

/// The primary host (Gitea-compatible API).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PrimaryConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub token: Secret,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GitHubConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub token: Secret,
    /// REST base, for GitHub Enterprise. Defaults to the public API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Base used to build mirror destination URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GitLabConfig {
    /// Blank means gitlab.com.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub token: Secret,
}

/// How the local working copy reaches the primary host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialMode {
    /// `username:token@` embedded in the remote URL.
    #[default]
    Embedded,
    /// Plain URL; the user's git credential helper supplies auth.
    Helper,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Remote name used when `origin` already points somewhere else.
    #[serde(default = "default_alternate_remote")]
    pub alternate_name: String,
    #[serde(default)]
    pub credentials: CredentialMode,
    /// Branch pushed when HEAD is detached.
    #[serde(default = "default_branch")]
    pub default_branch: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            alternate_name: default_alternate_remote(),
            credentials: CredentialMode::default(),
            default_branch: default_branch(),
        }
    }
}

fn default_alternate_remote() -> String {
    DEFAULT_ALTERNATE_REMOTE.to_string()
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

// ---------------------------------------------------------------------------
// 2. Resolved accounts
// ---------------------------------------------------------------------------

/// Validated primary-host credentials. `url` has no trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryAccount {
    pub url: String,
    pub username: String,
    pub token: Secret,
}

/// Validated credentials for the chosen secondary platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryAccount {
    pub platform: Platform,
    /// REST base (no trailing slash).
    pub api_url: String,
    /// Git-over-HTTPS base for mirror destinations (no trailing slash).
    pub web_url: String,
    pub username: String,
    pub token: Secret,
}

impl SecondaryAccount {
    /// `https://github.com/<user>/<repo>.git` and the GitLab equivalent.
    pub fn destination_url(&self, repo: &str) -> String {
        format!("{}/{}/{}.git", self.web_url, self.username, repo)
    }

    /// Browser URL for the summary output.
    pub fn repository_url(&self, repo: &str) -> String {
        format!("{}/{}/{}", self.web_url, self.username, repo)
    }
}

impl PrimaryAccount {
    pub fn repository_url(&self, repo: &str) -> String {
        format!("{}/{}/{}", self.url, self.username, repo)
    }
}

impl Config {
    /// Primary-host credentials, or `MissingCredentials` naming the first
    /// blank field.
    pub fn primary_account(&self) -> Result<PrimaryAccount, ConfigError> {
        let p = &self.primary;
        require("primary", "url", &p.url)?;
        require("primary", "username", &p.username)?;
        if p.token.is_empty() {
            return Err(ConfigError::MissingCredentials {
                section: "primary",
                field: "token",
            });
        }
        Ok(PrimaryAccount {
            url: trim_base(&p.url),
            username: p.username.trim().to_string(),
            token: p.token.clone(),
        })
    }

    /// Credentials for `platform`. Absence is a hard precondition failure,
    /// never a reason to skip the platform.
    pub fn secondary_account(&self, platform: Platform) -> Result<SecondaryAccount, ConfigError> {
        match platform {
            Platform::GitHub => {
                let gh = &self.github;
                require("github", "username", &gh.username)?;
                if gh.token.is_empty() {
                    return Err(ConfigError::MissingCredentials {
                        section: "github",
                        field: "token",
                    });
                }
                Ok(SecondaryAccount {
                    platform,
                    api_url: trim_base(gh.api_url.as_deref().unwrap_or(DEFAULT_GITHUB_API_URL)),
                    web_url: trim_base(gh.web_url.as_deref().unwrap_or(DEFAULT_GITHUB_WEB_URL)),
                    username: gh.username.trim().to_string(),
                    token: gh.token.clone(),
                })
            }
            Platform::GitLab => {
                let gl = &self.gitlab;
                require("gitlab", "username", &gl.username)?;
                if gl.token.is_empty() {
                    return Err(ConfigError::MissingCredentials {
                        section: "gitlab",
                        field: "token",
                    });
                }
                let base = if gl.url.trim().is_empty() {
                    DEFAULT_GITLAB_URL.to_string()
                } else {
                    trim_base(&gl.url)
                };
                Ok(SecondaryAccount {
                    platform,
                    api_url: base.clone(),
                    web_url: base,
                    username: gl.username.trim().to_string(),
                    token: gl.token.clone(),
                })
            }
        }
    }
}

fn require(section: &'static str, field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingCredentials { section, field });
    }
    Ok(())
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

// ---------------------------------------------------------------------------
// 3. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.forgesync/`. Pure, no I/O.
pub fn config_dir_at(home: &Path) -> PathBuf {
    home.join(".forgesync")
}

/// `<home>/.forgesync/config.yaml`. Pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    config_dir_at(home).join("config.yaml")
}

/// `config_path_at` convenience wrapper.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_path_at(&home()?))
}

/// `<home>/.forgesync/templates/`: seed-file overrides. May not exist.
pub fn templates_dir_at(home: &Path) -> PathBuf {
    config_dir_at(home).join("templates")
}

// ---------------------------------------------------------------------------
// 4. Load
// ---------------------------------------------------------------------------

/// Load `<home>/.forgesync/config.yaml`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    let config: Config = serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// 5. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save the config to `<home>/.forgesync/config.yaml`.
///
/// Write flow: serialize → `config.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// The directory is created with mode `0700` on first save.
pub fn save_at(home: &Path, config: &Config) -> Result<PathBuf, ConfigError> {
    let dir = config_dir_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = config_path_at(home);
    let tmp_path = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    tracing::debug!(path = %path.display(), "saved config");
    Ok(path)
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    save_at(&home()?, config)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn full_config() -> Config {
        Config {
            primary: PrimaryConfig {
                url: "http://pi-nas.local:3000/".into(),
                username: "me".into(),
                token: Secret::from("gitea-token"),
            },
            github: GitHubConfig {
                username: "me-gh".into(),
                token: Secret::from("ghp_x"),
                ..Default::default()
            },
            gitlab: GitLabConfig::default(),
            remote: RemoteConfig::default(),
        }
    }

    #[test]
    fn config_path_is_correct() {
        let home = TempDir::new().unwrap();
        assert!(config_path_at(home.path()).ends_with(".forgesync/config.yaml"));
    }

    #[test]
    fn save_creates_private_dir_and_file() {
        let home = TempDir::new().unwrap();
        let path = save_at(home.path(), &full_config()).expect("save");
        assert!(path.exists());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let dir_mode = std::fs::metadata(config_dir_at(home.path()))
                .unwrap()
                .permissions()
                .mode()
                & 0o777;
            let file_mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(dir_mode, 0o700);
            assert_eq!(file_mode, 0o600);
        }
    }

    #[test]
    fn primary_account_trims_trailing_slash() {
        let account = full_config().primary_account().expect("primary");
        assert_eq!(account.url, "http://pi-nas.local:3000");
        assert_eq!(account.repository_url("demo"), "http://pi-nas.local:3000/me/demo");
    }

    #[test]
    fn github_defaults_to_public_endpoints() {
        let account = full_config().secondary_account(Platform::GitHub).expect("github");
        assert_eq!(account.api_url, DEFAULT_GITHUB_API_URL);
        assert_eq!(account.destination_url("demo"), "https://github.com/me-gh/demo.git");
    }

    #[test]
    fn blank_gitlab_is_a_precondition_failure() {
        let err = full_config().secondary_account(Platform::GitLab).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredentials { section: "gitlab", field: "username" }
        ));
    }

    #[test]
    fn gitlab_blank_url_means_gitlab_com() {
        let mut cfg = full_config();
        cfg.gitlab = GitLabConfig {
            url: String::new(),
            username: "me-gl".into(),
            token: Secret::from("glpat"),
        };
        let account = cfg.secondary_account(Platform::GitLab).expect("gitlab");
        assert_eq!(account.destination_url("demo"), "https://gitlab.com/me-gl/demo.git");
    }

    #[test]
    fn remote_section_defaults() {
        let cfg: Config = serde_yaml::from_str("primary:\n  url: http://x\n").unwrap();
        assert_eq!(cfg.remote.alternate_name, "gitea");
        assert_eq!(cfg.remote.default_branch, "main");
        assert_eq!(cfg.remote.credentials, CredentialMode::Embedded);
    }
}
