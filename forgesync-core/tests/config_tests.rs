//! Integration tests for the forgesync-core config store.
//!
//! Each test uses an isolated `assert_fs::TempDir` as `$HOME`.

use std::fs;

use assert_fs::prelude::*;
use forgesync_core::config::{self, CredentialMode};
use forgesync_core::{Config, ConfigError, GitLabConfig, Platform, PrimaryConfig, Secret};
use predicates::prelude::*;
use rstest::rstest;

fn sample() -> Config {
    let mut cfg = Config {
        primary: PrimaryConfig {
            url: "http://pi-nas.local:3000".into(),
            username: "me".into(),
            token: Secret::from("gitea-token"),
        },
        ..Default::default()
    };
    cfg.github.username = "me-gh".into();
    cfg.github.token = Secret::from("ghp_token");
    cfg
}

// ---------------------------------------------------------------------------
// 1. Load / save
// ---------------------------------------------------------------------------

#[test]
fn save_then_load_returns_same_config() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    config::save_at(home.path(), &sample()).expect("save");

    home.child(".forgesync/config.yaml").assert(predicate::path::exists());
    home.child(".forgesync/config.yaml.tmp").assert(predicate::path::missing());

    let loaded = config::load_at(home.path()).expect("load");
    assert_eq!(loaded, sample());
    assert_eq!(loaded.primary.token.expose(), "gitea-token");
}

#[test]
fn load_missing_config_points_at_init() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ConfigNotFound { .. }));
    assert!(err.to_string().contains("forgesync init"));
}

#[test]
fn load_corrupt_yaml_names_the_file() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".forgesync/config.yaml")
        .write_str("primary: [unclosed")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    match err {
        ConfigError::Parse { path, .. } => assert!(path.ends_with("config.yaml")),
        other => panic!("expected Parse, got {other:?}"),
    }
}

#[test]
fn partial_file_still_loads() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".forgesync/config.yaml")
        .write_str("github:\n  username: me\n  token: t\n")
        .expect("write");

    let cfg = config::load_at(home.path()).expect("load");
    assert!(cfg.primary.url.is_empty());
    assert_eq!(cfg.remote.credentials, CredentialMode::Embedded);
    assert!(matches!(
        cfg.primary_account(),
        Err(ConfigError::MissingCredentials { section: "primary", field: "url" })
    ));
}

#[test]
fn saved_file_never_contains_redaction_marker() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = config::save_at(home.path(), &sample()).expect("save");
    let raw = fs::read_to_string(path).expect("read");
    assert!(raw.contains("ghp_token"));
    assert!(!raw.contains("REDACTED"));
}

#[test]
fn resave_overwrites_in_place() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    config::save_at(home.path(), &sample()).expect("first");

    let mut updated = sample();
    updated.primary.token = Secret::from("rotated");
    config::save_at(home.path(), &updated).expect("second");

    let loaded = config::load_at(home.path()).expect("load");
    assert_eq!(loaded.primary.token.expose(), "rotated");
}

// ---------------------------------------------------------------------------
// 2. Credential preconditions
// ---------------------------------------------------------------------------

#[rstest]
#[case("github", "", "t", "username")]
#[case("github", "me", "  ", "token")]
#[case("gitlab", "", "t", "username")]
#[case("gitlab", "me", "", "token")]
fn blank_secondary_fields_are_reported(
    #[case] section: &str,
    #[case] username: &str,
    #[case] token: &str,
    #[case] missing: &str,
) {
    let mut cfg = sample();
    let platform = if section == "github" {
        cfg.github.username = username.into();
        cfg.github.token = Secret::from(token);
        Platform::GitHub
    } else {
        cfg.gitlab = GitLabConfig {
            url: "https://gitlab.example.com".into(),
            username: username.into(),
            token: Secret::from(token),
        };
        Platform::GitLab
    };

    match cfg.secondary_account(platform) {
        Err(ConfigError::MissingCredentials { section: s, field }) => {
            assert_eq!(s, section);
            assert_eq!(field, missing);
        }
        other => panic!("expected MissingCredentials, got {other:?}"),
    }
}

#[test]
fn self_hosted_gitlab_builds_destination_from_its_url() {
    let mut cfg = sample();
    cfg.gitlab = GitLabConfig {
        url: "https://gitlab.example.com/".into(),
        username: "me-gl".into(),
        token: Secret::from("glpat"),
    };
    let account = cfg.secondary_account(Platform::GitLab).expect("gitlab");
    assert_eq!(account.api_url, "https://gitlab.example.com");
    assert_eq!(
        account.destination_url("demo"),
        "https://gitlab.example.com/me-gl/demo.git"
    );
}
