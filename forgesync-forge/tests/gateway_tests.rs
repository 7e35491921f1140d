//! Provider Gateway and Mirror Registrar against a `wiremock` server, through
//! the real `ureq` transport.
//!
//! `ureq` blocks, so the tests run on the multi-thread runtime and call the
//! gateways directly; `wiremock` serves from its own thread.

use std::sync::Arc;

use forgesync_core::{
    DestinationCredential, MirrorSpec, Platform, PrimaryAccount, RepositoryIdentity,
    SecondaryAccount, Secret, Visibility,
};
use forgesync_forge::transport::USER_AGENT;
use forgesync_forge::{
    CreateSpec, ForgeError, MirrorOutcome, MirrorRegistrar, ProviderGateway, RepositoryGateway,
    Transport, UreqTransport,
};
use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> Arc<dyn Transport> {
    Arc::new(UreqTransport::new())
}

fn primary(server: &MockServer) -> PrimaryAccount {
    PrimaryAccount {
        url: server.uri(),
        username: "me".into(),
        token: Secret::from("gitea-token"),
    }
}

fn secondary(server: &MockServer, platform: Platform) -> SecondaryAccount {
    SecondaryAccount {
        platform,
        api_url: server.uri(),
        web_url: server.uri(),
        username: "me".into(),
        token: Secret::from("sec-token"),
    }
}

fn mirror_spec() -> MirrorSpec {
    MirrorSpec::new(
        RepositoryIdentity::new("me", "demo"),
        "https://github.com/me/demo.git",
        DestinationCredential {
            username: "me".into(),
            secret: Secret::from("ghp_x"),
        },
    )
}

fn reply(status: u16, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_string(body)
}

const PUSH_MIRRORS: &str = "/api/v1/repos/me/demo/push_mirrors";

// ---------------------------------------------------------------------------
// 1. Exists
// ---------------------------------------------------------------------------

#[rstest]
#[case(200, true)]
#[case(404, false)]
#[tokio::test(flavor = "multi_thread")]
async fn exists_maps_status(#[case] status: u16, #[case] expected: bool) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/me/demo"))
        .respond_with(reply(status, "{}"))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = ProviderGateway::primary(&primary(&server), transport());
    assert_eq!(gateway.exists("me", "demo").expect("exists"), expected);
}

#[tokio::test(flavor = "multi_thread")]
async fn exists_rejects_other_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/me/demo"))
        .respond_with(reply(500, "boom"))
        .mount(&server)
        .await;

    let gateway = ProviderGateway::secondary(&secondary(&server, Platform::GitHub), transport());
    match gateway.exists("me", "demo") {
        Err(ForgeError::UnexpectedStatus { provider, status, body, .. }) => {
            assert_eq!(provider, "GitHub");
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn gitlab_lookup_uses_encoded_project_path_and_private_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/me%2Fdemo"))
        .and(header("private-token", "sec-token"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(reply(200, "{}"))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = ProviderGateway::secondary(&secondary(&server, Platform::GitLab), transport());
    assert!(gateway.exists("me", "demo").expect("exists"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_host_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .expect("addr");
    let account = PrimaryAccount {
        url: format!("http://{addr}"),
        username: "me".into(),
        token: Secret::from("t"),
    };
    let gateway = ProviderGateway::primary(&account, transport());
    assert!(matches!(
        gateway.exists("me", "demo"),
        Err(ForgeError::Transport { .. })
    ));
}

// ---------------------------------------------------------------------------
// 2. Create
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn create_sends_visibility_and_no_auto_init() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/user/repos"))
        .and(header("authorization", "token gitea-token"))
        .and(body_partial_json(json!({
            "name": "demo",
            "private": true,
            "auto_init": false,
        })))
        .respond_with(reply(201, "{}"))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = ProviderGateway::primary(&primary(&server), transport());
    gateway
        .create(&CreateSpec::new("demo", Visibility::Private))
        .expect("create");
}

#[rstest]
#[case(200)]
#[case(409)]
#[case(422)]
#[tokio::test(flavor = "multi_thread")]
async fn create_accepts_only_201(#[case] status: u16) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .respond_with(reply(status, "name already exists on this account"))
        .mount(&server)
        .await;

    let gateway = ProviderGateway::secondary(&secondary(&server, Platform::GitHub), transport());
    let err = gateway
        .create(&CreateSpec::new("demo", Visibility::Public))
        .unwrap_err();
    assert!(matches!(err, ForgeError::CreateFailed { status: s, .. } if s == status));
}

// ---------------------------------------------------------------------------
// 3. Mirror registration
// ---------------------------------------------------------------------------

#[rstest]
#[case(200)]
#[case(201)]
#[tokio::test(flavor = "multi_thread")]
async fn mirror_success_statuses(#[case] status: u16) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PUSH_MIRRORS))
        .and(body_partial_json(json!({
            "remote_address": "https://github.com/me/demo.git",
            "sync_on_commit": true,
            "interval": "8h",
        })))
        .respond_with(reply(status, "{}"))
        .expect(1)
        .mount(&server)
        .await;

    let registrar = MirrorRegistrar::new(&primary(&server), transport());
    assert_eq!(
        registrar.register_push_mirror(&mirror_spec()).expect("register"),
        MirrorOutcome::Registered
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn registering_twice_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PUSH_MIRRORS))
        .respond_with(reply(201, "{}"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(PUSH_MIRRORS))
        .respond_with(reply(400, r#"{"message":"push mirror already exists"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let registrar = MirrorRegistrar::new(&primary(&server), transport());
    let spec = mirror_spec();
    assert_eq!(registrar.register_push_mirror(&spec).expect("first"), MirrorOutcome::Registered);
    assert_eq!(
        registrar.register_push_mirror(&spec).expect("second"),
        MirrorOutcome::AlreadyRegistered
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn other_mirror_failures_surface() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PUSH_MIRRORS))
        .respond_with(reply(403, "forbidden"))
        .mount(&server)
        .await;

    let registrar = MirrorRegistrar::new(&primary(&server), transport());
    match registrar.register_push_mirror(&mirror_spec()) {
        Err(ForgeError::MirrorRegistrationFailed { repo, status, .. }) => {
            assert_eq!(repo, "me/demo");
            assert_eq!(status, 403);
        }
        other => panic!("expected MirrorRegistrationFailed, got {other:?}"),
    }
}
