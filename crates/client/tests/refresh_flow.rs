//! Cross-module behavior of the refresh pipeline under concurrency.
//!
//! These tests drive several requests through one client at the same time
//! and assert the single-flight contract against a mock backend: exactly one
//! refresh call no matter how many requests need it, and one shared outcome
//! for everyone that waited.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use circle_client::{ApiClient, ApiError, ClientConfig, RequestDescriptor};
use circle_common::testing::MemoryCredentialStore;
use circle_common::{CredentialStore, Session};
use futures::future::join_all;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Surface client tracing in test output when `RUST_LOG` asks for it.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("circle_client=debug").try_init();
}

/// Store whose token is valid but inside the refresh threshold, so the next
/// request refreshes proactively.
fn expiring_store(token: &str) -> Arc<MemoryCredentialStore> {
    let session = Session::new(
        token.to_string(),
        Some(Utc::now().timestamp() + 2 * 24 * 60 * 60),
        None,
    );
    Arc::new(MemoryCredentialStore::with_session(
        session,
        Duration::from_secs(3 * 24 * 60 * 60),
    ))
}

fn client(server: &MockServer, store: Arc<MemoryCredentialStore>) -> ApiClient {
    let config = ClientConfig { base_url: server.uri(), ..ClientConfig::default() };
    ApiClient::builder().config(config).store(store).build().expect("client")
}

fn refresh_body(token: &str) -> serde_json::Value {
    json!({
        "success": true,
        "message": "Token refreshed",
        "data": { "token": token, "expires_at": Utc::now().timestamp() + 30 * 24 * 60 * 60 }
    })
}

fn ok_body() -> serde_json::Value {
    json!({ "success": true, "message": "ok", "data": null })
}

#[tokio::test]
async fn concurrent_requests_share_one_refresh() {
    init_tracing();
    let server = MockServer::start().await;

    // The delay keeps the refresh in flight while the other requests arrive.
    Mock::given(method("POST"))
        .and(path("/v1/account/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(refresh_body("new-token"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    for route in ["/v1/a", "/v1/b", "/v1/c"] {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("Authorization", "Bearer new-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client(&server, expiring_store("old-token"));

    let (a, b, c) = tokio::join!(
        client.request(RequestDescriptor::get("/a")),
        client.request(RequestDescriptor::get("/b")),
        client.request(RequestDescriptor::get("/c")),
    );

    assert!(a.expect("a").is_success());
    assert!(b.expect("b").is_success());
    assert!(c.expect("c").is_success());

    // Mock expectations verify on drop: one refresh, one hit per route, all
    // with the rotated token.
}

#[tokio::test]
async fn wider_fan_out_still_makes_one_refresh_call() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/account/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(refresh_body("new-token"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/resource"))
        .and(header("Authorization", "Bearer new-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(8)
        .mount(&server)
        .await;

    let client = client(&server, expiring_store("old-token"));

    let requests =
        (0..8).map(|_| client.request(RequestDescriptor::get("/resource"))).collect::<Vec<_>>();
    let results = join_all(requests).await;

    for result in results {
        assert!(result.expect("request").is_success());
    }
}

#[tokio::test]
async fn refresh_failure_rejects_every_queued_request() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/account/refresh"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("boom")
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = expiring_store("old-token");
    let client = client(&server, store.clone());

    let fired = Arc::new(AtomicUsize::new(0));
    let fired_hook = Arc::clone(&fired);
    client.on_session_expired(move || {
        fired_hook.fetch_add(1, Ordering::SeqCst);
    });

    let (a, b, c) = tokio::join!(
        client.request(RequestDescriptor::get("/a")),
        client.request(RequestDescriptor::get("/b")),
        client.request(RequestDescriptor::get("/c")),
    );

    for result in [a, b, c] {
        match result {
            Err(ApiError::RefreshFailed(message)) => {
                // Everyone observes the same underlying failure.
                assert!(message.contains("500"), "unexpected message: {message}");
            }
            other => panic!("expected RefreshFailed, got {other:?}"),
        }
    }

    // Full teardown: session gone, redirect hook fired exactly once.
    assert!(!store.is_authenticated().await);
    assert!(store.snapshot().is_none());
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn next_request_after_failed_refresh_starts_a_new_cycle() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/account/refresh"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    // After teardown the store is empty: the follow-up request goes out
    // unauthenticated and does not try to refresh again.
    Mock::given(method("GET"))
        .and(path("/v1/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let store = expiring_store("old-token");
    let client = client(&server, store.clone());

    let err = client
        .request(RequestDescriptor::get("/anything"))
        .await
        .expect_err("refresh must fail");
    assert!(matches!(err, ApiError::RefreshFailed(_)));
    assert!(store.snapshot().is_none());

    let response =
        client.request(RequestDescriptor::get("/public")).await.expect("follow-up request");
    assert!(response.is_success());

    let public_request = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.url.path() == "/v1/public")
        .expect("public request");
    assert!(!public_request.headers.contains_key("authorization"));
}
