// crates/unit-enroll-server/tests/http_api.rs
// ============================================================================
// Module: HTTP API Tests
// Description: Wire-contract tests for the enrolment routes.
// Purpose: Verify status codes, literal error bodies, idempotent creation,
//          and the bearer guard against an in-memory store.
// Dependencies: unit-enroll-core, unit-enroll-server, tower
// ============================================================================

//! ## Overview
//! These tests drive the router exactly as a caller would, through
//! `tower::ServiceExt::oneshot`, with the in-memory staging store behind
//! the workflow. They pin the literal 400 bodies, the input-order
//! response contract, idempotent re-submission, and 401 enforcement.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use http_body_util::BodyExt;
use tower::ServiceExt;
use unit_enroll_core::InMemoryStagingStore;
use unit_enroll_core::ProvisioningService;
use unit_enroll_core::ScriptRunner;
use unit_enroll_server::AppState;
use unit_enroll_server::AuthPolicy;
use unit_enroll_server::HealthGauge;
use unit_enroll_server::router;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Builds a router over a fresh in-memory store.
fn app(auth: AuthPolicy) -> Router {
    let store = Arc::new(InMemoryStagingStore::new());
    let scripts: Arc<dyn ScriptRunner> = Arc::clone(&store) as Arc<dyn ScriptRunner>;
    let service = ProvisioningService::new(store, scripts);
    let gauge = Arc::new(HealthGauge::new("testcommit"));
    gauge.set_up(true);
    router(Arc::new(AppState {
        service,
        gauge,
        auth,
    }))
}

/// Builds a JSON POST request.
fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Runs a request and returns status and body text.
async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

// ============================================================================
// SECTION: Create
// ============================================================================

#[tokio::test]
async fn create_returns_product_ids_in_input_order() {
    let app = app(AuthPolicy::Open);
    let payload = r#"[{"mefe_unit_id":"u1","unit_name":"Acme"},{"mefe_unit_id":"u2","unit_name":"Globex"}]"#;
    let (status, body) = send(app, post_json("/create", payload)).await;
    assert_eq!(status, StatusCode::OK);

    let created: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(created.len(), 2);
    assert!(created[0]["id"].as_i64().unwrap() > 0);
    assert_eq!(created[0]["name"], "Acme");
    assert_eq!(created[1]["name"], "Globex");
}

#[tokio::test]
async fn create_is_idempotent_across_resubmission() {
    let app = app(AuthPolicy::Open);
    let payload = r#"[{"mefe_unit_id":"u1","unit_name":"Acme"}]"#;

    let (status, first) = send(app.clone(), post_json("/create", payload)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = send(app, post_json("/create", payload)).await;
    assert_eq!(status, StatusCode::OK);

    let first: Vec<serde_json::Value> = serde_json::from_str(&first).unwrap();
    let second: Vec<serde_json::Value> = serde_json::from_str(&second).unwrap();
    assert_eq!(first[0]["id"], second[0]["id"]);
    assert_eq!(second[0]["name"], "Acme");
}

#[tokio::test]
async fn create_rejects_an_empty_array() {
    let (status, body) = send(app(AuthPolicy::Open), post_json("/create", "[]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Empty payload");
}

#[tokio::test]
async fn create_rejects_an_absent_body() {
    let app = app(AuthPolicy::Open);
    let request =
        Request::builder().method("POST").uri("/create").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Empty payload");
}

#[tokio::test]
async fn create_rejects_malformed_json() {
    let (status, body) = send(app(AuthPolicy::Open), post_json("/create", "not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid JSON");
}

#[tokio::test]
async fn create_rejects_a_missing_external_id() {
    let payload = r#"[{"unit_name":"Acme"}]"#;
    let (status, body) = send(app(AuthPolicy::Open), post_json("/create", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Missing ID");
}

// ============================================================================
// SECTION: Disable
// ============================================================================

#[tokio::test]
async fn disable_echoes_the_input_array() {
    let (status, body) = send(app(AuthPolicy::Open), post_json("/disable", r#"[{"bzId":42}]"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"[{"bzId":42}]"#);
}

#[tokio::test]
async fn disable_rejects_empty_and_malformed_payloads() {
    let (status, body) = send(app(AuthPolicy::Open), post_json("/disable", "[]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Empty payload");

    let (status, body) = send(app(AuthPolicy::Open), post_json("/disable", "{")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid JSON");
}

// ============================================================================
// SECTION: Metrics and Auth
// ============================================================================

#[tokio::test]
async fn metrics_serves_the_health_gauge() {
    let app = app(AuthPolicy::Open);
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("microservice{commit=\"testcommit\"} 1"));
}

#[tokio::test]
async fn bearer_guard_rejects_missing_and_wrong_tokens() {
    let protected = app(AuthPolicy::Bearer("secret".to_string()));

    let (status, _) =
        send(protected.clone(), post_json("/create", r#"[{"mefe_unit_id":"u1"}]"#)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut request = post_json("/create", r#"[{"mefe_unit_id":"u1"}]"#);
    request.headers_mut().insert("authorization", "Bearer wrong".parse().unwrap());
    let (status, _) = send(protected.clone(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut request = post_json("/create", r#"[{"mefe_unit_id":"u1"}]"#);
    request.headers_mut().insert("authorization", "Bearer secret".parse().unwrap());
    let (status, _) = send(protected, request).await;
    assert_eq!(status, StatusCode::OK);
}
