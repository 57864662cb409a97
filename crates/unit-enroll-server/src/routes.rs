// crates/unit-enroll-server/src/routes.rs
// ============================================================================
// Module: HTTP Routes
// Description: Axum handlers for the enrolment endpoints.
// Purpose: Decode payloads, enforce the exact wire-contract error bodies,
//          and map workflow errors onto status codes.
// Dependencies: axum, serde_json, unit-enroll-core
// ============================================================================

//! ## Overview
//! Three routes: `POST /create` and `POST /disable` drive the
//! provisioning workflow, `GET /metrics` serves the health gauge. Bodies
//! are decoded from raw bytes rather than through an extractor so the
//! contract's literal 400 bodies (`Empty payload`, `Invalid JSON`,
//! `Missing ID`) are preserved. A batch either returns a full result
//! list or a single error; there is no partial-success reporting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::Request;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::middleware;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde::de::DeserializeOwned;
use unit_enroll_core::DisableTarget;
use unit_enroll_core::EnrollError;
use unit_enroll_core::ProvisioningService;
use unit_enroll_core::Unit;

use crate::auth::AuthPolicy;
use crate::probe::HealthGauge;

// ============================================================================
// SECTION: App State
// ============================================================================

/// Shared state behind the enrolment routes.
pub struct AppState {
    /// The provisioning workflow.
    pub service: ProvisioningService,
    /// Health gauge served by `/metrics`.
    pub gauge: Arc<HealthGauge>,
    /// Route protection policy.
    pub auth: AuthPolicy,
}

/// Builds the enrolment router over shared state.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/create", post(create_units))
        .route("/disable", post(disable_units))
        .route("/metrics", get(metrics))
        .layer(middleware::from_fn_with_state(Arc::clone(&state), require_auth))
        .with_state(state)
}

// ============================================================================
// SECTION: Middleware
// ============================================================================

/// Rejects requests failing the bearer-token policy before any handler.
async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if state.auth.allows(request.headers()) {
        next.run(request).await
    } else {
        tracing::error!("bearer token missing or mismatched");
        (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
    }
}

// ============================================================================
// SECTION: Payload Decoding
// ============================================================================

/// Decode failures carrying their contractual response body.
enum DecodeFailure {
    /// Absent body or empty array.
    Empty,
    /// Body present but not valid JSON for the expected shape.
    Malformed,
}

impl DecodeFailure {
    /// Returns the literal 400 body for this failure.
    const fn body(&self) -> &'static str {
        match self {
            Self::Empty => "Empty payload",
            Self::Malformed => "Invalid JSON",
        }
    }
}

/// Decodes a JSON array payload, distinguishing empty from malformed.
fn decode_batch<T: DeserializeOwned>(bytes: &Bytes) -> Result<Vec<T>, DecodeFailure> {
    if bytes.is_empty() {
        return Err(DecodeFailure::Empty);
    }
    let items: Vec<T> = serde_json::from_slice(bytes).map_err(|_| DecodeFailure::Malformed)?;
    if items.is_empty() {
        return Err(DecodeFailure::Empty);
    }
    Ok(items)
}

/// Correlation fields copied from request headers for error logs.
fn correlation(headers: &HeaderMap) -> (String, String) {
    let header = |name: &str| {
        headers.get(name).and_then(|value| value.to_str().ok()).unwrap_or_default().to_string()
    };
    (header("x-request-id"), header("user-agent"))
}

/// Maps a workflow error onto its response.
fn error_response(err: &EnrollError) -> (StatusCode, String) {
    if err.is_client_error() {
        (StatusCode::BAD_REQUEST, err.to_string())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `POST /create`: provisions units in input order.
async fn create_units(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Response {
    let units: Vec<Unit> = match decode_batch(&bytes) {
        Ok(units) => units,
        Err(failure) => {
            tracing::error!(body = failure.body(), "input error");
            return (StatusCode::BAD_REQUEST, failure.body()).into_response();
        }
    };

    let (request_id, user_agent) = correlation(&headers);
    match state.service.create(&units).await {
        Ok(results) => {
            tracing::info!(request_id = %request_id, count = results.len(), "created units");
            (StatusCode::OK, Json(results)).into_response()
        }
        Err(err) => {
            tracing::error!(
                request_id = %request_id,
                user_agent = %user_agent,
                error = %err,
                "create failed"
            );
            error_response(&err).into_response()
        }
    }
}

/// `POST /disable`: disables units in input order, echoing the payload.
async fn disable_units(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Response {
    let targets: Vec<DisableTarget> = match decode_batch(&bytes) {
        Ok(targets) => targets,
        Err(failure) => {
            tracing::error!(body = failure.body(), "input error");
            return (StatusCode::BAD_REQUEST, failure.body()).into_response();
        }
    };

    let (request_id, user_agent) = correlation(&headers);
    match state.service.disable(&targets).await {
        Ok(()) => {
            tracing::info!(request_id = %request_id, count = targets.len(), "disabled units");
            (StatusCode::OK, Json(targets)).into_response()
        }
        Err(err) => {
            tracing::error!(
                request_id = %request_id,
                user_agent = %user_agent,
                error = %err,
                "disable failed"
            );
            error_response(&err).into_response()
        }
    }
}

/// `GET /metrics`: health gauge in exposition format.
async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    (StatusCode::OK, state.gauge.render()).into_response()
}
