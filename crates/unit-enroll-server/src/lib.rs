// crates/unit-enroll-server/src/lib.rs
// ============================================================================
// Module: Unit Enroll Server
// Description: HTTP surface and health probe for the unit enrolment service.
// Purpose: Route create/disable requests into the provisioning workflow and
//          expose the database health gauge.
// Dependencies: axum, tokio, unit-enroll-core
// ============================================================================

//! ## Overview
//! This crate owns everything request-facing: the axum router for
//! `POST /create`, `POST /disable`, and `GET /metrics`, the bearer-token
//! guard, the periodic database health probe, and the server
//! configuration. The provisioning semantics live in `unit-enroll-core`;
//! handlers here only decode payloads, enforce the exact error bodies of
//! the wire contract, and map workflow errors onto status codes.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod auth;
pub mod config;
pub mod probe;
pub mod routes;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use auth::AuthPolicy;
pub use config::ServerConfig;
pub use probe::HealthGauge;
pub use probe::HealthProbe;
pub use routes::AppState;
pub use routes::router;
