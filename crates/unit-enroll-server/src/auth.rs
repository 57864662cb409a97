// crates/unit-enroll-server/src/auth.rs
// ============================================================================
// Module: Bearer Token Guard
// Description: Authorization-header enforcement for the enrolment routes.
// Purpose: Compare the presented bearer token against the resolved API
//          access token, fail-closed, with a local-mode bypass.
// Dependencies: axum
// ============================================================================

//! ## Overview
//! Requests carry `Authorization: Bearer <token>`. The guard compares the
//! presented token against the access token resolved at startup and
//! rejects mismatches with 401 before any handler runs. Local runs
//! (no managed stage) bypass the guard entirely so developers can hit
//! the routes without provisioning a token.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

// ============================================================================
// SECTION: Auth Policy
// ============================================================================

/// Route protection policy chosen at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPolicy {
    /// No enforcement; local development only.
    Open,
    /// Bearer-token comparison against the resolved access token.
    Bearer(String),
}

impl AuthPolicy {
    /// Returns true when the request may proceed.
    #[must_use]
    pub fn allows(&self, headers: &HeaderMap) -> bool {
        match self {
            Self::Open => true,
            Self::Bearer(expected) => {
                let presented = bearer_token(headers);
                match presented {
                    Some(token) => !token.is_empty() && token == expected.as_str(),
                    None => false,
                }
            }
        }
    }
}

/// Extracts the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    Some(value.strip_prefix("Bearer ").unwrap_or(value))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
