// crates/unit-enroll-core/src/error.rs
// ============================================================================
// Module: Enrolment Errors
// Description: Error taxonomy for the unit enrolment workflow.
// Purpose: Classify failures into validation, configuration, dependency,
//          and consistency categories with stable HTTP mappings.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every failure in the enrolment core falls into one of four categories:
//! client-caused input problems, fatal startup configuration problems,
//! failed calls to the database or secret store, and the case where a
//! script ran but the expected downstream state never appeared. The HTTP
//! surface maps these onto status codes; nothing in the core retries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Error Taxonomy
// ============================================================================

/// Enrolment workflow errors.
#[derive(Debug, Error)]
pub enum EnrollError {
    /// Bad or missing input; always client-caused.
    #[error("{0}")]
    Validation(String),
    /// Unresolved or contradictory environment at startup; fatal.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A database or remote secret-store call failed.
    #[error("{0}")]
    Dependency(String),
    /// A script executed but the expected downstream state was not
    /// observed; signals a logic or schema mismatch, not a transient
    /// fault.
    #[error("consistency error: {0}")]
    Consistency(String),
}

impl EnrollError {
    /// Builds a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Builds a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Builds a dependency error.
    #[must_use]
    pub fn dependency(message: impl Into<String>) -> Self {
        Self::Dependency(message.into())
    }

    /// Builds a consistency error.
    #[must_use]
    pub fn consistency(message: impl Into<String>) -> Self {
        Self::Consistency(message.into())
    }

    /// Returns true when the error is client-caused.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
