// crates/unit-enroll-core/src/stage.rs
// ============================================================================
// Module: Stage Codes
// Description: Deployment tier codes derived from the STAGE secret.
// Purpose: Provide the stable integer codes consumed by enrolment scripts.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The stage code is a small enumeration of deployment tiers. Its integer
//! values are a wire contract with the externally maintained SQL scripts
//! and with the invitation-processing schema downstream, so the
//! discriminants are fixed and `Unknown` is the zero value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Stage Code
// ============================================================================

/// Deployment tier code derived from the stage string.
///
/// # Invariants
/// - Discriminants are stable: scripts receive them as integers.
/// - `Unknown` is the zero/default value and never a deploy target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageCode {
    /// Stage could not be resolved to a known tier.
    #[default]
    Unknown = 0,
    /// Development, also used for staging.
    Dev = 1,
    /// Production.
    Prod = 2,
    /// Demo, production-like, for prospective customers.
    Demo = 3,
}

impl StageCode {
    /// Maps a stage string to its code by exact match.
    ///
    /// Anything other than `dev`, `prod`, or `demo` (including the empty
    /// string) yields [`StageCode::Unknown`].
    #[must_use]
    pub fn from_stage(stage: &str) -> Self {
        match stage {
            "dev" => Self::Dev,
            "prod" => Self::Prod,
            "demo" => Self::Demo,
            _ => Self::Unknown,
        }
    }

    /// Returns the integer code bound into enrolment scripts.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns true when the code names a real deploy tier.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Returns a stable label for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Dev => "dev",
            Self::Prod => "prod",
            Self::Demo => "demo",
        }
    }
}

impl fmt::Display for StageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
