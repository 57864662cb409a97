// crates/unit-enroll-server/src/config.rs
// ============================================================================
// Module: Server Configuration
// Description: Explicit server configuration with startup validation.
// Purpose: Hold everything the HTTP surface needs, constructed once in the
//          binary and passed by value; no ambient lookups after startup.
// Dependencies: unit-enroll-core
// ============================================================================

//! ## Overview
//! [`ServerConfig`] is assembled by the binary from flags, the process
//! environment, and the secret resolver, then validated before anything
//! listens. Validation failures are configuration errors and the process
//! does not start.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::PathBuf;

use unit_enroll_core::EnrollError;

// ============================================================================
// SECTION: Server Config
// ============================================================================

/// Server configuration assembled once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address, e.g. `0.0.0.0:8080`.
    pub bind: String,
    /// Directory holding the enrolment scripts.
    pub scripts_dir: PathBuf,
    /// Resolved API access token; empty only in local mode.
    pub api_access_token: String,
    /// When false, the bearer guard is bypassed (local development).
    pub require_auth: bool,
    /// Build version identifier for the health gauge label.
    pub commit: String,
}

impl ServerConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollError::Configuration`] for an unparseable bind
    /// address, a missing scripts directory, or a required-but-empty
    /// access token.
    pub fn validate(&self) -> Result<(), EnrollError> {
        self.bind
            .parse::<SocketAddr>()
            .map_err(|_| EnrollError::configuration(format!("invalid bind address {}", self.bind)))?;
        if !self.scripts_dir.is_dir() {
            return Err(EnrollError::configuration(format!(
                "scripts directory {} does not exist",
                self.scripts_dir.display()
            )));
        }
        if self.require_auth && self.api_access_token.is_empty() {
            return Err(EnrollError::configuration("API_ACCESS_TOKEN is unset"));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use unit_enroll_core::EnrollError;

    use super::ServerConfig;

    fn config(dir: &std::path::Path) -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:8080".to_string(),
            scripts_dir: dir.to_path_buf(),
            api_access_token: "secret".to_string(),
            require_auth: true,
            commit: "deadbeef".to_string(),
        }
    }

    #[test]
    fn accepts_a_complete_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(config(dir.path()).validate().is_ok());
    }

    #[test]
    fn rejects_bad_bind_and_missing_scripts_dir() {
        let dir = tempfile::tempdir().unwrap();
        let bad_bind = ServerConfig {
            bind: "nowhere".to_string(),
            ..config(dir.path())
        };
        assert!(matches!(bad_bind.validate(), Err(EnrollError::Configuration(_))));

        let gone = dir.path().join("missing");
        let bad_dir = ServerConfig {
            scripts_dir: gone,
            ..config(dir.path())
        };
        assert!(matches!(bad_dir.validate(), Err(EnrollError::Configuration(_))));
    }

    #[test]
    fn requires_a_token_unless_local() {
        let dir = tempfile::tempdir().unwrap();
        let missing_token = ServerConfig {
            api_access_token: String::new(),
            ..config(dir.path())
        };
        assert!(matches!(missing_token.validate(), Err(EnrollError::Configuration(_))));

        let local = ServerConfig {
            api_access_token: String::new(),
            require_auth: false,
            ..config(dir.path())
        };
        assert!(local.validate().is_ok());
    }
}
