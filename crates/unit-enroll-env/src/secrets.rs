// crates/unit-enroll-env/src/secrets.rs
// ============================================================================
// Module: Secret Resolution
// Description: Named secret lookup with local override precedence.
// Purpose: Prefer process-local overrides, fall back to the remote
//          parameter store, and never raise past this boundary.
// Dependencies: async-trait, aws-sdk-ssm, tracing
// ============================================================================

//! ## Overview
//! [`SecretResolver`] resolves a named secret. A same-named local override
//! wins and logs a warning (overrides exist to avoid costly remote
//! lookups outside production); otherwise the remote parameter store is
//! called with decryption enabled. A remote failure logs the error and
//! resolves to the empty string, so callers must treat `""` as
//! "unresolved" and decide fail-fast versus continue. Nothing is cached:
//! repeated resolution repeats the round trip.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// SECTION: Remote Parameter Store
// ============================================================================

/// Remote parameter store failures.
#[derive(Debug, Error)]
pub enum ParameterStoreError {
    /// The remote call failed or the parameter had no value.
    #[error("parameter lookup failed: {0}")]
    Lookup(String),
}

/// A remote store of named, encrypted parameters.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Fetches a parameter value with decryption enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterStoreError`] when the call fails or the
    /// parameter carries no value.
    async fn get_parameter(&self, key: &str) -> Result<String, ParameterStoreError>;
}

/// AWS SSM Parameter Store client.
#[derive(Debug, Clone)]
pub struct SsmParameterStore {
    /// Underlying SSM client bound to the resolved region.
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    /// Builds a store from a loaded AWS SDK configuration.
    #[must_use]
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_ssm::Client::new(config),
        }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get_parameter(&self, key: &str) -> Result<String, ParameterStoreError> {
        let output = self
            .client
            .get_parameter()
            .name(key)
            .with_decryption(true)
            .send()
            .await
            .map_err(|err| ParameterStoreError::Lookup(err.to_string()))?;
        output
            .parameter()
            .and_then(|parameter| parameter.value())
            .map(str::to_string)
            .ok_or_else(|| ParameterStoreError::Lookup(format!("{key} has no value")))
    }
}

// ============================================================================
// SECTION: Override Source
// ============================================================================

/// Where same-named local overrides are looked up.
#[derive(Debug, Clone)]
pub enum OverrideSource {
    /// The process environment (deployment default).
    ProcessEnv,
    /// A fixed map, used by tests and local tooling.
    Static(BTreeMap<String, String>),
}

impl OverrideSource {
    /// Looks up an override for a key.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<String> {
        match self {
            Self::ProcessEnv => std::env::var(key).ok(),
            Self::Static(map) => map.get(key).cloned(),
        }
    }
}

// ============================================================================
// SECTION: Secret Resolver
// ============================================================================

/// Named secret resolution with local override precedence.
#[derive(Clone)]
pub struct SecretResolver {
    /// Local override lookup, consulted before the remote store.
    overrides: OverrideSource,
    /// Remote parameter store fallback.
    remote: Arc<dyn ParameterStore>,
}

impl SecretResolver {
    /// Builds a resolver over the process environment and a remote store.
    #[must_use]
    pub fn new(remote: Arc<dyn ParameterStore>) -> Self {
        Self {
            overrides: OverrideSource::ProcessEnv,
            remote,
        }
    }

    /// Builds a resolver with an explicit override source.
    #[must_use]
    pub fn with_overrides(overrides: OverrideSource, remote: Arc<dyn ParameterStore>) -> Self {
        Self {
            overrides,
            remote,
        }
    }

    /// Resolves a named secret.
    ///
    /// Returns the local override when present, otherwise the remote
    /// value, otherwise the empty string. Never raises.
    pub async fn resolve(&self, key: &str) -> String {
        if let Some(value) = self.overrides.lookup(key) {
            tracing::warn!(key, value = %value, "secret overridden by local env");
            return value;
        }
        match self.remote.get_parameter(key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(key, error = %err, "failed to retrieve credentials");
                String::new()
            }
        }
    }

    /// Resolves a secret, substituting a fallback for the empty string.
    ///
    /// The fallback path logs a warning since it usually means a
    /// deployment is running on defaults.
    pub async fn resolve_or(&self, key: &str, fallback: &str) -> String {
        let value = self.resolve(key).await;
        if value.is_empty() {
            tracing::warn!(key, fallback, "using fallback value");
            fallback.to_string()
        } else {
            value
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
