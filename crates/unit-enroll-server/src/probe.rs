// crates/unit-enroll-server/src/probe.rs
// ============================================================================
// Module: Health Probe
// Description: Periodic database connectivity check feeding a gauge.
// Purpose: Publish a binary up/down signal tagged with the build version,
//          for the lifetime of the process.
// Dependencies: tokio, unit-enroll-core
// ============================================================================

//! ## Overview
//! A background task pings the database at a fixed interval and flips
//! [`HealthGauge`] up or down. The gauge renders in Prometheus exposition
//! format with the build's commit as its only label, which is what
//! `GET /metrics` serves. The probe shares the request pool but touches
//! no provisioning state and is never cancelled except at shutdown.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use unit_enroll_core::StagingStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Interval between connectivity checks.
pub const PING_POLLING_FREQ: Duration = Duration::from_secs(5);

// ============================================================================
// SECTION: Health Gauge
// ============================================================================

/// Binary up/down gauge tagged with the build version.
#[derive(Debug)]
pub struct HealthGauge {
    /// Build version identifier used as the `commit` label.
    commit: String,
    /// Current database reachability.
    up: AtomicBool,
}

impl HealthGauge {
    /// Creates a gauge reporting down until the first successful ping.
    #[must_use]
    pub fn new(commit: impl Into<String>) -> Self {
        Self {
            commit: commit.into(),
            up: AtomicBool::new(false),
        }
    }

    /// Records the latest probe outcome.
    pub fn set_up(&self, up: bool) {
        self.up.store(up, Ordering::Relaxed);
    }

    /// Returns the latest probe outcome.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.up.load(Ordering::Relaxed)
    }

    /// Renders the gauge in Prometheus exposition format.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "# HELP microservice Version with DB ping check\n# TYPE microservice gauge\nmicroservice{{commit=\"{}\"}} {}\n",
            self.commit,
            u8::from(self.is_up())
        )
    }
}

// ============================================================================
// SECTION: Health Probe
// ============================================================================

/// Periodic connectivity check over the staging store.
pub struct HealthProbe {
    /// Store whose pool is pinged.
    store: Arc<dyn StagingStore>,
    /// Gauge receiving the outcome.
    gauge: Arc<HealthGauge>,
}

impl HealthProbe {
    /// Builds a probe over a store and gauge.
    #[must_use]
    pub fn new(store: Arc<dyn StagingStore>, gauge: Arc<HealthGauge>) -> Self {
        Self {
            store,
            gauge,
        }
    }

    /// Performs one connectivity check and records the outcome.
    pub async fn check_once(&self) {
        let up = self.store.ping().await.is_ok();
        if !up {
            tracing::warn!("database ping failed");
        }
        self.gauge.set_up(up);
    }

    /// Runs the probe forever at the given interval.
    pub async fn run(self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            self.check_once().await;
        }
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

    use std::sync::Arc;

    use async_trait::async_trait;
    use unit_enroll_core::EnrollError;
    use unit_enroll_core::InMemoryStagingStore;
    use unit_enroll_core::InsertOutcome;
    use unit_enroll_core::StagingStore;
    use unit_enroll_core::Unit;
    use unit_enroll_core::UnitCreated;

    use super::HealthGauge;
    use super::HealthProbe;

    /// Store whose ping always fails.
    struct DownStore;

    #[async_trait]
    impl StagingStore for DownStore {
        async fn resolve_product(
            &self,
            _external_id: &str,
        ) -> Result<Option<UnitCreated>, EnrollError> {
            Err(EnrollError::dependency("down"))
        }

        async fn insert_staging(&self, _unit: &Unit) -> Result<InsertOutcome, EnrollError> {
            Err(EnrollError::dependency("down"))
        }

        async fn ping(&self) -> Result<(), EnrollError> {
            Err(EnrollError::dependency("down"))
        }
    }

    #[tokio::test]
    async fn gauge_reflects_ping_outcome() {
        let gauge = Arc::new(HealthGauge::new("abc123"));
        assert!(!gauge.is_up());

        let probe = HealthProbe::new(Arc::new(InMemoryStagingStore::new()), Arc::clone(&gauge));
        probe.check_once().await;
        assert!(gauge.is_up());
        assert!(gauge.render().contains("microservice{commit=\"abc123\"} 1"));

        let probe = HealthProbe::new(Arc::new(DownStore), Arc::clone(&gauge));
        probe.check_once().await;
        assert!(!gauge.is_up());
        assert!(gauge.render().ends_with("microservice{commit=\"abc123\"} 0\n"));
    }
}
