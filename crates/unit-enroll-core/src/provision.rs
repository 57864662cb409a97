// crates/unit-enroll-core/src/provision.rs
// ============================================================================
// Module: Provisioning Service
// Description: Idempotent unit creation and ordered batch disabling.
// Purpose: Drive the check / stage / script / resolve sequence behind the
//          HTTP surface, with a per-identifier critical section.
// Dependencies: tokio, tracing, unit-enroll-core seams
// ============================================================================

//! ## Overview
//! [`ProvisioningService`] owns the enrolment workflow. Creation is
//! idempotent per external identifier: a unit that already has a product
//! id is returned as-is, otherwise a staging row is written, the create
//! script runs, and the product id is re-resolved. The check-insert-run
//! sequence holds a per-identifier lock so two concurrent submissions of
//! the same id cannot both take the creation path; a duplicate-key
//! insert from an earlier process generation is likewise treated as
//! idempotent success.
//!
//! Batches are not transactional. Each item runs to completion (or
//! error) before the next begins, the first error aborts the remainder,
//! and no partial result list is returned. Callers resubmit the
//! remaining items; idempotency makes that safe.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::EnrollError;
use crate::store::InsertOutcome;
use crate::store::ScriptName;
use crate::store::ScriptRunner;
use crate::store::StagingStore;
use crate::unit::DisableTarget;
use crate::unit::Unit;
use crate::unit::UnitCreated;

// ============================================================================
// SECTION: Provisioning Service
// ============================================================================

/// The create/disable workflow over the staging store and script runner.
pub struct ProvisioningService {
    /// Staging-table access.
    store: Arc<dyn StagingStore>,
    /// Enrolment script execution.
    scripts: Arc<dyn ScriptRunner>,
    /// Per-external-identifier critical sections for creation.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ProvisioningService {
    /// Builds a provisioning service over the given seams.
    #[must_use]
    pub fn new(store: Arc<dyn StagingStore>, scripts: Arc<dyn ScriptRunner>) -> Self {
        Self {
            store,
            scripts,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Creates units in input order, returning one [`UnitCreated`] per
    /// input in the same order.
    ///
    /// Re-submitting an already provisioned identifier returns its
    /// existing product id without re-running the create script.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollError::Validation`] for an empty external
    /// identifier, [`EnrollError::Dependency`] when staging or script
    /// execution fails, and [`EnrollError::Consistency`] when no product
    /// id became resolvable after staging. The first error aborts the
    /// batch; earlier creations are not rolled back.
    pub async fn create(&self, units: &[Unit]) -> Result<Vec<UnitCreated>, EnrollError> {
        let mut results = Vec::with_capacity(units.len());
        for unit in units {
            if unit.mefe_unit_id.is_empty() {
                return Err(EnrollError::validation("Missing ID"));
            }
            results.push(self.create_one(unit).await?);
        }
        Ok(results)
    }

    /// Creates a single unit under its per-identifier lock.
    async fn create_one(&self, unit: &Unit) -> Result<UnitCreated, EnrollError> {
        let key_lock = self.key_lock(&unit.mefe_unit_id).await;
        let _held = key_lock.lock().await;

        if let Some(existing) = self.store.resolve_product(&unit.mefe_unit_id).await? {
            tracing::info!(
                mefe_unit_id = %unit.mefe_unit_id,
                product_id = existing.product_id,
                "unit already provisioned"
            );
            return Ok(existing);
        }

        match self.store.insert_staging(unit).await? {
            InsertOutcome::Inserted => {
                tracing::info!(mefe_unit_id = %unit.mefe_unit_id, "inserted staging row");
                self.scripts.run(ScriptName::CreateUnit, &unit.mefe_unit_id).await?;
            }
            InsertOutcome::AlreadyStaged => {
                // Lost a duplicate-key race against another writer; fall
                // through to resolution without re-running the script.
                tracing::warn!(
                    mefe_unit_id = %unit.mefe_unit_id,
                    "staging row already present, resolving existing product"
                );
            }
        }

        self.store.resolve_product(&unit.mefe_unit_id).await?.ok_or_else(|| {
            EnrollError::consistency(format!(
                "no product resolvable for {} after staging",
                unit.mefe_unit_id
            ))
        })
    }

    /// Disables units in input order.
    ///
    /// Disabling is repeatable: the scripts tolerate ids that are
    /// already disabled or unknown downstream.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollError::Dependency`] on the first script failure;
    /// ids already processed are not rolled back.
    pub async fn disable(&self, targets: &[DisableTarget]) -> Result<(), EnrollError> {
        for target in targets {
            self.scripts.run(ScriptName::DisableUnit, &target.bz_id.to_string()).await?;
            tracing::info!(bz_id = target.bz_id, "ran disable script");
        }
        Ok(())
    }

    /// Returns the lock guarding creation for one external identifier.
    ///
    /// Entries are never evicted; the set of distinct identifiers seen by
    /// one process is bounded by its request volume.
    async fn key_lock(&self, external_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(external_id.to_string()).or_default())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
