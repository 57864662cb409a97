// crates/unit-enroll-core/src/store.rs
// ============================================================================
// Module: Storage Seams
// Description: Trait seams for the staging store and the script runner.
// Purpose: Keep the provisioning workflow independent of the database
//          backend, with an in-memory store for deterministic tests.
// Dependencies: async-trait, tokio
// ============================================================================

//! ## Overview
//! The provisioning workflow touches two collaborators: the staging table
//! holding incoming creation requests, and the externally maintained SQL
//! scripts that populate the legacy schema. Both are modeled as traits so
//! the MySQL backend and the in-memory test double are interchangeable.
//! [`InMemoryStagingStore`] implements both seams and simulates the
//! downstream product assignment the create script performs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::EnrollError;
use crate::unit::Unit;
use crate::unit::UnitCreated;

// ============================================================================
// SECTION: Script Names
// ============================================================================

/// Named enrolment scripts loaded from the script directory.
///
/// # Invariants
/// - File names are a fixed contract with the script maintainers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptName {
    /// Creates the downstream unit for a staged row.
    CreateUnit,
    /// Disables an existing downstream unit.
    DisableUnit,
}

impl ScriptName {
    /// Returns the script file name inside the script directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::CreateUnit => "unit_create_new.sql",
            Self::DisableUnit => "unit_disable_existing.sql",
        }
    }
}

impl fmt::Display for ScriptName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

// ============================================================================
// SECTION: Trait Seams
// ============================================================================

/// Outcome of a staging insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new staging row was written.
    Inserted,
    /// A row with the same external identifier already exists; the
    /// caller treats this as idempotent success.
    AlreadyStaged,
}

/// Staging-table access used by the provisioning workflow.
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Resolves the product assigned to an external identifier, joined
    /// with its downstream display name.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollError::Dependency`] when the lookup fails.
    async fn resolve_product(&self, external_id: &str)
    -> Result<Option<UnitCreated>, EnrollError>;

    /// Inserts a staging row for a unit.
    ///
    /// A duplicate external identifier reports
    /// [`InsertOutcome::AlreadyStaged`] rather than an error; the staging
    /// table carries a unique key on the external identifier.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollError::Dependency`] when the insert fails for any
    /// reason other than a duplicate key.
    async fn insert_staging(&self, unit: &Unit) -> Result<InsertOutcome, EnrollError>;

    /// Checks connectivity to the backing database.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollError::Dependency`] when the database is
    /// unreachable.
    async fn ping(&self) -> Result<(), EnrollError>;
}

/// Executes a named enrolment script against the legacy schema.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Runs a script with the subject identifier and the environment's
    /// stage code as its bound parameters.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollError::Validation`] for an empty subject id
    /// (checked before any file I/O) and [`EnrollError::Dependency`] for
    /// load or execution failures.
    async fn run(&self, script: ScriptName, subject_id: &str) -> Result<(), EnrollError>;
}

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// A staged row held by the in-memory store.
#[derive(Debug, Clone)]
struct StagedRow {
    /// The unit as submitted.
    unit: Unit,
    /// Product id assigned once the create script has run.
    product_id: Option<i64>,
}

/// Mutable state behind the in-memory store.
#[derive(Debug, Default)]
struct InMemoryState {
    /// Staged rows keyed by external identifier.
    rows: BTreeMap<String, StagedRow>,
    /// Ids already handed out; the next assignment is `max + 1`.
    last_product_id: i64,
    /// Number of create-script executions observed.
    create_runs: usize,
    /// Subject ids passed to the disable script, in call order.
    disabled: Vec<i64>,
}

/// In-memory staging store and script runner for tests and local runs.
///
/// Running the create script assigns the next product id to the staged
/// row, simulating the downstream entity the real script creates.
#[derive(Debug, Default)]
pub struct InMemoryStagingStore {
    /// Guarded store state.
    state: Mutex<InMemoryState>,
}

impl InMemoryStagingStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many times the create script has executed.
    pub async fn create_runs(&self) -> usize {
        self.state.lock().await.create_runs
    }

    /// Returns the ids passed to the disable script, in call order.
    pub async fn disabled_ids(&self) -> Vec<i64> {
        self.state.lock().await.disabled.clone()
    }
}

#[async_trait]
impl StagingStore for InMemoryStagingStore {
    async fn resolve_product(
        &self,
        external_id: &str,
    ) -> Result<Option<UnitCreated>, EnrollError> {
        let state = self.state.lock().await;
        Ok(state.rows.get(external_id).and_then(|row| {
            row.product_id.map(|product_id| UnitCreated {
                product_id,
                unit_name: row.unit.unit_name.clone(),
            })
        }))
    }

    async fn insert_staging(&self, unit: &Unit) -> Result<InsertOutcome, EnrollError> {
        let mut state = self.state.lock().await;
        if state.rows.contains_key(&unit.mefe_unit_id) {
            return Ok(InsertOutcome::AlreadyStaged);
        }
        state.rows.insert(unit.mefe_unit_id.clone(), StagedRow {
            unit: unit.clone(),
            product_id: None,
        });
        Ok(InsertOutcome::Inserted)
    }

    async fn ping(&self) -> Result<(), EnrollError> {
        Ok(())
    }
}

#[async_trait]
impl ScriptRunner for InMemoryStagingStore {
    async fn run(&self, script: ScriptName, subject_id: &str) -> Result<(), EnrollError> {
        if subject_id.is_empty() {
            return Err(EnrollError::validation("id is unset"));
        }
        let mut state = self.state.lock().await;
        match script {
            ScriptName::CreateUnit => {
                state.create_runs += 1;
                state.last_product_id += 1;
                let product_id = state.last_product_id;
                let row = state.rows.get_mut(subject_id).ok_or_else(|| {
                    EnrollError::dependency(format!("no staged row for {subject_id}"))
                })?;
                row.product_id = Some(product_id);
            }
            ScriptName::DisableUnit => {
                let bz_id = subject_id
                    .parse::<i64>()
                    .map_err(|_| EnrollError::validation("id is not numeric"))?;
                state.disabled.push(bz_id);
            }
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

    use super::InMemoryStagingStore;
    use super::InsertOutcome;
    use super::ScriptName;
    use super::ScriptRunner;
    use super::StagingStore;
    use crate::unit::Unit;

    fn unit(id: &str, name: &str) -> Unit {
        Unit {
            mefe_unit_id: id.to_string(),
            unit_name: name.to_string(),
            ..Unit::default()
        }
    }

    #[tokio::test]
    async fn insert_then_create_script_assigns_product() {
        let store = InMemoryStagingStore::new();
        assert_eq!(
            store.insert_staging(&unit("u1", "Acme")).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert!(store.resolve_product("u1").await.unwrap().is_none());
        store.run(ScriptName::CreateUnit, "u1").await.unwrap();
        let created = store.resolve_product("u1").await.unwrap().unwrap();
        assert!(created.product_id > 0);
        assert_eq!(created.unit_name, "Acme");
    }

    #[tokio::test]
    async fn duplicate_insert_reports_already_staged() {
        let store = InMemoryStagingStore::new();
        store.insert_staging(&unit("u1", "Acme")).await.unwrap();
        assert_eq!(
            store.insert_staging(&unit("u1", "Acme")).await.unwrap(),
            InsertOutcome::AlreadyStaged
        );
    }

    #[tokio::test]
    async fn empty_subject_is_rejected_before_any_state_change() {
        let store = InMemoryStagingStore::new();
        let err = store.run(ScriptName::CreateUnit, "").await.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(store.create_runs().await, 0);
    }
}
