// crates/unit-enroll-store-mysql/src/lib.rs
// ============================================================================
// Module: Unit Enroll MySQL Store
// Description: MySQL implementations of the staging store and script runner.
// Purpose: Bind the provisioning workflow to the legacy ticketing database.
// Dependencies: sqlx, tokio, unit-enroll-core
// ============================================================================

//! ## Overview
//! This crate implements the core seams against the legacy MySQL schema:
//! the staging table `ut_data_to_create_units`, the downstream `products`
//! table, and the externally maintained enrolment scripts. All SQL uses
//! driver-bound placeholders; no runtime value is ever formatted into
//! statement text.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod scripts;
pub mod store;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use scripts::MySqlScriptRunner;
pub use store::MySqlStagingStore;
pub use store::MySqlStoreConfig;
