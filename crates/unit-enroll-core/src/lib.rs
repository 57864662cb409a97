// crates/unit-enroll-core/src/lib.rs
// ============================================================================
// Module: Unit Enroll Core
// Description: Domain types and provisioning workflow for unit enrolment.
// Purpose: Define the storage seams and the idempotent create/disable logic.
// Dependencies: async-trait, serde, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! This crate holds the parts of the unit enrolment service with real
//! invariants: the [`Unit`]/[`UnitCreated`] wire types, the
//! [`EnrollError`] taxonomy, the [`StagingStore`] and [`ScriptRunner`]
//! seams, and [`ProvisioningService`], which enforces idempotent creation
//! and ordered batch disabling. Backends and transports live in sibling
//! crates; this crate performs no I/O of its own.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod provision;
pub mod stage;
pub mod store;
pub mod unit;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use error::EnrollError;
pub use provision::ProvisioningService;
pub use stage::StageCode;
pub use store::InMemoryStagingStore;
pub use store::InsertOutcome;
pub use store::ScriptName;
pub use store::ScriptRunner;
pub use store::StagingStore;
pub use unit::DisableTarget;
pub use unit::Unit;
pub use unit::UnitCreated;
