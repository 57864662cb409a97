// crates/unit-enroll-env/src/lib.rs
// ============================================================================
// Module: Unit Enroll Env
// Description: Environment resolution for the unit enrolment service.
// Purpose: Resolve secrets, caller identity, stage, and deterministic names
//          once at startup into an immutable context value.
// Dependencies: async-trait, aws-config, aws-sdk-ssm, aws-sdk-sts,
//               unit-enroll-core
// ============================================================================

//! ## Overview
//! This crate derives everything the service needs from its deployment
//! environment: the stage code, the AWS account identity, the region, and
//! the per-stage bucket/domain/topic names. Resolution happens once; the
//! resulting [`EnvContext`] is an explicit value passed by reference into
//! every component that needs it, never an ambient global.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod context;
pub mod secrets;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use context::CallerIdentity;
pub use context::EnvContext;
pub use context::StsCallerIdentity;
pub use secrets::OverrideSource;
pub use secrets::ParameterStore;
pub use secrets::SecretResolver;
pub use secrets::SsmParameterStore;
