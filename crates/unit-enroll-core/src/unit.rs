// crates/unit-enroll-core/src/unit.rs
// ============================================================================
// Module: Unit Wire Types
// Description: Request and response payloads for unit enrolment.
// Purpose: Define the JSON contract shared with the front-end origin system.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Unit`] is a transient creation request keyed by the front-end's
//! external identifier; it is consumed to produce a staging row and is
//! never persisted as a standalone entity. [`UnitCreated`] is the response
//! projection joining the assigned product id with its downstream display
//! name. Field names are a fixed wire contract with the caller and are
//! not renamed here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Request Payloads
// ============================================================================

/// A unit provisioning request.
///
/// # Invariants
/// - `mefe_unit_id` is the caller-supplied unique key; an empty value is
///   rejected before any side effect.
// Plain types on purpose: nullable-column wrappers would only complicate
// the JSON contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// External unit identifier assigned by the front-end.
    #[serde(default)]
    pub mefe_unit_id: String,
    /// Creator identifier in the front-end origin system.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mefe_creator_user_id: String,
    /// Creator identifier in the legacy ticketing system.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub bzfe_creator_user_id: i32,
    /// Classification code for the unit.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub classification_id: i32,
    /// Display name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit_name: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit_description_details: String,
}

/// Serde helper for omitting unset numeric fields.
#[allow(clippy::trivially_copy_pass_by_ref, reason = "Serde skip predicates take references.")]
fn is_zero(value: &i32) -> bool {
    *value == 0
}

/// A disable request entry naming a downstream unit by its numeric id.
///
/// No existence check is performed at this layer; unknown ids pass
/// through to the disable script unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisableTarget {
    /// Downstream numeric identifier of the unit to disable.
    #[serde(rename = "bzId")]
    pub bz_id: i64,
}

// ============================================================================
// SECTION: Response Payloads
// ============================================================================

/// The response projection for a created (or already created) unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCreated {
    /// Server-assigned identifier in the downstream entity table.
    #[serde(rename = "id")]
    pub product_id: i64,
    /// Display name resolved from the downstream entity table.
    #[serde(rename = "name")]
    pub unit_name: String,
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

    use super::DisableTarget;
    use super::Unit;
    use super::UnitCreated;

    #[test]
    fn unit_deserializes_with_optional_fields_absent() {
        let unit: Unit =
            serde_json::from_str(r#"{"mefe_unit_id":"u1","unit_name":"Acme"}"#).unwrap();
        assert_eq!(unit.mefe_unit_id, "u1");
        assert_eq!(unit.unit_name, "Acme");
        assert_eq!(unit.bzfe_creator_user_id, 0);
        assert!(unit.unit_description_details.is_empty());
    }

    #[test]
    fn unit_created_uses_wire_field_names() {
        let created = UnitCreated {
            product_id: 42,
            unit_name: "Acme".to_string(),
        };
        let json = serde_json::to_string(&created).unwrap();
        assert_eq!(json, r#"{"id":42,"name":"Acme"}"#);
    }

    #[test]
    fn disable_target_uses_bz_id_key() {
        let target: DisableTarget = serde_json::from_str(r#"{"bzId":7}"#).unwrap();
        assert_eq!(target.bz_id, 7);
        assert_eq!(serde_json::to_string(&target).unwrap(), r#"{"bzId":7}"#);
    }
}
