//! Shadow field drift detection
//!
//! DHIS2 keeps shadow copies of registry fields as org unit attributes. A
//! record whose canonical fields no longer match those shadows has drifted
//! and must be staged for review rather than updated in place.

use crate::config::Dhis2AttributeConfig;
use crate::domain::facility::FacilityRecord;
use crate::domain::ids::AttributeId;
use crate::domain::org_unit::OrgUnit;

/// Resolved attribute UIDs for the shadow fields
#[derive(Debug, Clone)]
pub struct AttributeIds {
    pub facility_id: AttributeId,
    pub last_updated: AttributeId,
    pub ownership: AttributeId,
    pub settlement: AttributeId,
    pub facility_type: AttributeId,
    pub is_phcu: AttributeId,
    pub operational_status: AttributeId,
}

impl AttributeIds {
    /// Build from validated configuration
    pub fn from_config(config: &Dhis2AttributeConfig) -> crate::domain::Result<Self> {
        let attr = |value: &str| {
            AttributeId::new(value).map_err(crate::domain::SyncError::Configuration)
        };
        Ok(Self {
            facility_id: attr(&config.facility_id)?,
            last_updated: attr(&config.last_updated)?,
            ownership: attr(&config.ownership)?,
            settlement: attr(&config.settlement)?,
            facility_type: attr(&config.facility_type)?,
            is_phcu: attr(&config.is_phcu)?,
            operational_status: attr(&config.operational_status)?,
        })
    }
}

/// Compare two values the way a reviewer would: trimmed, absent means empty
fn differs(source: Option<&str>, target: Option<&str>) -> bool {
    source.unwrap_or("").trim() != target.unwrap_or("").trim()
}

/// Detect drifted fields between a registry record and its org unit
///
/// Returns the names of the fields that differ, in a stable order. An empty
/// result means the org unit's substantive fields still match the registry.
pub fn detect_drift(
    record: &FacilityRecord,
    unit: &OrgUnit,
    attrs: &AttributeIds,
) -> Vec<String> {
    let mut drifted = Vec::new();

    if differs(Some(&record.name), Some(&unit.name)) {
        drifted.push("name".to_string());
    }
    drifted.extend(detect_attribute_drift(record, unit, attrs));
    drifted
}

/// Detect drift in the shadow attributes only, skipping the display name
///
/// The PHCU wrapper carries a derived display name that never equals the
/// source name, so its drift check covers the shadow attributes alone.
pub fn detect_attribute_drift(
    record: &FacilityRecord,
    unit: &OrgUnit,
    attrs: &AttributeIds,
) -> Vec<String> {
    let mut drifted = Vec::new();

    if differs(
        record.ownership.as_deref(),
        unit.attribute(&attrs.ownership),
    ) {
        drifted.push("ownership".to_string());
    }
    if differs(
        record.settlement.as_deref(),
        unit.attribute(&attrs.settlement),
    ) {
        drifted.push("settlement".to_string());
    }
    if differs(
        record.facility_type.as_deref(),
        unit.attribute(&attrs.facility_type),
    ) {
        drifted.push("facilityType".to_string());
    }

    let source_phcu = if record.is_phcu { "true" } else { "false" };
    if differs(Some(source_phcu), unit.attribute(&attrs.is_phcu)) {
        drifted.push("isPhcu".to_string());
    }

    if differs(
        record.operational_status.as_deref(),
        unit.attribute(&attrs.operational_status),
    ) {
        drifted.push("operationalStatus".to_string());
    }

    drifted
}
