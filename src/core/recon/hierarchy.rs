//! Parent resolution
//!
//! Compares the registry's reporting parent against the registry id carried
//! by the DHIS2 parent org unit. For facilities reporting through a split
//! PHCU, the DHIS2 parent is the wrapper entry, which carries the parent id
//! with a `_PHCU` suffix; that still counts as a match.

use crate::core::recon::drift::AttributeIds;
use crate::domain::facility::FacilityRecord;
use crate::domain::org_unit::OrgUnit;

/// Result of matching a record's reporting parent to an org unit's parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentMatch {
    /// Parent org unit carries the expected registry id
    Matched,
    /// Parent org unit is the `_PHCU` wrapper of the expected parent
    MatchedViaWrapper,
    /// Parent org unit carries a different registry id
    Mismatch,
    /// Parent absent, or it carries no registry id attribute
    MissingParentAttributes,
    /// The record itself has no reporting parent
    NoHierarchy,
}

/// Match the record's reporting parent against the org unit's parent
///
/// `accept_wrapper` widens the match to the parent's `_PHCU` wrapper id;
/// wrapper org units themselves must match the bare parent id.
pub fn match_parent(
    record: &FacilityRecord,
    unit: &OrgUnit,
    attrs: &AttributeIds,
    accept_wrapper: bool,
) -> ParentMatch {
    let Some(expected) = record.hierarchy.parent_id() else {
        return ParentMatch::NoHierarchy;
    };

    let Some(parent) = &unit.parent else {
        return ParentMatch::MissingParentAttributes;
    };
    let Some(actual) = parent.attribute(&attrs.facility_id) else {
        return ParentMatch::MissingParentAttributes;
    };

    if actual == expected.as_str() {
        ParentMatch::Matched
    } else if accept_wrapper && actual == expected.phcu_wrapper_key() {
        ParentMatch::MatchedViaWrapper
    } else {
        ParentMatch::Mismatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{AttributeId, FacilityId, OrgUnitId};
    use crate::domain::org_unit::{AttributeValue, ParentOrgUnit};
    use crate::domain::HierarchyPath;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn attrs() -> AttributeIds {
        AttributeIds {
            facility_id: AttributeId::new("attrFacilityId").unwrap(),
            last_updated: AttributeId::new("attrLastUpdated").unwrap(),
            ownership: AttributeId::new("attrOwnership").unwrap(),
            settlement: AttributeId::new("attrSettlement").unwrap(),
            facility_type: AttributeId::new("attrFt").unwrap(),
            is_phcu: AttributeId::new("attrIsPhcu").unwrap(),
            operational_status: AttributeId::new("attrOpStatus").unwrap(),
        }
    }

    fn record(hierarchy: &str) -> FacilityRecord {
        FacilityRecord {
            id: FacilityId::new("F1").unwrap(),
            name: "Adama Health Center".to_string(),
            facility_type: None,
            operational_status: Some("Currently Operational".to_string()),
            is_phcu: false,
            ownership: None,
            settlement: None,
            year_opened: None,
            closed_date: None,
            suspension_end_date: None,
            position: None,
            facility_code: Some("FAC001".to_string()),
            dhis_id: None,
            hierarchy: HierarchyPath::from_delimited(hierarchy),
            last_updated: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            raw: json!({}),
        }
    }

    fn unit(parent_registry_id: Option<&str>) -> OrgUnit {
        OrgUnit {
            id: OrgUnitId::new("kJq2mPlqjzS").unwrap(),
            code: Some("FAC001".to_string()),
            name: "Adama Health Center".to_string(),
            short_name: None,
            opening_date: None,
            attribute_values: vec![],
            parent: parent_registry_id.map(|id| ParentOrgUnit {
                id: OrgUnitId::new("pArEnT01").unwrap(),
                attribute_values: vec![AttributeValue::new("attrFacilityId", id)],
            }),
            geometry: None,
        }
    }

    #[test]
    fn test_exact_parent_match() {
        let result = match_parent(&record("F1/P1/R1"), &unit(Some("P1")), &attrs(), true);
        assert_eq!(result, ParentMatch::Matched);
    }

    #[test]
    fn test_wrapper_parent_match() {
        let result = match_parent(&record("F1/P1/R1"), &unit(Some("P1_PHCU")), &attrs(), true);
        assert_eq!(result, ParentMatch::MatchedViaWrapper);
    }

    #[test]
    fn test_wrapper_not_accepted_when_exact_required() {
        let result = match_parent(&record("F1/P1/R1"), &unit(Some("P1_PHCU")), &attrs(), false);
        assert_eq!(result, ParentMatch::Mismatch);
    }

    #[test]
    fn test_parent_mismatch() {
        let result = match_parent(&record("F1/P1/R1"), &unit(Some("P9")), &attrs(), true);
        assert_eq!(result, ParentMatch::Mismatch);
    }

    #[test]
    fn test_no_parent_org_unit() {
        let result = match_parent(&record("F1/P1/R1"), &unit(None), &attrs(), true);
        assert_eq!(result, ParentMatch::MissingParentAttributes);
    }

    #[test]
    fn test_parent_without_registry_attribute() {
        let mut target = unit(Some("P1"));
        target.parent.as_mut().unwrap().attribute_values.clear();
        let result = match_parent(&record("F1/P1/R1"), &target, &attrs(), true);
        assert_eq!(result, ParentMatch::MissingParentAttributes);
    }

    #[test]
    fn test_record_without_hierarchy() {
        let result = match_parent(&record("F1"), &unit(Some("P1")), &attrs(), true);
        assert_eq!(result, ParentMatch::NoHierarchy);
    }
}
