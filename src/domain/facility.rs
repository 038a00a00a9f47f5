//! Flat facility record extracted from the registry payload
//!
//! The registry exposes facilities as FHIR Location resources with deeply
//! nested extension arrays. Everything the reconciliation core needs is
//! extracted once, at the adapter boundary, into this flat struct; the core
//! never inspects nested or optional JSON structures directly.

use crate::domain::ids::FacilityId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Identifier code carried by facility records that points at the DHIS2 code
pub const IDENTIFIER_FACILITY_ID: &str = "facilityId";
/// Identifier code carrying a pre-assigned DHIS2 org unit id, if any
pub const IDENTIFIER_DHIS_ID: &str = "dhisId";

/// Operational status display value that marks a record as a duplicate
pub const STATUS_DUPLICATE: &str = "Duplicate";

/// Geographic point as reported by the registry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl GeoPoint {
    /// Coordinates in the `[longitude, latitude]` order DHIS2 geometry uses
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// The self-first ancestor path of a facility
///
/// Transported as a slash-delimited string of registry ids; `path[0]` is the
/// facility itself and `path[1]` its immediate reporting parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyPath(Vec<FacilityId>);

impl HierarchyPath {
    /// Parse a slash-delimited reporting hierarchy string
    ///
    /// Empty segments are dropped; an entirely empty string yields an empty
    /// path, which the hierarchy resolver reports as `NoParent`.
    pub fn from_delimited(raw: &str) -> Self {
        let ids = raw
            .split('/')
            .filter(|part| !part.trim().is_empty())
            .filter_map(|part| FacilityId::from_str(part).ok())
            .collect();
        Self(ids)
    }

    /// The facility's own id, if the path is non-empty
    pub fn own_id(&self) -> Option<&FacilityId> {
        self.0.first()
    }

    /// The immediate reporting parent, if the path has one
    pub fn parent_id(&self) -> Option<&FacilityId> {
        self.0.get(1)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Why an otherwise well-formed record is not eligible for sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `facilityId` identifier on the record
    MissingFacilityCode,
    /// Operational status absent
    MissingOperationalStatus,
    /// Operational status is "Duplicate"
    Duplicate,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingFacilityCode => write!(f, "no facilityId identifier"),
            SkipReason::MissingOperationalStatus => write!(f, "no operational status"),
            SkipReason::Duplicate => write!(f, "operational status is Duplicate"),
        }
    }
}

/// One facility as known by the master facility registry
///
/// Built by the registry adapter from the raw FHIR payload. `raw` keeps the
/// original bundle entry solely so the staging transform can flatten it; the
/// reconciliation core reads only the typed fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityRecord {
    /// Registry-assigned stable id
    pub id: FacilityId,

    /// Facility display name
    pub name: String,

    /// Facility type classification (Office, Health Center, Hospital, ...)
    pub facility_type: Option<String>,

    /// Operational status display value (Active..., Suspended, Closed, Duplicate)
    pub operational_status: Option<String>,

    /// Whether this facility is itself a primary health care unit
    pub is_phcu: bool,

    /// Ownership, from the nested facility-information attributes
    pub ownership: Option<String>,

    /// Settlement type, from the nested facility-information attributes
    pub settlement: Option<String>,

    /// Year the facility opened
    pub year_opened: Option<NaiveDate>,

    /// Closed date, set when the status warrants it
    pub closed_date: Option<NaiveDate>,

    /// Suspension end date, set when the status warrants it
    pub suspension_end_date: Option<NaiveDate>,

    /// Geographic position
    pub position: Option<GeoPoint>,

    /// Value of the `facilityId` identifier (expected to equal the DHIS2 code)
    pub facility_code: Option<String>,

    /// Value of the `dhisId` identifier (pre-assigned org unit id), if present
    pub dhis_id: Option<String>,

    /// Self-first reporting hierarchy
    pub hierarchy: HierarchyPath,

    /// Authoritative version marker from the registry
    pub last_updated: DateTime<Utc>,

    /// Raw bundle entry, kept only for the staging transform
    pub raw: Value,
}

impl FacilityRecord {
    /// Check sync eligibility
    ///
    /// A record with no `facilityId` identifier, an undefined operational
    /// status, or status "Duplicate" is never eligible; callers log and skip
    /// before the decision engine ever sees it.
    pub fn eligibility(&self) -> Result<(), SkipReason> {
        if self
            .facility_code
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .is_empty()
        {
            return Err(SkipReason::MissingFacilityCode);
        }
        match self.operational_status.as_deref().map(str::trim) {
            None | Some("") => Err(SkipReason::MissingOperationalStatus),
            Some(STATUS_DUPLICATE) => Err(SkipReason::Duplicate),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(code: Option<&str>, status: Option<&str>) -> FacilityRecord {
        FacilityRecord {
            id: FacilityId::new("F1").unwrap(),
            name: "Adama Health Center".to_string(),
            facility_type: Some("Health Center".to_string()),
            operational_status: status.map(str::to_string),
            is_phcu: false,
            ownership: Some("Public".to_string()),
            settlement: Some("Urban".to_string()),
            year_opened: None,
            closed_date: None,
            suspension_end_date: None,
            position: Some(GeoPoint {
                latitude: 8.54,
                longitude: 39.27,
                altitude: None,
            }),
            facility_code: code.map(str::to_string),
            dhis_id: None,
            hierarchy: HierarchyPath::from_delimited("F1/P1/R1"),
            last_updated: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            raw: json!({}),
        }
    }

    #[test]
    fn test_hierarchy_path_parsing() {
        let path = HierarchyPath::from_delimited("F1/P1/R1");
        assert_eq!(path.len(), 3);
        assert_eq!(path.own_id().unwrap().as_str(), "F1");
        assert_eq!(path.parent_id().unwrap().as_str(), "P1");
    }

    #[test]
    fn test_hierarchy_path_single_entry_has_no_parent() {
        let path = HierarchyPath::from_delimited("F1");
        assert_eq!(path.len(), 1);
        assert!(path.parent_id().is_none());
    }

    #[test]
    fn test_hierarchy_path_drops_empty_segments() {
        let path = HierarchyPath::from_delimited("F1//P1/");
        assert_eq!(path.len(), 2);
        assert_eq!(path.parent_id().unwrap().as_str(), "P1");
    }

    #[test]
    fn test_eligible_record() {
        let rec = record(Some("FAC001"), Some("Currently Operational"));
        assert!(rec.eligibility().is_ok());
    }

    #[test]
    fn test_missing_facility_code_is_skipped() {
        let rec = record(None, Some("Currently Operational"));
        assert_eq!(rec.eligibility(), Err(SkipReason::MissingFacilityCode));

        let rec = record(Some("  "), Some("Currently Operational"));
        assert_eq!(rec.eligibility(), Err(SkipReason::MissingFacilityCode));
    }

    #[test]
    fn test_missing_status_is_skipped() {
        let rec = record(Some("FAC001"), None);
        assert_eq!(rec.eligibility(), Err(SkipReason::MissingOperationalStatus));
    }

    #[test]
    fn test_duplicate_status_is_skipped() {
        let rec = record(Some("FAC001"), Some("Duplicate"));
        assert_eq!(rec.eligibility(), Err(SkipReason::Duplicate));
    }

    #[test]
    fn test_geo_point_lon_lat_order() {
        let point = GeoPoint {
            latitude: 8.54,
            longitude: 39.27,
            altitude: None,
        };
        assert_eq!(point.lon_lat(), [39.27, 8.54]);
    }
}
