//! FHIR wire models and record extraction
//!
//! Bundle envelopes are deserialized with serde; individual Location entries
//! go through the flattening transform and come out as typed
//! [`FacilityRecord`]s. The reconciliation core never sees raw FHIR JSON.

use crate::core::transform::{paths, FlatResource};
use crate::domain::errors::RegistryError;
use crate::domain::facility::{FacilityRecord, GeoPoint, HierarchyPath};
use crate::domain::ids::FacilityId;
use crate::domain::{IDENTIFIER_DHIS_ID, IDENTIFIER_FACILITY_ID};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

/// FHIR search bundle envelope
#[derive(Debug, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub total: Option<u64>,

    #[serde(default)]
    pub link: Vec<BundleLink>,

    #[serde(default)]
    pub entry: Vec<Value>,
}

impl Bundle {
    /// URL of the next page, if the server reported one
    pub fn next_url(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|l| l.relation == "next")
            .map(|l| l.url.as_str())
    }
}

/// Pagination link in a bundle
#[derive(Debug, Deserialize)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
}

/// One page of facility records plus the link to the next page
#[derive(Debug)]
pub struct FacilityPage {
    pub records: Vec<FacilityRecord>,
    pub next_url: Option<String>,
    pub total: Option<u64>,
}

/// Extract a typed facility record from a bundle entry
///
/// The entry is flattened first; `id`, `name`, and `meta.lastUpdated` are
/// required, everything else degrades to `None`.
pub fn facility_from_entry(entry: &Value) -> Result<FacilityRecord, RegistryError> {
    let flat = FlatResource::from_entry(entry);

    let id = flat
        .get_str(paths::ID)
        .ok_or_else(|| RegistryError::InvalidFormat("Location resource has no id".to_string()))?;
    let id = FacilityId::new(id)
        .map_err(|e| RegistryError::InvalidFormat(format!("invalid facility id: {}", e)))?;

    let name = flat
        .get_str(paths::NAME)
        .ok_or_else(|| {
            RegistryError::InvalidFormat(format!("Location {} has no name", id.as_str()))
        })?
        .to_string();

    let last_updated = flat.get_datetime(paths::LAST_UPDATED).ok_or_else(|| {
        RegistryError::InvalidFormat(format!(
            "Location {} has no parseable meta.lastUpdated",
            id.as_str()
        ))
    })?;

    let position = match (
        flat.get_f64(paths::LATITUDE),
        flat.get_f64(paths::LONGITUDE),
    ) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
            altitude: flat.get_f64(paths::ALTITUDE),
        }),
        _ => None,
    };

    let hierarchy =
        HierarchyPath::from_delimited(flat.get_str(paths::REPORTING_HIERARCHY).unwrap_or(""));

    Ok(FacilityRecord {
        id,
        name,
        facility_type: flat.get_str(paths::FACILITY_TYPE).map(str::to_string),
        operational_status: flat.get_str(paths::OPERATIONAL_STATUS).map(str::to_string),
        is_phcu: flat.get_bool(paths::IS_PHCU).unwrap_or(false),
        ownership: flat.get_str(paths::OWNERSHIP).map(str::to_string),
        settlement: flat.get_str(paths::SETTLEMENT).map(str::to_string),
        year_opened: parse_date(flat.get_str(paths::YEAR_OPENED)),
        closed_date: parse_date(flat.get_str(paths::CLOSED_DATE)),
        suspension_end_date: parse_date(flat.get_str(paths::SUSPENSION_END_DATE)),
        position,
        facility_code: flat.identifier(IDENTIFIER_FACILITY_ID).map(str::to_string),
        dhis_id: flat.identifier(IDENTIFIER_DHIS_ID).map(str::to_string),
        hierarchy,
        last_updated,
        raw: entry.clone(),
    })
}

/// Parse a registry date field
///
/// The registry emits both plain dates and full timestamps; only the date
/// part matters downstream.
fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?;
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
