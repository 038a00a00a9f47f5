//! DHIS2 wire envelopes and datastore models

use crate::domain::ids::FacilityId;
use crate::domain::org_unit::OrgUnit;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flattened-record key carrying the registry version marker
pub const RECORD_LAST_UPDATED_KEY: &str = "resource.meta.lastUpdated";

/// Envelope returned by org unit list queries
#[derive(Debug, Deserialize)]
pub struct OrgUnitList {
    #[serde(default, rename = "organisationUnits")]
    pub organisation_units: Vec<OrgUnit>,
}

/// A substantive change staged for human review
///
/// Keyed in the datastore by the registry facility id, so re-staging the
/// same facility replaces the previous pending entry instead of piling up.
#[derive(Debug, Clone)]
pub struct PendingChange {
    /// Registry facility id, used as the datastore key
    pub key: FacilityId,

    /// Registry version marker of the record being staged
    pub last_updated: DateTime<Utc>,

    /// Human-readable reason this record needs review
    pub reason: String,

    /// Flattened registry record, shown to the reviewer as-is
    pub record: Value,
}

/// Datastore document for a staged change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedEntry {
    pub reason: String,
    pub staged_at: DateTime<Utc>,
    pub record: Value,
}

impl StagedEntry {
    pub fn from_change(change: &PendingChange) -> Self {
        Self {
            reason: change.reason.clone(),
            staged_at: Utc::now(),
            record: change.record.clone(),
        }
    }

    /// Registry version marker of the staged record, if parseable
    pub fn record_last_updated(&self) -> Option<DateTime<Utc>> {
        self.record
            .get(RECORD_LAST_UPDATED_KEY)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Whether the staged record is already at the given registry version
    pub fn is_current(&self, last_updated: DateTime<Utc>) -> bool {
        self.record_last_updated() == Some(last_updated)
    }
}

/// What the datastore did with a staged change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingDisposition {
    /// No entry existed; a new one was created
    Created,
    /// An entry for an older registry version was replaced
    Replaced,
    /// An entry for this exact registry version already existed
    AlreadyCurrent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn change(last_updated: DateTime<Utc>) -> PendingChange {
        PendingChange {
            key: FacilityId::new("F1").unwrap(),
            last_updated,
            reason: "field drift: ownership".to_string(),
            record: json!({
                "resource.id": "F1",
                "resource.meta.lastUpdated": last_updated.to_rfc3339(),
            }),
        }
    }

    #[test]
    fn test_staged_entry_version_comparison() {
        let v1 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let v2 = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();

        let entry = StagedEntry::from_change(&change(v1));
        assert!(entry.is_current(v1));
        assert!(!entry.is_current(v2));
    }

    #[test]
    fn test_staged_entry_without_version_is_never_current() {
        let entry = StagedEntry {
            reason: "x".to_string(),
            staged_at: Utc::now(),
            record: json!({"resource.id": "F1"}),
        };
        assert!(!entry.is_current(Utc::now()));
    }

    #[test]
    fn test_org_unit_list_deserialization() {
        let list: OrgUnitList = serde_json::from_value(json!({
            "organisationUnits": [
                {"id": "kJq2mPlqjzS", "name": "Adama Health Center", "code": "FAC001"}
            ]
        }))
        .unwrap();
        assert_eq!(list.organisation_units.len(), 1);

        let empty: OrgUnitList = serde_json::from_value(json!({})).unwrap();
        assert!(empty.organisation_units.is_empty());
    }
}
