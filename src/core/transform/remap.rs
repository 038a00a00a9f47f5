//! FHIR Location flattening
//!
//! This module converts the registry's nested FHIR Location resources into a
//! flat dot-keyed map so the adapter can read fields by stable path instead
//! of walking nested JSON. Three FHIR collections get special treatment:
//!
//! - `extension` arrays are keyed by the extension `url` and recurse into
//!   nested extensions (`resource.extension.FacilityInformation.ownership`)
//! - `identifier` arrays are keyed by the identifier's type coding code
//!   (`resource.identifier.facilityId`)
//! - `type` arrays are keyed by the coding code, carrying the display text
//!   (`resource.type.FT`)

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

/// Stable dot paths into a flattened Location resource
pub mod paths {
    pub const ID: &str = "resource.id";
    pub const NAME: &str = "resource.name";
    pub const LAST_UPDATED: &str = "resource.meta.lastUpdated";
    pub const STATUS: &str = "resource.extension.status";
    pub const REPORTING_HIERARCHY: &str = "resource.extension.reportingHierarchyId";
    pub const OPERATIONAL_STATUS: &str = "resource.operationalStatus.display";
    pub const FACILITY_TYPE: &str = "resource.type.FT";
    pub const SETTLEMENT: &str = "resource.extension.FacilityInformation.settlement";
    pub const OWNERSHIP: &str = "resource.extension.FacilityInformation.ownership";
    pub const YEAR_OPENED: &str = "resource.extension.FacilityInformation.yearOpened";
    pub const IS_PHCU: &str = "resource.extension.FacilityInformation.isPrimaryHealthCareUnit";
    pub const CLOSED_DATE: &str = "resource.extension.FacilityInformation.closedDate";
    pub const SUSPENSION_END_DATE: &str =
        "resource.extension.FacilityInformation.suspensionEndDate";
    pub const LONGITUDE: &str = "resource.position.longitude";
    pub const LATITUDE: &str = "resource.position.latitude";
    pub const ALTITUDE: &str = "resource.position.altitude";
    pub const IDENTIFIER_PREFIX: &str = "resource.identifier";
}

/// A Location resource flattened to dot-keyed fields
#[derive(Debug, Clone)]
pub struct FlatResource {
    fields: HashMap<String, Value>,
}

impl FlatResource {
    /// Flatten a bundle entry (or `{"resource": ...}` wrapper) into dot keys
    pub fn from_entry(entry: &Value) -> Self {
        let mut fields = HashMap::new();

        if let Value::Object(map) = entry {
            for (key, value) in map {
                match value {
                    Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                        fields.insert(key.clone(), value.clone());
                    }
                    _ => flatten_value(key, value, &mut fields),
                }
            }
        }

        Self { fields }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.fields.get(path).and_then(Value::as_str)
    }

    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.fields.get(path).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.fields.get(path).and_then(Value::as_bool)
    }

    /// Read an RFC 3339 timestamp field, normalised to UTC
    pub fn get_datetime(&self, path: &str) -> Option<DateTime<Utc>> {
        self.get_str(path)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Read an identifier value by its type coding code
    pub fn identifier(&self, code: &str) -> Option<&str> {
        self.get_str(&format!("{}.{}", paths::IDENTIFIER_PREFIX, code))
    }

    /// The flattened fields as a JSON object
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone().into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn flatten_value(parent: &str, value: &Value, out: &mut HashMap<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = format!("{}.{}", parent, key);
                match key.as_str() {
                    "extension" => flatten_extensions(&path, child, out),
                    "identifier" => flatten_identifiers(&path, child, out),
                    "type" => flatten_type_codings(&path, child, out),
                    _ => match child {
                        Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                            out.insert(path, child.clone());
                        }
                        _ => flatten_value(&path, child, out),
                    },
                }
            }
        }
        Value::String(_) | Value::Number(_) | Value::Bool(_) => {
            out.insert(parent.to_string(), value.clone());
        }
        _ => {}
    }
}

/// Flatten an `extension` array, keying each entry by its `url`
///
/// An extension either carries a primitive `value[x]` field or a nested
/// `extension` array; nested arrays recurse with the url joined onto the
/// parent path.
fn flatten_extensions(parent: &str, extensions: &Value, out: &mut HashMap<String, Value>) {
    let Some(items) = extensions.as_array() else {
        return;
    };

    for item in items {
        let Some(url) = item.get("url").and_then(Value::as_str) else {
            continue;
        };
        let path = format!("{}.{}", parent, url);

        let primitive = item
            .as_object()
            .into_iter()
            .flatten()
            .find(|(key, value)| key.starts_with("value") && !value.is_null())
            .map(|(_, value)| value.clone());

        if let Some(value) = primitive {
            out.insert(path, value);
        } else if let Some(nested) = item.get("extension") {
            flatten_extensions(&path, nested, out);
        }
    }
}

/// Flatten an `identifier` array, keying each entry by its type coding code
fn flatten_identifiers(parent: &str, identifiers: &Value, out: &mut HashMap<String, Value>) {
    let Some(items) = identifiers.as_array() else {
        return;
    };

    for item in items {
        let code = item
            .pointer("/type/coding/0/code")
            .and_then(Value::as_str);
        let value = item.get("value").filter(|v| !v.is_null());

        if let (Some(code), Some(value)) = (code, value) {
            out.insert(format!("{}.{}", parent, code), value.clone());
        }
    }
}

/// Flatten a `type` array, keying each entry's `text` by its coding code
fn flatten_type_codings(parent: &str, types: &Value, out: &mut HashMap<String, Value>) {
    let Some(items) = types.as_array() else {
        return;
    };

    for item in items {
        let code = item.pointer("/coding/0/code").and_then(Value::as_str);
        let text = item.get("text").filter(|v| !v.is_null());

        if let (Some(code), Some(text)) = (code, text) {
            out.insert(format!("{}.{}", parent, code), text.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_entry() -> Value {
        json!({
            "fullUrl": "https://registry.example.org/fhir/Location/F1",
            "resource": {
                "id": "F1",
                "name": "Adama Health Center",
                "meta": {
                    "lastUpdated": "2024-03-10T08:30:00.000+00:00",
                    "versionId": "7"
                },
                "operationalStatus": {
                    "display": "Currently Operational"
                },
                "position": {
                    "longitude": 39.27,
                    "latitude": 8.54,
                    "altitude": 1712.0
                },
                "type": [
                    {
                        "coding": [{"code": "FT"}],
                        "text": "Health Center"
                    }
                ],
                "identifier": [
                    {
                        "type": {"coding": [{"code": "facilityId"}]},
                        "value": "FAC001"
                    },
                    {
                        "type": {"coding": [{"code": "dhisId"}]},
                        "value": "kJq2mPlqjzS"
                    },
                    {
                        "type": {"coding": [{"code": "hmisCode"}]},
                        "value": null
                    }
                ],
                "extension": [
                    {
                        "url": "status",
                        "valueString": "Approved"
                    },
                    {
                        "url": "reportingHierarchyId",
                        "valueString": "F1/P1/R1"
                    },
                    {
                        "url": "FacilityInformation",
                        "extension": [
                            {"url": "ownership", "valueString": "Public"},
                            {"url": "settlement", "valueString": "Urban"},
                            {"url": "yearOpened", "valueString": "2010-06-15"},
                            {"url": "isPrimaryHealthCareUnit", "valueBoolean": false}
                        ]
                    }
                ]
            }
        })
    }

    #[test]
    fn test_top_level_primitives_pass_through() {
        let flat = FlatResource::from_entry(&sample_entry());
        assert_eq!(
            flat.get_str("fullUrl"),
            Some("https://registry.example.org/fhir/Location/F1")
        );
    }

    #[test]
    fn test_nested_objects_use_dot_keys() {
        let flat = FlatResource::from_entry(&sample_entry());
        assert_eq!(flat.get_str(paths::ID), Some("F1"));
        assert_eq!(flat.get_str(paths::NAME), Some("Adama Health Center"));
        assert_eq!(
            flat.get_str(paths::OPERATIONAL_STATUS),
            Some("Currently Operational")
        );
        assert_eq!(flat.get_f64(paths::LONGITUDE), Some(39.27));
    }

    #[test]
    fn test_extensions_keyed_by_url() {
        let flat = FlatResource::from_entry(&sample_entry());
        assert_eq!(flat.get_str(paths::STATUS), Some("Approved"));
        assert_eq!(flat.get_str(paths::REPORTING_HIERARCHY), Some("F1/P1/R1"));
    }

    #[test]
    fn test_nested_extensions_recurse() {
        let flat = FlatResource::from_entry(&sample_entry());
        assert_eq!(flat.get_str(paths::OWNERSHIP), Some("Public"));
        assert_eq!(flat.get_str(paths::SETTLEMENT), Some("Urban"));
        assert_eq!(
            flat.get_bool("resource.extension.FacilityInformation.isPrimaryHealthCareUnit"),
            Some(false)
        );
    }

    #[test]
    fn test_identifiers_keyed_by_coding_code() {
        let flat = FlatResource::from_entry(&sample_entry());
        assert_eq!(flat.identifier("facilityId"), Some("FAC001"));
        assert_eq!(flat.identifier("dhisId"), Some("kJq2mPlqjzS"));

        // Null identifier values are dropped
        assert_eq!(flat.identifier("hmisCode"), None);
    }

    #[test]
    fn test_type_array_carries_display_text() {
        let flat = FlatResource::from_entry(&sample_entry());
        assert_eq!(flat.get_str(paths::FACILITY_TYPE), Some("Health Center"));
    }

    #[test]
    fn test_last_updated_parses_to_utc() {
        let flat = FlatResource::from_entry(&sample_entry());
        let ts = flat.get_datetime(paths::LAST_UPDATED).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-10T08:30:00+00:00");
    }

    #[test]
    fn test_empty_entry() {
        let flat = FlatResource::from_entry(&json!({}));
        assert!(flat.is_empty());
    }
}
