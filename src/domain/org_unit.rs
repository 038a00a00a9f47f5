//! DHIS2 organisation unit models
//!
//! Wire-shaped models for the DHIS2 Web API. An org unit carries the registry
//! foreign key and shadow copies of registry fields in its attribute list;
//! the parent pointer is embedded with its own attributes so the parent's
//! foreign key can be resolved without a second round trip.

use crate::domain::ids::{AttributeId, OrgUnitId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference to a DHIS2 metadata attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRef {
    pub id: String,
}

/// One attribute value on an org unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub attribute: AttributeRef,
    pub value: String,
}

impl AttributeValue {
    pub fn new(attribute_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: AttributeRef {
                id: attribute_id.into(),
            },
            value: value.into(),
        }
    }
}

/// Look up an attribute value by attribute id
fn find_attribute<'a>(values: &'a [AttributeValue], id: &AttributeId) -> Option<&'a str> {
    values
        .iter()
        .find(|av| av.attribute.id == id.as_str())
        .map(|av| av.value.as_str())
}

/// Rebuild an attribute list with the watermark attribute replaced
///
/// All other shadow attributes are carried through untouched; only the
/// last-updated watermark gets the new value.
pub fn with_refreshed_watermark(
    values: &[AttributeValue],
    watermark_attribute: &AttributeId,
    watermark: &str,
) -> Vec<AttributeValue> {
    values
        .iter()
        .map(|av| {
            if av.attribute.id == watermark_attribute.as_str() {
                AttributeValue::new(av.attribute.id.clone(), watermark)
            } else {
                av.clone()
            }
        })
        .collect()
}

/// Org unit geometry
///
/// Coordinates stay untyped because DHIS2 also stores polygons; only points
/// participate in reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub coordinates: Value,
}

impl Geometry {
    /// Build a point geometry from `[longitude, latitude]`
    pub fn point(lon_lat: [f64; 2]) -> Self {
        Self {
            geometry_type: "Point".to_string(),
            coordinates: serde_json::json!(lon_lat),
        }
    }

    pub fn is_point(&self) -> bool {
        self.geometry_type == "Point"
    }

    /// Coordinates as `[longitude, latitude]` when this is a point
    pub fn point_coordinates(&self) -> Option<[f64; 2]> {
        if !self.is_point() {
            return None;
        }
        let arr = self.coordinates.as_array()?;
        match (arr.first()?.as_f64(), arr.get(1)?.as_f64()) {
            (Some(lon), Some(lat)) => Some([lon, lat]),
            _ => None,
        }
    }
}

/// Parent reference embedded in an org unit response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentOrgUnit {
    pub id: OrgUnitId,

    #[serde(default, rename = "attributeValues")]
    pub attribute_values: Vec<AttributeValue>,
}

impl ParentOrgUnit {
    /// Look up an attribute value by attribute id
    pub fn attribute(&self, id: &AttributeId) -> Option<&str> {
        find_attribute(&self.attribute_values, id)
    }
}

/// One facility as known by DHIS2
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgUnit {
    pub id: OrgUnitId,

    #[serde(default)]
    pub code: Option<String>,

    pub name: String,

    #[serde(default, rename = "shortName")]
    pub short_name: Option<String>,

    #[serde(default, rename = "openingDate")]
    pub opening_date: Option<String>,

    #[serde(default, rename = "attributeValues")]
    pub attribute_values: Vec<AttributeValue>,

    #[serde(default)]
    pub parent: Option<ParentOrgUnit>,

    #[serde(default)]
    pub geometry: Option<Geometry>,
}

impl OrgUnit {
    /// Look up an attribute value by attribute id
    pub fn attribute(&self, id: &AttributeId) -> Option<&str> {
        find_attribute(&self.attribute_values, id)
    }

    /// Whether this org unit carries a non-empty code
    ///
    /// Foreign-key lookups can return placeholder entries; callers take the
    /// entry with a real code.
    pub fn has_code(&self) -> bool {
        self.code.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

/// Reference used for the parent pointer in update payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: String,
}

/// Bookkeeping update payload for an org unit
///
/// Direct updates are limited to bookkeeping fields: name, code, short name,
/// opening date, the refreshed watermark attribute, and geometry. Substantive
/// attribute changes never travel this path; they are staged for review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnitUpdate {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,

    pub attribute_values: Vec<AttributeValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn attr_id(s: &str) -> AttributeId {
        AttributeId::from_str(s).unwrap()
    }

    #[test]
    fn test_org_unit_deserialization() {
        let payload = json!({
            "id": "kJq2mPlqjzS",
            "code": "FAC001",
            "name": "Adama Health Center",
            "shortName": "Adama HC",
            "openingDate": "2010-06-15",
            "attributeValues": [
                {"attribute": {"id": "mfrIdAttr"}, "value": "F1"},
                {"attribute": {"id": "lastUpdAttr"}, "value": "2024-01-01T00:00:00Z"}
            ],
            "parent": {
                "id": "pArEnT01",
                "attributeValues": [
                    {"attribute": {"id": "mfrIdAttr"}, "value": "P1"}
                ]
            },
            "geometry": {"type": "Point", "coordinates": [39.27, 8.54]}
        });

        let unit: OrgUnit = serde_json::from_value(payload).unwrap();
        assert!(unit.has_code());
        assert_eq!(unit.attribute(&attr_id("mfrIdAttr")), Some("F1"));
        assert_eq!(
            unit.parent.as_ref().unwrap().attribute(&attr_id("mfrIdAttr")),
            Some("P1")
        );
        assert_eq!(
            unit.geometry.unwrap().point_coordinates(),
            Some([39.27, 8.54])
        );
    }

    #[test]
    fn test_org_unit_without_code() {
        let payload = json!({
            "id": "kJq2mPlqjzS",
            "name": "Placeholder"
        });
        let unit: OrgUnit = serde_json::from_value(payload).unwrap();
        assert!(!unit.has_code());
        assert!(unit.parent.is_none());
    }

    #[test]
    fn test_with_refreshed_watermark_only_touches_watermark() {
        let values = vec![
            AttributeValue::new("mfrIdAttr", "F1"),
            AttributeValue::new("lastUpdAttr", "2023-06-01T00:00:00Z"),
        ];

        let refreshed =
            with_refreshed_watermark(&values, &attr_id("lastUpdAttr"), "2024-01-01T00:00:00Z");

        assert_eq!(refreshed[0].value, "F1");
        assert_eq!(refreshed[1].value, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_geometry_point_helpers() {
        let point = Geometry::point([39.27, 8.54]);
        assert!(point.is_point());
        assert_eq!(point.point_coordinates(), Some([39.27, 8.54]));

        let polygon = Geometry {
            geometry_type: "Polygon".to_string(),
            coordinates: json!([[[0.0, 0.0], [1.0, 1.0]]]),
        };
        assert!(!polygon.is_point());
        assert!(polygon.point_coordinates().is_none());
    }

    #[test]
    fn test_update_payload_serialization() {
        let update = OrgUnitUpdate {
            name: "Adama Health Center".to_string(),
            code: Some("FAC001".to_string()),
            short_name: Some("Adama HC".to_string()),
            opening_date: NaiveDate::from_ymd_opt(2010, 6, 15),
            parent: Some(ParentRef {
                id: "pArEnT01".to_string(),
            }),
            attribute_values: vec![AttributeValue::new("lastUpdAttr", "2024-01-01T00:00:00Z")],
            geometry: Some(Geometry::point([39.27, 8.54])),
        };

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["shortName"], "Adama HC");
        assert_eq!(json["openingDate"], "2010-06-15");
        assert_eq!(json["parent"]["id"], "pArEnT01");
        assert_eq!(json["geometry"]["type"], "Point");
    }
}
