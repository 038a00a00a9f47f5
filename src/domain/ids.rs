//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow between the registry and
//! DHIS2. Each type ensures type safety and rejects empty values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MFR facility identifier newtype wrapper
///
/// The stable id the master facility registry assigns to a Location resource.
/// This is the foreign key stored on DHIS2 org units.
///
/// # Examples
///
/// ```
/// use facsync::domain::ids::FacilityId;
/// use std::str::FromStr;
///
/// let id = FacilityId::from_str("c7f0d2a8-3b11-4f4e-9a2e-8f0f6f1f2a33").unwrap();
/// assert_eq!(id.as_str(), "c7f0d2a8-3b11-4f4e-9a2e-8f0f6f1f2a33");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacilityId(String);

impl FacilityId {
    /// Creates a new FacilityId from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Facility ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the facility ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The synthetic foreign key of this facility's PHCU wrapper entry
    ///
    /// A primary health care unit is represented in DHIS2 by two linked org
    /// units; the parent wrapper is keyed by `"<id>_PHCU"`.
    pub fn phcu_wrapper_key(&self) -> String {
        format!("{}_PHCU", self.0)
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FacilityId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for FacilityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// DHIS2 organisation unit identifier newtype wrapper
///
/// Assigned by DHIS2, distinct from the registry's facility id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrgUnitId(String);

impl OrgUnitId {
    /// Creates a new OrgUnitId from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Org unit ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the org unit ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OrgUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrgUnitId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for OrgUnitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// DHIS2 attribute identifier newtype wrapper
///
/// Identifies one of the metadata attributes used as shadow copies of
/// registry fields (foreign key, watermark, ownership, settlement, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeId(String);

impl AttributeId {
    /// Creates a new AttributeId from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Attribute ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the attribute ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AttributeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for AttributeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facility_id_creation() {
        let id = FacilityId::new("c7f0d2a8-3b11-4f4e-9a2e-8f0f6f1f2a33").unwrap();
        assert_eq!(id.as_str(), "c7f0d2a8-3b11-4f4e-9a2e-8f0f6f1f2a33");
    }

    #[test]
    fn test_facility_id_empty_fails() {
        assert!(FacilityId::new("").is_err());
        assert!(FacilityId::new("   ").is_err());
    }

    #[test]
    fn test_facility_id_display() {
        let id = FacilityId::new("F1").unwrap();
        assert_eq!(format!("{}", id), "F1");
    }

    #[test]
    fn test_facility_id_from_str() {
        let id: FacilityId = "F1".parse().unwrap();
        assert_eq!(id.as_str(), "F1");
    }

    #[test]
    fn test_phcu_wrapper_key() {
        let id = FacilityId::new("F1").unwrap();
        assert_eq!(id.phcu_wrapper_key(), "F1_PHCU");
    }

    #[test]
    fn test_org_unit_id_creation() {
        let id = OrgUnitId::new("kJq2mPlqjzS").unwrap();
        assert_eq!(id.as_str(), "kJq2mPlqjzS");
    }

    #[test]
    fn test_org_unit_id_empty_fails() {
        assert!(OrgUnitId::new("").is_err());
    }

    #[test]
    fn test_attribute_id_creation() {
        let id = AttributeId::new("Gkv4HVVLVlN").unwrap();
        assert_eq!(id.as_str(), "Gkv4HVVLVlN");
    }

    #[test]
    fn test_facility_id_serialization() {
        let id = FacilityId::new("F1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: FacilityId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
