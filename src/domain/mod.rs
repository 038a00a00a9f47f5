//! Domain models and types for Facsync.
//!
//! This module contains the core domain models, types, and business rules for
//! Facsync. All types follow the newtype and explicit-error conventions used
//! throughout the crate.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`FacilityId`], [`OrgUnitId`], [`AttributeId`])
//! - **Registry-side models** ([`FacilityRecord`], [`HierarchyPath`], [`GeoPoint`])
//! - **Target-side models** ([`OrgUnit`], [`OrgUnitUpdate`], [`Geometry`])
//! - **Error types** ([`SyncError`], [`RegistryError`], [`Dhis2Error`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Facsync uses the newtype pattern for identifiers to prevent mixing the
//! registry's facility ids with DHIS2 org unit uids:
//!
//! ```rust
//! use facsync::domain::{FacilityId, OrgUnitId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let facility_id = FacilityId::new("c7f0c66c-d2ac-45fe-a8f1-37f7d8c21e33")?;
//! let org_unit_id = OrgUnitId::new("kJq2mPlqjzS")?;
//!
//! // This won't compile - type safety prevents mixing IDs
//! // let wrong: FacilityId = org_unit_id;  // Compile error!
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SyncError>`]:
//!
//! ```no_run
//! use facsync::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let config = facsync::config::load_config("facsync.toml")?;
//!     println!("{}", config.registry.base_url);
//!     Ok(())
//! }
//! # example().ok();
//! ```

pub mod errors;
pub mod facility;
pub mod ids;
pub mod org_unit;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{Dhis2Error, RegistryError, SyncError};
pub use facility::{
    FacilityRecord, GeoPoint, HierarchyPath, SkipReason, IDENTIFIER_DHIS_ID,
    IDENTIFIER_FACILITY_ID, STATUS_DUPLICATE,
};
pub use ids::{AttributeId, FacilityId, OrgUnitId};
pub use org_unit::{
    with_refreshed_watermark, AttributeRef, AttributeValue, Geometry, OrgUnit, OrgUnitUpdate,
    ParentOrgUnit, ParentRef,
};
pub use result::Result;
