//! Master facility registry adapter
//!
//! FHIR client and wire models for the registry side of the sync.

pub mod api;
pub mod client;
pub mod models;

pub use api::RegistryApi;
pub use client::RegistryClient;
pub use models::{facility_from_entry, Bundle, FacilityPage};
