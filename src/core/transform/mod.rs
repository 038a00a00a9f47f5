//! Resource transformation
//!
//! Flattening of FHIR Location resources into dot-keyed fields consumed by
//! the registry adapter.

pub mod remap;

pub use remap::{paths, FlatResource};
