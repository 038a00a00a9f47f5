//! Reconciliation core
//!
//! The decision machine that turns a registry record plus its DHIS2 matches
//! into an outcome. Drift detection, hierarchy matching, and the PHCU split
//! each live in their own module; the engine ties them together.

pub mod drift;
pub mod engine;
pub mod hierarchy;
pub mod outcome;
pub mod phcu;

pub use drift::{detect_drift, AttributeIds};
pub use engine::ReconEngine;
pub use hierarchy::{match_parent, ParentMatch};
pub use outcome::{Outcome, StageReason};
pub use phcu::wrapper_name;
