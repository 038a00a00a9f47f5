//! Reconciliation decisions
//!
//! Every record ends in exactly one of these outcomes; the orchestrator
//! tallies them into the run summary and the engine logs the path taken.

use crate::domain::facility::SkipReason;
use crate::domain::ids::OrgUnitId;

/// Why a record was staged for review instead of updated in place
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageReason {
    /// No org unit carries this registry id
    NotInTarget,
    /// The target's code or pre-assigned id disagrees with the record
    IdentifierMismatch,
    /// The record has no resolvable reporting parent
    MissingHierarchy,
    /// The target's parent carries no registry id to compare against
    MissingParentAttributes,
    /// The target's parent points at a different registry facility
    ParentMismatch,
    /// One or more shadow fields drifted from the registry values
    FieldDrift(Vec<String>),
    /// Source is a PHCU but no wrapper org unit exists
    PhcuWrapperMissing,
}

impl std::fmt::Display for StageReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageReason::NotInTarget => write!(f, "facility not present in DHIS2"),
            StageReason::IdentifierMismatch => write!(f, "identifier mismatch with DHIS2 entry"),
            StageReason::MissingHierarchy => write!(f, "no reporting parent in registry record"),
            StageReason::MissingParentAttributes => {
                write!(f, "DHIS2 parent carries no registry id attribute")
            }
            StageReason::ParentMismatch => write!(f, "DHIS2 parent differs from reporting parent"),
            StageReason::FieldDrift(fields) => {
                write!(f, "field drift: {}", fields.join(", "))
            }
            StageReason::PhcuWrapperMissing => write!(f, "PHCU wrapper org unit missing"),
        }
    }
}

/// Final disposition of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Bookkeeping update applied to the listed org units
    Updated { org_units: Vec<OrgUnitId> },
    /// Change staged in the datastore for review
    Staged { reason: StageReason },
    /// Target already carries this registry version
    UpToDate,
    /// Record failed the eligibility pre-filter
    Ineligible(SkipReason),
}
