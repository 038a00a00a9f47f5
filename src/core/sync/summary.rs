//! Sync summary and reporting
//!
//! This module defines structures for tracking and reporting sync results.

use crate::core::recon::Outcome;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Summary of a sync run
#[derive(Debug, Clone)]
pub struct SyncSummary {
    /// Total number of records fetched from the registry
    pub total_fetched: usize,

    /// Number of pages consumed
    pub pages: usize,

    /// Records whose bookkeeping update was applied
    pub updated: usize,

    /// Records routed to the review queue
    pub staged: usize,

    /// Records already at the stored registry version
    pub up_to_date: usize,

    /// Records skipped before reconciliation
    pub ineligible: usize,

    /// Watermark after the run, if it advanced
    pub watermark: Option<DateTime<Utc>>,

    /// Duration of the run
    pub duration: Duration,

    /// True when a shutdown signal stopped the run early
    pub interrupted: bool,

    /// Errors encountered during the run
    pub errors: Vec<SyncIssue>,
}

impl SyncSummary {
    /// Create a new empty sync summary
    pub fn new() -> Self {
        Self {
            total_fetched: 0,
            pages: 0,
            updated: 0,
            staged: 0,
            up_to_date: 0,
            ineligible: 0,
            watermark: None,
            duration: Duration::from_secs(0),
            interrupted: false,
            errors: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Tally one reconciliation outcome
    pub fn record_outcome(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Updated { .. } => self.updated += 1,
            Outcome::Staged { .. } => self.staged += 1,
            Outcome::UpToDate => self.up_to_date += 1,
            Outcome::Ineligible(_) => self.ineligible += 1,
        }
    }

    /// Add an error
    pub fn add_error(&mut self, error: SyncIssue) {
        self.errors.push(error);
    }

    /// Check if the run completed without errors
    pub fn is_successful(&self) -> bool {
        self.errors.is_empty()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_fetched = self.total_fetched,
            pages = self.pages,
            updated = self.updated,
            staged = self.staged,
            up_to_date = self.up_to_date,
            ineligible = self.ineligible,
            watermark = self.watermark.map(|w| w.to_rfc3339()),
            duration_secs = self.duration.as_secs(),
            "Sync completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(error_count = self.errors.len(), "Sync completed with errors");
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.issue_type,
                    message = %error.message,
                    context = error.context.as_deref(),
                    "Sync error"
                );
            }
        }
    }
}

impl Default for SyncSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of sync issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncIssueType {
    /// Registry fetch or lookup error
    Registry,
    /// DHIS2 query, update, or staging error
    Dhis2,
    /// Watermark persistence error
    State,
    /// Configuration error
    Configuration,
    /// Anything else
    Unknown,
}

/// Sync error with context
#[derive(Debug, Clone)]
pub struct SyncIssue {
    /// Type of issue
    pub issue_type: SyncIssueType,

    /// Error message
    pub message: String,

    /// Optional context (e.g., facility id)
    pub context: Option<String>,
}

impl SyncIssue {
    /// Create a new sync issue
    pub fn new(issue_type: SyncIssueType, message: String) -> Self {
        Self {
            issue_type,
            message,
            context: None,
        }
    }

    /// Add context to the issue
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}

/// Human-oriented label for an outcome, used by per-record reporting
pub fn outcome_label(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Updated { org_units } => format!("updated {} org unit(s)", org_units.len()),
        Outcome::Staged { reason } => format!("staged for review ({reason})"),
        Outcome::UpToDate => "up to date".to_string(),
        Outcome::Ineligible(reason) => format!("skipped ({reason})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recon::StageReason;
    use crate::domain::facility::SkipReason;
    use crate::domain::ids::OrgUnitId;

    #[test]
    fn test_sync_summary_creation() {
        let summary = SyncSummary::new();

        assert_eq!(summary.total_fetched, 0);
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.staged, 0);
        assert_eq!(summary.up_to_date, 0);
        assert_eq!(summary.ineligible, 0);
        assert!(summary.watermark.is_none());
        assert!(summary.errors.is_empty());
        assert!(summary.is_successful());
    }

    #[test]
    fn test_record_outcome_tallies() {
        let mut summary = SyncSummary::new();

        summary.record_outcome(&Outcome::Updated {
            org_units: vec![OrgUnitId::new("kJq2mPlqjzS").unwrap()],
        });
        summary.record_outcome(&Outcome::UpToDate);
        summary.record_outcome(&Outcome::UpToDate);
        summary.record_outcome(&Outcome::Staged {
            reason: StageReason::NotInTarget,
        });
        summary.record_outcome(&Outcome::Ineligible(SkipReason::MissingFacilityCode));

        assert_eq!(summary.updated, 1);
        assert_eq!(summary.up_to_date, 2);
        assert_eq!(summary.staged, 1);
        assert_eq!(summary.ineligible, 1);
    }

    #[test]
    fn test_sync_issue_with_context() {
        let issue = SyncIssue::new(SyncIssueType::Dhis2, "update failed".to_string())
            .with_context("facility_id=F1".to_string());

        assert_eq!(issue.issue_type, SyncIssueType::Dhis2);
        assert_eq!(issue.context.as_deref(), Some("facility_id=F1"));
    }

    #[test]
    fn test_is_successful_with_errors() {
        let mut summary = SyncSummary::new();
        summary.add_error(SyncIssue::new(
            SyncIssueType::Registry,
            "connection refused".to_string(),
        ));
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_outcome_label_field_drift() {
        let label = outcome_label(&Outcome::Staged {
            reason: StageReason::FieldDrift(vec!["name".into(), "ownership".into()]),
        });
        assert_eq!(label, "staged for review (field drift: name, ownership)");
    }
}
