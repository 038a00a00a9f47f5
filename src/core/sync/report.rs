//! Per-record progress reporting
//!
//! The orchestrator reports each reconciliation outcome through this seam so
//! callers can observe a run without parsing logs. The default reporter just
//! writes structured log lines.

use crate::core::recon::Outcome;
use crate::core::sync::summary::{outcome_label, SyncSummary};
use crate::domain::ids::FacilityId;

/// Percent reported once a page has been fetched
pub const PROGRESS_PAGE_FETCHED: u8 = 40;
/// Percent reported halfway through a page's records
pub const PROGRESS_PAGE_MIDPOINT: u8 = 70;
/// Percent reported after a page's watermark checkpoint
pub const PROGRESS_PAGE_COMPLETE: u8 = 100;

/// Observer for sync progress
pub trait JobReporter: Send + Sync {
    /// Called once per reconciled record
    fn record_processed(&self, facility_id: &FacilityId, outcome: &Outcome);

    /// Called at the fixed percentage milestones within a page
    fn progress(&self, page: usize, percent: u8);

    /// Called after each page's watermark checkpoint
    fn page_completed(&self, page: usize, records: usize);

    /// Called once when the run finishes
    fn run_completed(&self, summary: &SyncSummary);
}

/// Reporter that emits structured log lines
pub struct TracingReporter;

impl JobReporter for TracingReporter {
    fn record_processed(&self, facility_id: &FacilityId, outcome: &Outcome) {
        tracing::info!(
            facility_id = facility_id.as_str(),
            outcome = %outcome_label(outcome),
            "Processed facility"
        );
    }

    fn progress(&self, page: usize, percent: u8) {
        tracing::debug!(page, percent, "Sync progress");
    }

    fn page_completed(&self, page: usize, records: usize) {
        tracing::debug!(page, records, "Page checkpoint saved");
    }

    fn run_completed(&self, summary: &SyncSummary) {
        summary.log_summary();
    }
}
