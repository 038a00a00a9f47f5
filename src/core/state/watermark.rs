//! Watermark model for tracking sync state
//!
//! This module defines the watermark structure used to track how far the
//! incremental sync has progressed against the facility registry's
//! `lastUpdated` timeline.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Sync status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Sync is in progress
    InProgress,
    /// Sync completed successfully
    Completed,
    /// Sync failed with an error
    Failed,
    /// Sync was never started
    NotStarted,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Watermark for tracking incremental sync progress
///
/// The watermark records the registry `lastUpdated` timestamp of the most
/// recent page that was fully processed. It only ever moves forward; a run
/// that fails mid-way leaves the watermark at the last completed page so the
/// next run resumes from there.
///
/// # Examples
///
/// ```
/// use facsync::core::state::watermark::{SyncStatus, Watermark};
/// use chrono::{TimeZone, Utc};
///
/// let mut watermark = Watermark::new();
/// assert_eq!(watermark.last_run_status, SyncStatus::NotStarted);
///
/// let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
/// assert!(watermark.advance_to(ts));
/// assert!(!watermark.advance_to(ts - chrono::Duration::days(1)));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Watermark {
    /// Registry `lastUpdated` timestamp of the newest fully processed page
    pub last_synced_at: Option<DateTime<Utc>>,

    /// Total count of records processed across all runs
    pub records_processed: u64,

    /// Timestamp when the last run started
    pub last_run_started_at: Option<DateTime<Utc>>,

    /// Timestamp when the last run completed (None if still in progress)
    pub last_run_completed_at: Option<DateTime<Utc>>,

    /// Status of the last run
    #[serde(default)]
    pub last_run_status: SyncStatus,
}

impl Watermark {
    /// Create an empty watermark for a registry that has never been synced
    pub fn new() -> Self {
        Self {
            last_synced_at: None,
            records_processed: 0,
            last_run_started_at: None,
            last_run_completed_at: None,
            last_run_status: SyncStatus::NotStarted,
        }
    }

    /// Resolve the starting point for the next incremental fetch
    ///
    /// Falls back to `now - lookback_days` when no page has ever been
    /// processed.
    pub fn since(&self, lookback_days: i64) -> DateTime<Utc> {
        self.last_synced_at
            .unwrap_or_else(|| Utc::now() - Duration::days(lookback_days))
    }

    /// Advance the watermark to a newer timestamp
    ///
    /// Returns `false` and leaves the watermark untouched when `timestamp`
    /// does not move it forward. The watermark never regresses.
    pub fn advance_to(&mut self, timestamp: DateTime<Utc>) -> bool {
        match self.last_synced_at {
            Some(current) if timestamp <= current => false,
            _ => {
                self.last_synced_at = Some(timestamp);
                true
            }
        }
    }

    /// Check if this watermark indicates a run is currently in progress
    pub fn is_in_progress(&self) -> bool {
        self.last_run_status == SyncStatus::InProgress
    }

    /// Get the duration of the last run if it completed
    pub fn last_run_duration(&self) -> Option<chrono::Duration> {
        match (self.last_run_started_at, self.last_run_completed_at) {
            (Some(started), Some(completed)) => Some(completed - started),
            _ => None,
        }
    }

    /// Mark a run as started
    pub fn mark_started(&mut self) {
        self.last_run_started_at = Some(Utc::now());
        self.last_run_completed_at = None;
        self.last_run_status = SyncStatus::InProgress;
    }

    /// Mark the run as completed
    pub fn mark_completed(&mut self) {
        self.last_run_completed_at = Some(Utc::now());
        self.last_run_status = SyncStatus::Completed;
    }

    /// Mark the run as failed
    pub fn mark_failed(&mut self) {
        self.last_run_completed_at = Some(Utc::now());
        self.last_run_status = SyncStatus::Failed;
    }

    /// Record a batch of processed records
    pub fn record_processed(&mut self, count: u64) {
        self.records_processed += count;
    }
}

impl Default for Watermark {
    fn default() -> Self {
        Self::new()
    }
}
