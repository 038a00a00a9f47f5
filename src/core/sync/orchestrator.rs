//! Sync orchestrator - main driver of a reconciliation run
//!
//! This module walks the registry's updated-since pages, runs each eligible
//! record through the reconciliation engine, and checkpoints the watermark
//! after every page so an interrupted run resumes where it left off.

use crate::adapters::dhis2::Dhis2Api;
use crate::adapters::registry::RegistryApi;
use crate::config::SyncConfig;
use crate::core::recon::{Outcome, ReconEngine};
use crate::core::state::{StateStore, SyncStatus, Watermark};
use crate::core::sync::report::{
    JobReporter, PROGRESS_PAGE_COMPLETE, PROGRESS_PAGE_FETCHED, PROGRESS_PAGE_MIDPOINT,
};
use crate::core::sync::summary::{SyncIssue, SyncIssueType, SyncSummary};
use crate::domain::facility::FacilityRecord;
use crate::domain::ids::FacilityId;
use crate::domain::org_unit::OrgUnit;
use crate::domain::{Result, SyncError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Sync orchestrator
pub struct SyncOrchestrator {
    registry: Arc<dyn RegistryApi>,
    dhis2: Arc<dyn Dhis2Api>,
    state: Arc<dyn StateStore>,
    engine: ReconEngine,
    reporter: Arc<dyn JobReporter>,
    sync_config: SyncConfig,
    shutdown: Option<watch::Receiver<bool>>,
}

impl SyncOrchestrator {
    pub fn new(
        registry: Arc<dyn RegistryApi>,
        dhis2: Arc<dyn Dhis2Api>,
        state: Arc<dyn StateStore>,
        engine: ReconEngine,
        reporter: Arc<dyn JobReporter>,
        sync_config: SyncConfig,
    ) -> Self {
        Self {
            registry,
            dhis2,
            state,
            engine,
            reporter,
            sync_config,
            shutdown: None,
        }
    }

    /// Wire up an orchestrator against the real registry and DHIS2 clients
    pub fn from_config(
        config: &crate::config::FacsyncConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let registry = Arc::new(crate::adapters::registry::RegistryClient::new(
            &config.registry,
        )?);
        let dhis2 = Arc::new(crate::adapters::dhis2::Dhis2Client::new(&config.dhis2)?);
        let state = Arc::new(crate::core::state::FileStateStore::new(&config.state.path));
        let attrs = crate::core::recon::AttributeIds::from_config(&config.dhis2.attributes)?;
        let engine = ReconEngine::new(dhis2.clone(), attrs, config.application.dry_run);

        Ok(Self::new(
            registry,
            dhis2,
            state,
            engine,
            Arc::new(crate::core::sync::report::TracingReporter),
            config.sync.clone(),
        )
        .with_shutdown(shutdown))
    }

    /// Attach a shutdown signal; the run stops at the next page boundary
    /// once the signal flips to true.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Execute an incremental sync run
    ///
    /// 1. Loads the watermark (or starts from the lookback window)
    /// 2. Pages through registry records updated since the watermark
    /// 3. Reconciles each eligible record
    /// 4. Advances and persists the watermark after every page
    /// 5. Produces a summary report
    pub async fn run(&self) -> Result<SyncSummary> {
        let start_time = Instant::now();
        let mut summary = SyncSummary::new();

        let mut watermark = match self.state.load().await? {
            Some(wm) => {
                tracing::info!(
                    last_synced = wm.last_synced_at.map(|t| t.to_rfc3339()),
                    "Loaded existing watermark - incremental sync"
                );
                wm
            }
            None => {
                tracing::info!(
                    lookback_days = self.sync_config.lookback_days,
                    "No watermark found - starting from lookback window"
                );
                Watermark::new()
            }
        };

        let since = watermark.since(self.sync_config.lookback_days);
        watermark.mark_started();
        self.state.save(&watermark).await?;

        tracing::info!(
            since = %since.to_rfc3339(),
            page_size = self.sync_config.page_size,
            "Starting sync run"
        );

        let mut page = match self
            .registry
            .fetch_updated_since(since, self.sync_config.page_size)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                summary.add_error(SyncIssue::new(SyncIssueType::Registry, e.to_string()));
                watermark.mark_failed();
                self.state.save(&watermark).await?;
                return Ok(summary.with_duration(start_time.elapsed()));
            }
        };

        loop {
            let page_number = summary.pages + 1;
            let page_records = page.records.len();
            summary.total_fetched += page_records;
            self.reporter.progress(page_number, PROGRESS_PAGE_FETCHED);

            let mut page_high_water: Option<DateTime<Utc>> = None;

            for (index, record) in page.records.iter().enumerate() {
                if page_records > 1 && index == page_records / 2 {
                    self.reporter.progress(page_number, PROGRESS_PAGE_MIDPOINT);
                }
                match self.process_record(record).await {
                    Ok(outcome) => {
                        self.reporter.record_processed(&record.id, &outcome);
                        summary.record_outcome(&outcome);
                        page_high_water = Some(match page_high_water {
                            Some(existing) => existing.max(record.last_updated),
                            None => record.last_updated,
                        });
                    }
                    Err(e) => {
                        tracing::error!(
                            facility_id = record.id.as_str(),
                            error = %e,
                            "Failed to process facility, aborting run"
                        );
                        summary.add_error(
                            SyncIssue::new(issue_type_for(&e), e.to_string())
                                .with_context(format!("facility_id={}", record.id.as_str())),
                        );
                        watermark.mark_failed();
                        self.state.save(&watermark).await?;
                        summary.watermark = watermark.last_synced_at;
                        let summary = summary.with_duration(start_time.elapsed());
                        self.reporter.run_completed(&summary);
                        return Ok(summary);
                    }
                }
            }

            // Checkpoint: the watermark only ever moves forward
            if let Some(high_water) = page_high_water {
                watermark.advance_to(high_water);
            }
            watermark.record_processed(page_records as u64);
            self.state.save(&watermark).await?;

            summary.pages = page_number;
            self.reporter.progress(page_number, PROGRESS_PAGE_COMPLETE);
            self.reporter.page_completed(page_number, page_records);

            if self.shutdown_requested() {
                tracing::info!("Shutdown requested, stopping after page checkpoint");
                summary.interrupted = true;
                break;
            }

            let Some(next_url) = page.next_url.clone() else {
                break;
            };

            page = match self.registry.fetch_page(&next_url).await {
                Ok(page) => page,
                Err(e) => {
                    summary.add_error(SyncIssue::new(SyncIssueType::Registry, e.to_string()));
                    watermark.mark_failed();
                    self.state.save(&watermark).await?;
                    summary.watermark = watermark.last_synced_at;
                    let summary = summary.with_duration(start_time.elapsed());
                    self.reporter.run_completed(&summary);
                    return Ok(summary);
                }
            };
        }

        watermark.mark_completed();
        self.state.save(&watermark).await?;

        summary.watermark = watermark.last_synced_at;
        let summary = summary.with_duration(start_time.elapsed());
        self.reporter.run_completed(&summary);

        Ok(summary)
    }

    /// Reconcile a single facility by id, outside any run
    ///
    /// Fetches the record directly from the registry and pushes it through
    /// the same decision machine as a full run. The watermark is untouched.
    pub async fn sync_single(&self, facility_id: &FacilityId) -> Result<Outcome> {
        let record = self.registry.fetch_facility(facility_id).await?;
        let outcome = self.process_record(&record).await?;
        self.reporter.record_processed(&record.id, &outcome);
        Ok(outcome)
    }

    /// Run one record through eligibility, lookup, fast path, and the engine
    async fn process_record(&self, record: &FacilityRecord) -> Result<Outcome> {
        if let Err(reason) = record.eligibility() {
            tracing::debug!(
                facility_id = record.id.as_str(),
                reason = %reason,
                "Skipping ineligible facility"
            );
            return Ok(Outcome::Ineligible(reason));
        }

        let matches = self.dhis2.find_by_facility_id(record.id.as_str()).await?;

        // Fast path: the stored registry version already matches the source
        if self.stored_version_current(record, &matches) {
            return Ok(Outcome::UpToDate);
        }

        let parent_is_phcu = self.parent_is_phcu(record).await;
        self.engine.process(record, &matches, parent_is_phcu).await
    }

    /// True when the coded match's watermark attribute parses to the same
    /// instant as the record's registry timestamp.
    fn stored_version_current(&self, record: &FacilityRecord, matches: &[OrgUnit]) -> bool {
        let Some(unit) = matches.iter().find(|u| u.has_code()) else {
            return false;
        };
        let Some(stored) = unit.attribute(&self.engine.attribute_ids().last_updated) else {
            return false;
        };
        match DateTime::parse_from_rfc3339(stored) {
            Ok(stored) => stored.with_timezone(&Utc) == record.last_updated,
            Err(_) => false,
        }
    }

    /// Ask the registry whether the reporting parent is a PHCU. A registry
    /// failure here answers false rather than aborting the record.
    async fn parent_is_phcu(&self, record: &FacilityRecord) -> bool {
        let Some(parent_id) = record.hierarchy.parent_id() else {
            return false;
        };
        match self.registry.is_phcu(parent_id).await {
            Ok(is_phcu) => is_phcu,
            Err(e) => {
                tracing::warn!(
                    facility_id = record.id.as_str(),
                    parent_id = parent_id.as_str(),
                    error = %e,
                    "Could not determine parent PHCU status, assuming false"
                );
                false
            }
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false)
    }

    /// Read-only view of the persisted watermark, for status reporting
    pub async fn current_watermark(&self) -> Result<Option<Watermark>> {
        self.state.load().await
    }
}

fn issue_type_for(error: &SyncError) -> SyncIssueType {
    match error {
        SyncError::Registry(_) => SyncIssueType::Registry,
        SyncError::Dhis2(_) => SyncIssueType::Dhis2,
        SyncError::State(_) => SyncIssueType::State,
        SyncError::Configuration(_) => SyncIssueType::Configuration,
        _ => SyncIssueType::Unknown,
    }
}

/// Format a watermark for the status command
pub fn describe_watermark(watermark: &Option<Watermark>) -> String {
    match watermark {
        None => "no sync has run yet".to_string(),
        Some(wm) => {
            let last_synced = wm
                .last_synced_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".to_string());
            let status = match wm.last_run_status {
                SyncStatus::NotStarted => "not started",
                SyncStatus::InProgress => "in progress",
                SyncStatus::Completed => "completed",
                SyncStatus::Failed => "failed",
            };
            format!(
                "watermark: {last_synced}, records processed: {}, last run: {status}",
                wm.records_processed
            )
        }
    }
}
