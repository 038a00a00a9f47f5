//! Registry access seam
//!
//! The reconciliation core talks to the master facility registry through this
//! trait so tests can run against an in-memory implementation.

use super::models::FacilityPage;
use crate::domain::errors::RegistryError;
use crate::domain::facility::FacilityRecord;
use crate::domain::ids::FacilityId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read access to the master facility registry
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Fetch the first page of facilities updated strictly after `since`
    ///
    /// Results are sorted ascending by `lastUpdated`, so page processing
    /// order matches the watermark timeline.
    async fn fetch_updated_since(
        &self,
        since: DateTime<Utc>,
        page_size: usize,
    ) -> Result<FacilityPage, RegistryError>;

    /// Fetch a follow-up page via the server-provided next link
    async fn fetch_page(&self, next_url: &str) -> Result<FacilityPage, RegistryError>;

    /// Fetch a single facility by registry id
    async fn fetch_facility(&self, id: &FacilityId) -> Result<FacilityRecord, RegistryError>;

    /// Whether the given facility is a primary health care unit
    ///
    /// Callers treat a lookup failure as "not a PHCU"; the flag only widens
    /// matching and must never block a sync.
    async fn is_phcu(&self, id: &FacilityId) -> Result<bool, RegistryError>;
}
