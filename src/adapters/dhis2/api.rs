//! DHIS2 access seam

use super::models::{PendingChange, StagingDisposition};
use crate::domain::errors::Dhis2Error;
use crate::domain::ids::OrgUnitId;
use crate::domain::org_unit::{OrgUnit, OrgUnitUpdate};
use async_trait::async_trait;

/// Access to the DHIS2 Web API as used by the sync
#[async_trait]
pub trait Dhis2Api: Send + Sync {
    /// Find org units carrying the given registry facility id
    ///
    /// Looks up by the configured foreign-key attribute. More than one hit
    /// is possible; for split PHCUs the base entry and its wrapper share the
    /// registry id in different forms.
    async fn find_by_facility_id(&self, facility_id: &str) -> Result<Vec<OrgUnit>, Dhis2Error>;

    /// Apply a bookkeeping update to an org unit
    async fn update_org_unit(
        &self,
        id: &OrgUnitId,
        update: &OrgUnitUpdate,
    ) -> Result<(), Dhis2Error>;

    /// Stage a substantive change for review in the datastore
    ///
    /// Idempotent per registry version: staging the same facility at the
    /// same `lastUpdated` leaves the existing entry untouched.
    async fn stage_pending_change(
        &self,
        change: &PendingChange,
    ) -> Result<StagingDisposition, Dhis2Error>;
}
