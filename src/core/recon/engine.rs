//! Reconciliation decision engine
//!
//! Takes one eligible registry record plus the org units found for it and
//! decides the outcome: a bookkeeping update applied directly, a pending
//! change staged for review, or nothing. Substantive changes never reach
//! DHIS2 without review; only bookkeeping fields travel the direct path.

use crate::adapters::dhis2::{Dhis2Api, PendingChange};
use crate::core::recon::drift::{detect_attribute_drift, detect_drift, AttributeIds};
use crate::core::recon::hierarchy::{match_parent, ParentMatch};
use crate::core::recon::outcome::{Outcome, StageReason};
use crate::core::recon::phcu::wrapper_name;
use crate::core::transform::FlatResource;
use crate::domain::facility::FacilityRecord;
use crate::domain::org_unit::{with_refreshed_watermark, Geometry, OrgUnit, OrgUnitUpdate, ParentRef};
use crate::domain::{Result, SyncError};
use chrono::SecondsFormat;
use std::sync::Arc;

/// Decision engine for a single facility record
pub struct ReconEngine {
    dhis2: Arc<dyn Dhis2Api>,
    attrs: AttributeIds,
    dry_run: bool,
}

impl ReconEngine {
    pub fn new(dhis2: Arc<dyn Dhis2Api>, attrs: AttributeIds, dry_run: bool) -> Self {
        Self {
            dhis2,
            attrs,
            dry_run,
        }
    }

    pub fn attribute_ids(&self) -> &AttributeIds {
        &self.attrs
    }

    /// Reconcile one record against the org units that carry its registry id
    ///
    /// `matches` comes from the foreign-key lookup the orchestrator already
    /// performed; `parent_is_phcu` is the registry's verdict on the record's
    /// reporting parent and only travels into staged payloads.
    pub async fn process(
        &self,
        record: &FacilityRecord,
        matches: &[OrgUnit],
        parent_is_phcu: bool,
    ) -> Result<Outcome> {
        let Some(base) = matches.iter().find(|u| u.has_code()) else {
            return self.stage(record, StageReason::NotInTarget, parent_is_phcu).await;
        };

        if !self.identifiers_agree(record, base) {
            return self
                .stage(record, StageReason::IdentifierMismatch, parent_is_phcu)
                .await;
        }

        if record.hierarchy.parent_id().is_none() {
            return self
                .stage(record, StageReason::MissingHierarchy, parent_is_phcu)
                .await;
        }

        if record.is_phcu {
            self.process_phcu(record, base, parent_is_phcu).await
        } else {
            self.process_standard(record, base, parent_is_phcu).await
        }
    }

    /// The target's code must equal the record's `facilityId` identifier,
    /// and a pre-assigned `dhisId` identifier, when present, must equal the
    /// org unit uid.
    fn identifiers_agree(&self, record: &FacilityRecord, unit: &OrgUnit) -> bool {
        if unit.code.as_deref() != record.facility_code.as_deref() {
            return false;
        }
        match record.dhis_id.as_deref() {
            Some(dhis_id) => dhis_id == unit.id.as_str(),
            None => true,
        }
    }

    async fn process_standard(
        &self,
        record: &FacilityRecord,
        base: &OrgUnit,
        parent_is_phcu: bool,
    ) -> Result<Outcome> {
        // A facility may legitimately hang under its parent's PHCU wrapper
        match match_parent(record, base, &self.attrs, true) {
            ParentMatch::NoHierarchy => {
                self.stage(record, StageReason::MissingHierarchy, parent_is_phcu)
                    .await
            }
            ParentMatch::MissingParentAttributes => {
                self.stage(record, StageReason::MissingParentAttributes, parent_is_phcu)
                    .await
            }
            parent_result => {
                let drifted = detect_drift(record, base, &self.attrs);
                if !drifted.is_empty() {
                    return self
                        .stage(record, StageReason::FieldDrift(drifted), parent_is_phcu)
                        .await;
                }

                match parent_result {
                    ParentMatch::Matched | ParentMatch::MatchedViaWrapper => {
                        let update = self.build_update(record, base, record.name.clone());
                        self.apply_update(base, &update).await?;
                        Ok(Outcome::Updated {
                            org_units: vec![base.id.clone()],
                        })
                    }
                    _ => {
                        self.stage(record, StageReason::ParentMismatch, parent_is_phcu)
                            .await
                    }
                }
            }
        }
    }

    /// A PHCU source record governs both DHIS2 entries of the split: the
    /// base health center and its `_PHCU` wrapper. Both writes are attempted
    /// at the same registry version; a failure on one side never cancels the
    /// other, and each failure is reported on its own.
    async fn process_phcu(
        &self,
        record: &FacilityRecord,
        base: &OrgUnit,
        parent_is_phcu: bool,
    ) -> Result<Outcome> {
        let wrapper_matches = self
            .dhis2
            .find_by_facility_id(&record.id.phcu_wrapper_key())
            .await?;
        let Some(wrapper) = wrapper_matches.iter().find(|u| u.has_code()) else {
            return self
                .stage(record, StageReason::PhcuWrapperMissing, parent_is_phcu)
                .await;
        };

        // The wrapper hangs directly under the real reporting parent
        match match_parent(record, wrapper, &self.attrs, false) {
            ParentMatch::NoHierarchy => {
                self.stage(record, StageReason::MissingHierarchy, parent_is_phcu)
                    .await
            }
            ParentMatch::MissingParentAttributes => {
                self.stage(record, StageReason::MissingParentAttributes, parent_is_phcu)
                    .await
            }
            parent_result => {
                // Shadow attributes are checked on both entries; the wrapper's
                // display name never matches the source by construction, so
                // only the base carries the name comparison
                let mut drifted = detect_drift(record, base, &self.attrs);
                for field in detect_attribute_drift(record, wrapper, &self.attrs) {
                    if !drifted.contains(&field) {
                        drifted.push(field);
                    }
                }
                if !drifted.is_empty() {
                    return self
                        .stage(record, StageReason::FieldDrift(drifted), parent_is_phcu)
                        .await;
                }

                match parent_result {
                    ParentMatch::Matched => {
                        let base_update = self.build_update(record, base, record.name.clone());
                        let wrapper_update =
                            self.build_update(record, wrapper, wrapper_name(&record.name));

                        let base_result = self.apply_update(base, &base_update).await;
                        let wrapper_result = self.apply_update(wrapper, &wrapper_update).await;

                        let mut failures = Vec::new();
                        if let Err(e) = &base_result {
                            tracing::error!(
                                org_unit = base.id.as_str(),
                                error = %e,
                                "Base org unit update failed"
                            );
                            failures.push(format!("base {}: {}", base.id, e));
                        }
                        if let Err(e) = &wrapper_result {
                            tracing::error!(
                                org_unit = wrapper.id.as_str(),
                                error = %e,
                                "Wrapper org unit update failed"
                            );
                            failures.push(format!("wrapper {}: {}", wrapper.id, e));
                        }
                        if !failures.is_empty() {
                            return Err(SyncError::Reconciliation(failures.join("; ")));
                        }

                        Ok(Outcome::Updated {
                            org_units: vec![base.id.clone(), wrapper.id.clone()],
                        })
                    }
                    _ => {
                        self.stage(record, StageReason::ParentMismatch, parent_is_phcu)
                            .await
                    }
                }
            }
        }
    }

    /// Assemble the bookkeeping update for one org unit
    ///
    /// Keeps the target's code, short name, and parent pointer; refreshes
    /// name, opening date, and the watermark attribute from the registry.
    /// Geometry is refreshed only when the target's geometry is a point or
    /// absent; polygons are left alone.
    fn build_update(&self, record: &FacilityRecord, unit: &OrgUnit, name: String) -> OrgUnitUpdate {
        let watermark = record
            .last_updated
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let geometry = match (&unit.geometry, &record.position) {
            (Some(existing), Some(position)) if existing.is_point() => {
                Some(Geometry::point(position.lon_lat()))
            }
            (None, Some(position)) => Some(Geometry::point(position.lon_lat())),
            _ => None,
        };

        OrgUnitUpdate {
            name,
            code: unit.code.clone(),
            short_name: unit.short_name.clone(),
            opening_date: record.year_opened,
            parent: unit.parent.as_ref().map(|p| ParentRef {
                id: p.id.to_string(),
            }),
            attribute_values: with_refreshed_watermark(
                &unit.attribute_values,
                &self.attrs.last_updated,
                &watermark,
            ),
            geometry,
        }
    }

    async fn apply_update(&self, unit: &OrgUnit, update: &OrgUnitUpdate) -> Result<()> {
        if self.dry_run {
            tracing::info!(
                org_unit = unit.id.as_str(),
                name = %update.name,
                "Dry run: skipping org unit update"
            );
            return Ok(());
        }
        self.dhis2.update_org_unit(&unit.id, update).await?;
        Ok(())
    }

    async fn stage(
        &self,
        record: &FacilityRecord,
        reason: StageReason,
        parent_is_phcu: bool,
    ) -> Result<Outcome> {
        if self.dry_run {
            tracing::info!(
                facility_id = record.id.as_str(),
                reason = %reason,
                "Dry run: skipping staging"
            );
            return Ok(Outcome::Staged { reason });
        }

        let mut payload = FlatResource::from_entry(&record.raw).to_value();
        if let Some(map) = payload.as_object_mut() {
            map.insert("isParentPhcu".to_string(), serde_json::json!(parent_is_phcu));
        }

        let change = PendingChange {
            key: record.id.clone(),
            last_updated: record.last_updated,
            reason: reason.to_string(),
            record: payload,
        };

        let disposition = self.dhis2.stage_pending_change(&change).await?;
        tracing::info!(
            facility_id = record.id.as_str(),
            reason = %reason,
            disposition = ?disposition,
            "Record routed to review"
        );

        Ok(Outcome::Staged { reason })
    }
}
