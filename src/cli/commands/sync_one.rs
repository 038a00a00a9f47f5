//! Single facility sync command implementation
//!
//! This module implements the `sync-facility` command for reconciling one
//! facility by its registry id, outside a full run.

use crate::config::load_config;
use crate::core::sync::summary::outcome_label;
use crate::core::sync::SyncOrchestrator;
use crate::domain::ids::FacilityId;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the sync-facility command
#[derive(Args, Debug)]
pub struct SyncFacilityArgs {
    /// Registry id of the facility to reconcile
    #[arg(long)]
    pub facility_id: String,

    /// Dry run mode - decide the outcome without writing to DHIS2
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncFacilityArgs {
    /// Execute the sync-facility command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(facility_id = %self.facility_id, "Starting single facility sync");

        let mut config = load_config(config_path)?;

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        let facility_id = match FacilityId::new(&self.facility_id) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("Invalid facility id: {e}");
                return Ok(2);
            }
        };

        // The single-facility path never touches the watermark, so the
        // shutdown channel is unused here
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let orchestrator = match SyncOrchestrator::from_config(&config, shutdown_rx) {
            Ok(o) => o,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create sync orchestrator");
                eprintln!("Failed to initialize sync: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        match orchestrator.sync_single(&facility_id).await {
            Ok(outcome) => {
                println!(
                    "✅ Facility {}: {}",
                    facility_id.as_str(),
                    outcome_label(&outcome)
                );
                Ok(0)
            }
            Err(e) => {
                tracing::error!(facility_id = facility_id.as_str(), error = %e, "Facility sync failed");
                eprintln!("Facility sync failed: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_facility_args() {
        let args = SyncFacilityArgs {
            facility_id: "F123".to_string(),
            dry_run: true,
        };

        assert_eq!(args.facility_id, "F123");
        assert!(args.dry_run);
    }
}
