//! Sync command implementation
//!
//! This module implements the `sync` command for running an incremental
//! reconciliation of registry facilities against DHIS2.

use crate::config::load_config;
use crate::core::sync::{describe_watermark, SyncOrchestrator};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - decide outcomes without writing to DHIS2
    #[arg(long)]
    pub dry_run: bool,

    /// Override the lookback window in days for the first run
    #[arg(long)]
    pub lookback_days: Option<i64>,

    /// Override the registry page size
    #[arg(long)]
    pub page_size: Option<usize>,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting sync command");

        let mut config = load_config(config_path)?;

        if let Some(lookback_days) = self.lookback_days {
            tracing::info!(lookback_days, "Overriding lookback window from CLI");
            config.sync.lookback_days = lookback_days;
        }

        if let Some(page_size) = self.page_size {
            tracing::info!(page_size, "Overriding page size from CLI");
            config.sync.page_size = page_size;
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - No data will be written to DHIS2");
            println!();
        }

        // Confirmation prompt (unless --yes or dry-run)
        if !self.yes && !config.application.dry_run {
            println!("Sync Configuration:");
            println!("  Registry: {}", config.registry.base_url);
            println!("  DHIS2: {}", config.dhis2.base_url);
            println!("  Page size: {}", config.sync.page_size);
            println!("  Lookback days: {}", config.sync.lookback_days);
            println!();
            print!("Proceed with sync? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Sync cancelled.");
                return Ok(0);
            }
        }

        let orchestrator = match SyncOrchestrator::from_config(&config, shutdown_signal) {
            Ok(o) => o,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create sync orchestrator");
                eprintln!("Failed to initialize sync: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        if let Ok(watermark) = orchestrator.current_watermark().await {
            println!("Current state: {}", describe_watermark(&watermark));
        }

        println!("🚀 Starting sync...");
        println!();

        let summary = match orchestrator.run().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Sync failed");
                eprintln!("Sync failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        println!();
        println!("📊 Sync Summary:");
        println!("  Fetched: {}", summary.total_fetched);
        println!("  Pages: {}", summary.pages);
        println!("  Updated: {}", summary.updated);
        println!("  Staged for review: {}", summary.staged);
        println!("  Up to date: {}", summary.up_to_date);
        println!("  Ineligible: {}", summary.ineligible);
        if let Some(watermark) = summary.watermark {
            println!("  Watermark: {}", watermark.to_rfc3339());
        }
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        if !summary.errors.is_empty() {
            println!("⚠️  Errors encountered:");
            for error in &summary.errors {
                println!("  - {:?}: {}", error.issue_type, error.message);
                if let Some(context) = &error.context {
                    println!("    Context: {context}");
                }
            }
            println!();
        }

        let exit_code = if summary.interrupted {
            println!("⚠️  Sync interrupted gracefully. Progress saved.");
            println!("   Run the same command to resume from the watermark.");
            println!();
            tracing::info!("Sync interrupted by user signal");
            130 // SIGINT exit code
        } else if summary.is_successful() {
            println!("✅ Sync completed successfully!");
            0
        } else {
            println!("⚠️  Sync completed with errors");
            1 // Partial success
        };

        Ok(exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_args_defaults() {
        let args = SyncArgs {
            yes: false,
            dry_run: false,
            lookback_days: None,
            page_size: None,
        };

        assert!(!args.yes);
        assert!(!args.dry_run);
        assert!(args.lookback_days.is_none());
        assert!(args.page_size.is_none());
    }

    #[test]
    fn test_sync_args_with_overrides() {
        let args = SyncArgs {
            yes: true,
            dry_run: true,
            lookback_days: Some(30),
            page_size: Some(50),
        };

        assert!(args.yes);
        assert!(args.dry_run);
        assert_eq!(args.lookback_days, Some(30));
        assert_eq!(args.page_size, Some(50));
    }
}
