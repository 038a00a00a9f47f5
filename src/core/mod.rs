//! Core business logic for Facsync.
//!
//! This module contains the reconciliation logic and orchestration for sync runs.
//!
//! # Modules
//!
//! - [`recon`] - Reconciliation decision engine, drift detection, PHCU handling
//! - [`state`] - State management with a watermark for incremental syncs
//! - [`sync`] - Sync orchestration, progress reporting, and run summaries
//! - [`transform`] - FHIR resource flattening and field extraction
//!
//! # Sync Workflow
//!
//! The typical sync workflow:
//!
//! 1. **Load State**: Read the watermark from the state file
//! 2. **Query Registry**: Fetch facilities updated since the watermark
//! 3. **Reconcile**: Decide per record between direct update and review staging
//! 4. **Checkpoint**: Advance the watermark after each page
//! 5. **Report**: Generate a sync summary
//!
//! # Example
//!
//! ```rust,no_run
//! use facsync::core::sync::SyncOrchestrator;
//!
//! # async fn example(orchestrator: SyncOrchestrator) -> Result<(), Box<dyn std::error::Error>> {
//! let summary = orchestrator.run().await?;
//!
//! println!("Fetched: {}", summary.total_fetched);
//! println!("Updated: {}", summary.updated);
//! println!("Staged: {}", summary.staged);
//! # Ok(())
//! # }
//! ```

pub mod recon;
pub mod state;
pub mod sync;
pub mod transform;
