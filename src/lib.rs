// Facsync - Facility Registry to DHIS2 Sync Tool
// Copyright (c) 2025 Facsync Contributors
// Licensed under the MIT License

//! # Facsync - Facility Registry to DHIS2 Sync
//!
//! Facsync is a reconciliation tool built in Rust that keeps DHIS2
//! organisation units in step with a master facility registry exposing
//! FHIR Location resources.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Fetching** facilities updated since the last sync from the registry
//! - **Reconciling** each record against the org units that carry its id
//! - **Updating** bookkeeping fields directly when source and target agree
//! - **Staging** substantive changes in the DHIS2 datastore for human review
//! - **Tracking** progress with a persistent watermark for incremental runs
//!
//! ## Architecture
//!
//! Facsync follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (reconciliation, sync orchestration, state)
//! - [`adapters`] - External integrations (facility registry, DHIS2)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use facsync::config::load_config;
//! use facsync::core::sync::SyncOrchestrator;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("facsync.toml")?;
//!
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!     let orchestrator = SyncOrchestrator::from_config(&config, shutdown_rx)?;
//!
//!     let summary = orchestrator.run().await?;
//!     println!("Updated {} org units", summary.updated);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Facsync uses the [`domain::SyncError`] type for all errors:
//!
//! ```rust,no_run
//! use facsync::domain::SyncError;
//!
//! fn example() -> Result<(), SyncError> {
//!     let config = facsync::config::load_config("facsync.toml")?;
//!     config.validate().map_err(SyncError::Configuration)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Facsync uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!("Starting sync");
//! warn!(facility_id = "F123", "Facility missing reporting hierarchy");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
