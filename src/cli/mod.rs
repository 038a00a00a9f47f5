//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Facsync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Facsync - Facility Registry to DHIS2 Sync Tool
#[derive(Parser, Debug)]
#[command(name = "facsync")]
#[command(version, about, long_about = None)]
#[command(author = "Facsync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "facsync.toml", env = "FACSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FACSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an incremental sync from the facility registry to DHIS2
    Sync(commands::sync::SyncArgs),

    /// Reconcile a single facility by registry id
    SyncFacility(commands::sync_one::SyncFacilityArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show sync status and the current watermark
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
