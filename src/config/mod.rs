//! Configuration management for Facsync.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! Facsync uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Environment variable overrides (`FACSYNC_*` prefix)
//! - Default values for optional settings
//! - Comprehensive validation
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use facsync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("facsync.toml")?;
//!
//! println!("Registry URL: {}", config.registry.base_url);
//! println!("DHIS2 URL: {}", config.dhis2.base_url);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [registry]
//! base_url = "https://registry.example.org/fhir"
//! username = "sync-user"
//! password = "${FACSYNC_REGISTRY_PASSWORD}"
//!
//! [dhis2]
//! base_url = "https://dhis2.example.org/api"
//! username = "sync-user"
//! password = "${FACSYNC_DHIS2_PASSWORD}"
//! datastore_namespace = "facility-approvals"
//!
//! [dhis2.attributes]
//! facility_id = "Gk9mPlqAAAA"
//! last_updated = "Hk8nQlrBBBB"
//! ownership = "Ik7oRmsCCCC"
//! settlement = "Jk6pSntDDDD"
//! facility_type = "Kk5qToudEEE"
//! is_phcu = "Lk4rUpveFFF"
//! operational_status = "Mk3sVqwfGGG"
//!
//! [sync]
//! page_size = 100
//! lookback_days = 90
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, Dhis2AttributeConfig, Dhis2Config, Environment, FacsyncConfig,
    LoggingConfig, RegistryConfig, RetryConfig, StateConfig, SyncConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
