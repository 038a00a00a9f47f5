//! Configuration schema types
//!
//! This module defines the configuration structure for Facsync.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main Facsync configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacsyncConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Facility registry (FHIR) configuration
    pub registry: RegistryConfig,

    /// DHIS2 configuration
    pub dhis2: Dhis2Config,

    /// Sync settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Watermark state configuration
    #[serde(default)]
    pub state: StateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FacsyncConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.registry.validate(&self.environment)?;
        self.dhis2.validate(&self.environment)?;
        self.sync.validate()?;
        self.state.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (don't write to DHIS2)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self, section: &str) -> Result<(), String> {
        if self.max_retries > 10 {
            return Err(format!(
                "{}.retry.max_retries must be at most 10, got {}",
                section, self.max_retries
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "{}.retry.backoff_multiplier must be at least 1.0, got {}",
                section, self.backoff_multiplier
            ));
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return Err(format!(
                "{}.retry.max_delay_ms must be at least initial_delay_ms",
                section
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Facility registry (FHIR) server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the registry's FHIR endpoint
    pub base_url: String,

    /// Username for basic authentication
    pub username: String,

    /// Password for basic authentication
    /// Stored securely in memory and automatically zeroized on drop
    pub password: SecretString,

    /// TLS certificate verification enabled
    ///
    /// **SECURITY WARNING**: Disabling TLS verification exposes the
    /// application to man-in-the-middle attacks. In production environments
    /// this MUST be `true` (enforced by validation).
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl RegistryConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        use secrecy::ExposeSecret;

        validate_base_url("registry", &self.base_url)?;

        if self.username.is_empty() {
            return Err("registry.username cannot be empty".to_string());
        }
        if self.password.expose_secret().is_empty() {
            return Err("registry.password cannot be empty".to_string());
        }

        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments. \
                Set 'registry.tls_verify = true', or use a non-production environment."
                    .to_string(),
            );
        }

        self.retry.validate("registry")?;
        Ok(())
    }
}

/// DHIS2 server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dhis2Config {
    /// Base URL of the DHIS2 Web API
    pub base_url: String,

    /// Username for basic authentication
    pub username: String,

    /// Password for basic authentication
    /// Stored securely in memory and automatically zeroized on drop
    pub password: SecretString,

    /// TLS certificate verification enabled
    ///
    /// **SECURITY WARNING**: Disabling TLS verification exposes the
    /// application to man-in-the-middle attacks. In production environments
    /// this MUST be `true` (enforced by validation).
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Datastore namespace for staged pending changes
    #[serde(default = "default_datastore_namespace")]
    pub datastore_namespace: String,

    /// Org unit attribute UIDs carrying registry shadow fields
    pub attributes: Dhis2AttributeConfig,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Dhis2Config {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        use secrecy::ExposeSecret;

        validate_base_url("dhis2", &self.base_url)?;

        if self.username.is_empty() {
            return Err("dhis2.username cannot be empty".to_string());
        }
        if self.password.expose_secret().is_empty() {
            return Err("dhis2.password cannot be empty".to_string());
        }
        if self.datastore_namespace.is_empty() {
            return Err("dhis2.datastore_namespace cannot be empty".to_string());
        }

        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments. \
                Set 'dhis2.tls_verify = true', or use a non-production environment."
                    .to_string(),
            );
        }

        self.attributes.validate()?;
        self.retry.validate("dhis2")?;
        Ok(())
    }
}

/// Org unit attribute UIDs
///
/// DHIS2 stores the registry foreign key and the per-record watermark as
/// custom attributes on each org unit; their UIDs differ per instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dhis2AttributeConfig {
    /// Attribute UID holding the registry facility id (foreign key)
    pub facility_id: String,

    /// Attribute UID holding the registry lastUpdated watermark
    pub last_updated: String,

    /// Attribute UID holding the shadow ownership value
    pub ownership: String,

    /// Attribute UID holding the shadow settlement value
    pub settlement: String,

    /// Attribute UID holding the shadow facility type value
    pub facility_type: String,

    /// Attribute UID holding the shadow PHCU flag
    pub is_phcu: String,

    /// Attribute UID holding the shadow operational status
    pub operational_status: String,
}

impl Dhis2AttributeConfig {
    fn validate(&self) -> Result<(), String> {
        let required = [
            ("facility_id", &self.facility_id),
            ("last_updated", &self.last_updated),
            ("ownership", &self.ownership),
            ("settlement", &self.settlement),
            ("facility_type", &self.facility_type),
            ("is_phcu", &self.is_phcu),
            ("operational_status", &self.operational_status),
        ];
        for (name, value) in required {
            if value.is_empty() {
                return Err(format!("dhis2.attributes.{} cannot be empty", name));
            }
        }
        Ok(())
    }
}

/// Sync settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Page size for incremental registry fetches
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Lookback window in days when no watermark exists yet
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    /// Graceful shutdown timeout in seconds
    ///
    /// Maximum time to wait for the current page to complete before forcing
    /// shutdown. Should align with container orchestration grace periods.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl SyncConfig {
    fn validate(&self) -> Result<(), String> {
        if !(1..=1000).contains(&self.page_size) {
            return Err(format!(
                "sync.page_size must be between 1 and 1000, got {}",
                self.page_size
            ));
        }
        if !(1..=3650).contains(&self.lookback_days) {
            return Err(format!(
                "sync.lookback_days must be between 1 and 3650, got {}",
                self.lookback_days
            ));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            lookback_days: default_lookback_days(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

/// Watermark state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Path of the watermark file
    #[serde(default = "default_state_path")]
    pub path: String,
}

impl StateConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.is_empty() {
            return Err("state.path cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Directory for local log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Log output format ("json" or "pretty")
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(format!(
                "Invalid logging.format '{}'. Must be one of: {}",
                self.format,
                valid_formats.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled = true".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_log_path(),
            format: default_log_format(),
        }
    }
}

fn validate_base_url(section: &str, url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Err(format!("{}.base_url cannot be empty", section));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(format!(
            "{}.base_url must start with http:// or https://",
            section
        ));
    }
    Ok(())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_page_size() -> usize {
    100
}

fn default_lookback_days() -> i64 {
    90
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

fn default_datastore_namespace() -> String {
    "facility-approvals".to_string()
}

fn default_state_path() -> String {
    "facsync_watermark.json".to_string()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn valid_config() -> FacsyncConfig {
        FacsyncConfig {
            application: ApplicationConfig::default(),
            environment: Environment::Development,
            registry: RegistryConfig {
                base_url: "https://registry.example.org/fhir".to_string(),
                username: "sync-user".to_string(),
                password: secret_string("registry-pass".to_string()),
                tls_verify: true,
                timeout_seconds: 30,
                retry: RetryConfig::default(),
            },
            dhis2: Dhis2Config {
                base_url: "https://dhis2.example.org/api".to_string(),
                username: "sync-user".to_string(),
                password: secret_string("dhis2-pass".to_string()),
                tls_verify: true,
                timeout_seconds: 30,
                datastore_namespace: "facility-approvals".to_string(),
                attributes: Dhis2AttributeConfig {
                    facility_id: "Gk9mPlqAAAA".to_string(),
                    last_updated: "Hk8nQlrBBBB".to_string(),
                    ownership: "Ik7oRmsCCCC".to_string(),
                    settlement: "Jk6pSntDDDD".to_string(),
                    facility_type: "Kk5qToudEEE".to_string(),
                    is_phcu: "Lk4rUpveFFF".to_string(),
                    operational_status: "Mk3sVqwfGGG".to_string(),
                },
                retry: RetryConfig::default(),
            },
            sync: SyncConfig::default(),
            state: StateConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = valid_config();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_must_be_http() {
        let mut config = valid_config();
        config.registry.base_url = "ftp://registry.example.org".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_password_rejected() {
        let mut config = valid_config();
        config.dhis2.password = secret_string(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_attribute_uid_rejected() {
        let mut config = valid_config();
        config.dhis2.attributes.last_updated = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_requires_tls_verify() {
        let mut config = valid_config();
        config.environment = Environment::Production;
        config.registry.tls_verify = false;
        assert!(config.validate().is_err());

        config.registry.tls_verify = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_page_size_bounds() {
        let mut config = valid_config();
        config.sync.page_size = 0;
        assert!(config.validate().is_err());

        config.sync.page_size = 1001;
        assert!(config.validate().is_err());

        config.sync.page_size = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_bounds() {
        let mut config = valid_config();
        config.registry.retry.backoff_multiplier = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_logging_format() {
        let mut config = valid_config();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}
