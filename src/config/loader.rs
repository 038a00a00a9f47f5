//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::FacsyncConfig;
use crate::config::secret_string;
use crate::domain::errors::SyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FacsyncConfig
/// 4. Applies environment variable overrides (FACSYNC_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use facsync::config::loader::load_config;
///
/// let config = load_config("facsync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FacsyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    // Perform environment variable substitution
    let contents = substitute_env_vars(&contents)?;

    let mut config: FacsyncConfig = toml::from_str(&contents)
        .map_err(|e| SyncError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(|e| SyncError::Configuration(format!("Configuration validation failed: {}", e)))?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        // Don't process env vars in comment lines
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using FACSYNC_* prefix
///
/// Environment variables follow the pattern: FACSYNC_<SECTION>_<KEY>
/// For example: FACSYNC_REGISTRY_BASE_URL, FACSYNC_SYNC_PAGE_SIZE
fn apply_env_overrides(config: &mut FacsyncConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("FACSYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("FACSYNC_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Registry overrides
    if let Ok(val) = std::env::var("FACSYNC_REGISTRY_BASE_URL") {
        config.registry.base_url = val;
    }
    if let Ok(val) = std::env::var("FACSYNC_REGISTRY_USERNAME") {
        config.registry.username = val;
    }
    if let Ok(val) = std::env::var("FACSYNC_REGISTRY_PASSWORD") {
        config.registry.password = secret_string(val);
    }
    if let Ok(val) = std::env::var("FACSYNC_REGISTRY_TLS_VERIFY") {
        config.registry.tls_verify = val.parse().unwrap_or(true);
    }

    // DHIS2 overrides
    if let Ok(val) = std::env::var("FACSYNC_DHIS2_BASE_URL") {
        config.dhis2.base_url = val;
    }
    if let Ok(val) = std::env::var("FACSYNC_DHIS2_USERNAME") {
        config.dhis2.username = val;
    }
    if let Ok(val) = std::env::var("FACSYNC_DHIS2_PASSWORD") {
        config.dhis2.password = secret_string(val);
    }
    if let Ok(val) = std::env::var("FACSYNC_DHIS2_TLS_VERIFY") {
        config.dhis2.tls_verify = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("FACSYNC_DHIS2_DATASTORE_NAMESPACE") {
        config.dhis2.datastore_namespace = val;
    }
    if let Ok(val) = std::env::var("FACSYNC_DHIS2_ATTRIBUTES_FACILITY_ID") {
        config.dhis2.attributes.facility_id = val;
    }
    if let Ok(val) = std::env::var("FACSYNC_DHIS2_ATTRIBUTES_LAST_UPDATED") {
        config.dhis2.attributes.last_updated = val;
    }
    if let Ok(val) = std::env::var("FACSYNC_DHIS2_ATTRIBUTES_OWNERSHIP") {
        config.dhis2.attributes.ownership = val;
    }
    if let Ok(val) = std::env::var("FACSYNC_DHIS2_ATTRIBUTES_SETTLEMENT") {
        config.dhis2.attributes.settlement = val;
    }
    if let Ok(val) = std::env::var("FACSYNC_DHIS2_ATTRIBUTES_FACILITY_TYPE") {
        config.dhis2.attributes.facility_type = val;
    }
    if let Ok(val) = std::env::var("FACSYNC_DHIS2_ATTRIBUTES_IS_PHCU") {
        config.dhis2.attributes.is_phcu = val;
    }
    if let Ok(val) = std::env::var("FACSYNC_DHIS2_ATTRIBUTES_OPERATIONAL_STATUS") {
        config.dhis2.attributes.operational_status = val;
    }

    // Sync overrides
    if let Ok(val) = std::env::var("FACSYNC_SYNC_PAGE_SIZE") {
        if let Ok(size) = val.parse() {
            config.sync.page_size = size;
        }
    }
    if let Ok(val) = std::env::var("FACSYNC_SYNC_LOOKBACK_DAYS") {
        if let Ok(days) = val.parse() {
            config.sync.lookback_days = days;
        }
    }

    // State overrides
    if let Ok(val) = std::env::var("FACSYNC_STATE_PATH") {
        config.state.path = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("FACSYNC_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("FACSYNC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("FACSYNC_LOGGING_FORMAT") {
        config.logging.format = val;
    }
}
