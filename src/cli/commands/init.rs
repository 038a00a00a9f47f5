//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "facsync.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Facsync configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Create a .env file with your credentials:");
                println!("     - Set FACSYNC_REGISTRY_USERNAME and FACSYNC_REGISTRY_PASSWORD");
                println!("     - Set FACSYNC_DHIS2_USERNAME and FACSYNC_DHIS2_PASSWORD");
                println!("  3. Fill in the DHIS2 attribute uids under [dhis2.attributes]");
                println!("  4. Validate configuration: facsync validate-config");
                println!("  5. Run a sync: facsync sync");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Facsync Configuration File
# Facility Registry to DHIS2 Sync Tool

environment = "development"

[application]
log_level = "info"
dry_run = false

[registry]
base_url = "https://mfr.example.org/fhir"
username = "${FACSYNC_REGISTRY_USERNAME}"
password = "${FACSYNC_REGISTRY_PASSWORD}"
tls_verify = true
timeout_seconds = 30

[dhis2]
base_url = "https://dhis2.example.org/api"
username = "${FACSYNC_DHIS2_USERNAME}"
password = "${FACSYNC_DHIS2_PASSWORD}"
tls_verify = true
timeout_seconds = 30
datastore_namespace = "facility-approvals"

[dhis2.attributes]
facility_id = ""
last_updated = ""
ownership = ""
settlement = ""
facility_type = ""
is_phcu = ""
operational_status = ""

[sync]
page_size = 100
lookback_days = 90
shutdown_timeout_secs = 30

[state]
path = "facsync_watermark.json"

[logging]
local_enabled = true
local_path = "logs"
format = "json"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Facsync Configuration File
# Facility Registry to DHIS2 Sync Tool
#
# This file contains all configuration options with examples and explanations.
#
# Values of the form ${VAR} are substituted from environment variables at
# load time. Keep credentials out of this file and in the environment or a
# .env file instead.

# Deployment environment: development | staging | production
# In production, TLS verification cannot be disabled.
environment = "development"

[application]
# Log level: trace, debug, info, warn, error
log_level = "info"
# When true, outcomes are decided and logged but nothing is written to DHIS2
dry_run = false

[registry]
# Base URL of the master facility registry's FHIR endpoint
base_url = "https://mfr.example.org/fhir"
username = "${FACSYNC_REGISTRY_USERNAME}"
password = "${FACSYNC_REGISTRY_PASSWORD}"
tls_verify = true
timeout_seconds = 30

[registry.retry]
max_retries = 3
initial_delay_ms = 500
max_delay_ms = 10000
backoff_multiplier = 2.0

[dhis2]
# Base URL of the DHIS2 Web API
base_url = "https://dhis2.example.org/api"
username = "${FACSYNC_DHIS2_USERNAME}"
password = "${FACSYNC_DHIS2_PASSWORD}"
tls_verify = true
timeout_seconds = 30
# Datastore namespace where pending changes are staged for review
datastore_namespace = "facility-approvals"

# DHIS2 attribute uids holding the registry's shadow fields on each org unit.
# All seven are required; find them under Maintenance > Attributes.
[dhis2.attributes]
facility_id = "Gk9mPlqAAAA"
last_updated = "Hk8nQlrBBBB"
ownership = "Ik7oRmsCCCC"
settlement = "Jk6pSntDDDD"
facility_type = "Kk5qToudEEE"
is_phcu = "Lk4rUpveFFF"
operational_status = "Mk3sVqwfGGG"

[dhis2.retry]
max_retries = 3
initial_delay_ms = 500
max_delay_ms = 10000
backoff_multiplier = 2.0

[sync]
# Number of registry records fetched per page (1-1000)
page_size = 100
# How far back the first sync reaches when no watermark exists (1-3650)
lookback_days = 90
# Grace period for finishing the current page on shutdown
shutdown_timeout_secs = 30

[state]
# Watermark file; the directory is created if missing
path = "facsync_watermark.json"

[logging]
# Write JSON logs to rotating daily files under local_path
local_enabled = true
local_path = "logs"
# Console output format: json | pretty
format = "pretty"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "facsync.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "facsync.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_minimal_config_parses() {
        let content = InitArgs::generate_minimal_config();
        let parsed: std::result::Result<toml::Value, _> = toml::from_str(&content);
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_example_config_parses() {
        let content = InitArgs::generate_config_with_examples();
        let parsed: std::result::Result<toml::Value, _> = toml::from_str(&content);
        assert!(parsed.is_ok());
    }
}
