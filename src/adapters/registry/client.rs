//! HTTP client for the master facility registry
//!
//! Talks to the registry's FHIR endpoint. Incremental fetches use
//! `Location?_lastUpdated=gt<ts>` search pages sorted by `lastUpdated`;
//! follow-up pages go through the server's `next` link verbatim.

use super::api::RegistryApi;
use super::models::{facility_from_entry, Bundle, FacilityPage};
use crate::adapters::retry::RetryPolicy;
use crate::config::RegistryConfig;
use crate::core::transform::{paths, FlatResource};
use crate::domain::errors::RegistryError;
use crate::domain::facility::FacilityRecord;
use crate::domain::ids::FacilityId;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;

/// FHIR client for the facility registry
pub struct RegistryClient {
    base_url: String,
    client: Client,
    auth_header: String,
    retry: RetryPolicy,
}

impl RegistryClient {
    /// Create a new registry client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let mut builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|e| {
            RegistryError::ConnectionFailed(format!("failed to build HTTP client: {}", e))
        })?;

        let credentials = format!(
            "{}:{}",
            config.username,
            config.password.expose_secret().as_ref()
        );
        let auth_header = format!(
            "Basic {}",
            general_purpose::STANDARD.encode(credentials.as_bytes())
        );

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            auth_header,
            retry: RetryPolicy::from_config(&config.retry),
        })
    }

    /// Base URL of the registry
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a URL and deserialize the JSON body
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, RegistryError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/fhir+json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RegistryError::Timeout(e.to_string())
                } else {
                    RegistryError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    RegistryError::AuthenticationFailed(format!("status {}: {}", status, message))
                }
                StatusCode::NOT_FOUND => RegistryError::FacilityNotFound(message),
                s if s.is_server_error() => RegistryError::ServerError {
                    status: status.as_u16(),
                    message,
                },
                _ => RegistryError::ClientError {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        response
            .json()
            .await
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))
    }

    /// Fetch a search page and extract typed records
    ///
    /// Malformed entries are logged and skipped rather than failing the
    /// whole page.
    async fn fetch_bundle(&self, url: &str) -> Result<FacilityPage, RegistryError> {
        let body = self
            .retry
            .run("registry_search", RegistryError::is_retryable, || {
                self.get_json(url)
            })
            .await?;

        let bundle: Bundle = serde_json::from_value(body)
            .map_err(|e| RegistryError::InvalidResponse(format!("not a FHIR bundle: {}", e)))?;

        let mut records = Vec::with_capacity(bundle.entry.len());
        for entry in &bundle.entry {
            match facility_from_entry(entry) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed Location entry");
                }
            }
        }

        tracing::debug!(
            records = records.len(),
            has_next = bundle.next_url().is_some(),
            "Fetched registry page"
        );

        Ok(FacilityPage {
            next_url: bundle.next_url().map(str::to_string),
            total: bundle.total,
            records,
        })
    }
}

#[async_trait]
impl RegistryApi for RegistryClient {
    async fn fetch_updated_since(
        &self,
        since: DateTime<Utc>,
        page_size: usize,
    ) -> Result<FacilityPage, RegistryError> {
        let url = format!(
            "{}/Location?_lastUpdated=gt{}&_count={}&_sort=_lastUpdated",
            self.base_url,
            since.to_rfc3339_opts(SecondsFormat::Secs, true),
            page_size
        );
        self.fetch_bundle(&url).await
    }

    async fn fetch_page(&self, next_url: &str) -> Result<FacilityPage, RegistryError> {
        self.fetch_bundle(next_url).await
    }

    async fn fetch_facility(&self, id: &FacilityId) -> Result<FacilityRecord, RegistryError> {
        let url = format!("{}/Location/{}", self.base_url, id.as_str());
        let resource = self
            .retry
            .run("registry_fetch_facility", RegistryError::is_retryable, || {
                self.get_json(&url)
            })
            .await?;

        // Single reads return the bare resource; wrap it so extraction sees
        // the same shape as a bundle entry.
        facility_from_entry(&serde_json::json!({ "resource": resource }))
    }

    async fn is_phcu(&self, id: &FacilityId) -> Result<bool, RegistryError> {
        let url = format!("{}/Location/{}", self.base_url, id.as_str());
        let resource = self
            .retry
            .run("registry_is_phcu", RegistryError::is_retryable, || {
                self.get_json(&url)
            })
            .await?;

        let flat = FlatResource::from_entry(&serde_json::json!({ "resource": resource }));
        Ok(flat.get_bool(paths::IS_PHCU).unwrap_or(false))
    }
}
