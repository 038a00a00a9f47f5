//! HTTP client for the DHIS2 Web API
//!
//! Org unit lookups go through the metadata filter API on the foreign-key
//! attribute; bookkeeping updates are full PUTs; staged changes live in the
//! configured datastore namespace, one entry per registry facility id.

use super::api::Dhis2Api;
use super::models::{OrgUnitList, PendingChange, StagedEntry, StagingDisposition};
use crate::adapters::retry::RetryPolicy;
use crate::config::Dhis2Config;
use crate::domain::errors::Dhis2Error;
use crate::domain::ids::OrgUnitId;
use crate::domain::org_unit::{OrgUnit, OrgUnitUpdate};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Fields requested on every org unit lookup
const ORG_UNIT_FIELDS: &str =
    "id,name,code,shortName,openingDate,geometry,attributeValues,lastUpdated,parent[id,attributeValues]";

/// DHIS2 Web API client
pub struct Dhis2Client {
    base_url: String,
    client: Client,
    auth_header: String,
    facility_id_attribute: String,
    datastore_namespace: String,
    retry: RetryPolicy,
}

impl Dhis2Client {
    /// Create a new DHIS2 client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &Dhis2Config) -> Result<Self, Dhis2Error> {
        let mut builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|e| {
            Dhis2Error::ConnectionFailed(format!("failed to build HTTP client: {}", e))
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
            facility_id_attribute: config.attributes.facility_id.clone(),
            datastore_namespace: config.datastore_namespace.clone(),
            retry: RetryPolicy::from_config(&config.retry),
        })
    }

    /// Base URL of the DHIS2 API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(e: reqwest::Error) -> Dhis2Error {
        if e.is_timeout() {
            Dhis2Error::Timeout(e.to_string())
        } else {
            Dhis2Error::ConnectionFailed(e.to_string())
        }
    }

    fn map_status(status: StatusCode, message: String) -> Dhis2Error {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Dhis2Error::AuthenticationFailed(format!("status {}: {}", status, message))
            }
            StatusCode::NOT_FOUND => Dhis2Error::OrgUnitNotFound(message),
            s if s.is_server_error() => Dhis2Error::ServerError {
                status: status.as_u16(),
                message,
            },
            _ => Dhis2Error::QueryFailed(format!("status {}: {}", status, message)),
        }
    }

    /// Send a JSON request and deserialize the response body
    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, Dhis2Error> {
        let mut request = self
            .client
            .request(method, url)
            .header("Authorization", &self.auth_header);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, message));
        }

        response
            .json()
            .await
            .map_err(|e| Dhis2Error::DeserializationFailed(e.to_string()))
    }

    /// Send a JSON request where only the status matters
    async fn request_expect_ok(
        &self,
        method: Method,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<(), Dhis2Error> {
        let response = self
            .client
            .request(method, url)
            .header("Authorization", &self.auth_header)
            .json(body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, message));
        }
        Ok(())
    }

    /// Read a staged entry from the datastore, `None` when absent
    async fn get_staged_entry(&self, key: &str) -> Result<Option<StagedEntry>, Dhis2Error> {
        let url = format!(
            "{}/dataStore/{}/{}",
            self.base_url, self.datastore_namespace, key
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Dhis2Error::DatastoreFailed(format!(
                "status {}: {}",
                status, message
            )));
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| Dhis2Error::DeserializationFailed(e.to_string()))
    }
}

#[async_trait]
impl Dhis2Api for Dhis2Client {
    async fn find_by_facility_id(&self, facility_id: &str) -> Result<Vec<OrgUnit>, Dhis2Error> {
        let url = format!("{}/organisationUnits.json", self.base_url);

        let list: OrgUnitList = self
            .retry
            .run("dhis2_find_org_unit", Dhis2Error::is_retryable, || async {
                let request = self
                    .client
                    .get(&url)
                    .header("Authorization", &self.auth_header)
                    .query(&[
                        (
                            "filter",
                            format!(
                                "attributeValues.attribute.id:eq:{}",
                                self.facility_id_attribute
                            ),
                        ),
                        ("filter", format!("attributeValues.value:eq:{}", facility_id)),
                        ("fields", ORG_UNIT_FIELDS.to_string()),
                        ("paging", "false".to_string()),
                    ]);

                let response = request
                    .send()
                    .await
                    .map_err(Self::map_send_error)?;

                let status = response.status();
                if !status.is_success() {
                    let message = response.text().await.unwrap_or_default();
                    return Err(Self::map_status(status, message));
                }

                response
                    .json::<OrgUnitList>()
                    .await
                    .map_err(|e| Dhis2Error::DeserializationFailed(e.to_string()))
            })
            .await?;

        tracing::debug!(
            facility_id = facility_id,
            matches = list.organisation_units.len(),
            "Org unit lookup by registry id"
        );

        Ok(list.organisation_units)
    }

    async fn update_org_unit(
        &self,
        id: &OrgUnitId,
        update: &OrgUnitUpdate,
    ) -> Result<(), Dhis2Error> {
        let url = format!("{}/organisationUnits/{}", self.base_url, id.as_str());
        let body = serde_json::to_value(update)
            .map_err(|e| Dhis2Error::UpdateFailed(format!("unserializable payload: {}", e)))?;

        self.retry
            .run("dhis2_update_org_unit", Dhis2Error::is_retryable, || {
                self.request_expect_ok(Method::PUT, &url, &body)
            })
            .await
            .map_err(|e| match e {
                Dhis2Error::QueryFailed(msg) => Dhis2Error::UpdateFailed(msg),
                other => other,
            })?;

        tracing::info!(org_unit = id.as_str(), "Applied org unit update");
        Ok(())
    }

    async fn stage_pending_change(
        &self,
        change: &PendingChange,
    ) -> Result<StagingDisposition, Dhis2Error> {
        let key = change.key.as_str();
        let existing = self.get_staged_entry(key).await?;

        if let Some(existing) = &existing {
            if existing.is_current(change.last_updated) {
                tracing::debug!(
                    facility_id = key,
                    "Pending change already staged at this registry version"
                );
                return Ok(StagingDisposition::AlreadyCurrent);
            }
        }

        let url = format!(
            "{}/dataStore/{}/{}",
            self.base_url, self.datastore_namespace, key
        );
        let entry = StagedEntry::from_change(change);
        let body = serde_json::to_value(&entry)
            .map_err(|e| Dhis2Error::DatastoreFailed(format!("unserializable entry: {}", e)))?;

        let method = if existing.is_some() {
            Method::PUT
        } else {
            Method::POST
        };

        self.retry
            .run("dhis2_stage_change", Dhis2Error::is_retryable, || {
                self.request_expect_ok(method.clone(), &url, &body)
            })
            .await
            .map_err(|e| match e {
                Dhis2Error::QueryFailed(msg) => Dhis2Error::DatastoreFailed(msg),
                other => other,
            })?;

        tracing::info!(
            facility_id = key,
            reason = %change.reason,
            replaced = existing.is_some(),
            "Staged pending change for review"
        );

        Ok(if existing.is_some() {
            StagingDisposition::Replaced
        } else {
            StagingDisposition::Created
        })
    }
}
