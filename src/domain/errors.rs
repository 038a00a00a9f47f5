//! Domain error types
//!
//! The error hierarchy for facsync. All errors are domain-specific and don't
//! expose third-party types; the HTTP client errors are converted at the
//! adapter boundary.

use thiserror::Error;

/// Main facsync error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Master facility registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// DHIS2 errors
    #[error("DHIS2 error: {0}")]
    Dhis2(#[from] Dhis2Error),

    /// Reconciliation errors
    #[error("Reconciliation error: {0}")]
    Reconciliation(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// State management errors
    #[error("State management error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Master facility registry errors
///
/// Errors that occur when interacting with the MFR FHIR API.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to connect to the registry
    #[error("Failed to connect to registry: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid response from the registry
    #[error("Invalid response from registry: {0}")]
    InvalidResponse(String),

    /// Facility not found
    #[error("Facility not found: {0}")]
    FacilityNotFound(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// A record that cannot be extracted into the flat facility shape
    #[error("Invalid facility payload: {0}")]
    InvalidFormat(String),
}

impl RegistryError {
    /// Whether a retry of the same request could reasonably succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RegistryError::ConnectionFailed(_)
                | RegistryError::ServerError { .. }
                | RegistryError::Timeout(_)
        )
    }
}

/// DHIS2 errors
///
/// Errors that occur when interacting with the DHIS2 Web API, including
/// the datastore used for staged pending changes.
#[derive(Debug, Error)]
pub enum Dhis2Error {
    /// Failed to connect to DHIS2
    #[error("Failed to connect to DHIS2: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Org unit not found
    #[error("Org unit not found: {0}")]
    OrgUnitNotFound(String),

    /// Failed to update an org unit
    #[error("Failed to update org unit: {0}")]
    UpdateFailed(String),

    /// Failed to query org units
    #[error("Failed to query org units: {0}")]
    QueryFailed(String),

    /// Datastore (pending-change staging) operation failed
    #[error("Datastore operation failed: {0}")]
    DatastoreFailed(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Failed to deserialize a response
    #[error("Failed to deserialize response: {0}")]
    DeserializationFailed(String),
}

impl Dhis2Error {
    /// Whether a retry of the same request could reasonably succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Dhis2Error::ConnectionFailed(_)
                | Dhis2Error::ServerError { .. }
                | Dhis2Error::Timeout(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_display() {
        let err = SyncError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_registry_error_conversion() {
        let registry_err = RegistryError::ConnectionFailed("Network error".to_string());
        let sync_err: SyncError = registry_err.into();
        assert!(matches!(sync_err, SyncError::Registry(_)));
    }

    #[test]
    fn test_dhis2_error_conversion() {
        let dhis2_err = Dhis2Error::UpdateFailed("409".to_string());
        let sync_err: SyncError = dhis2_err.into();
        assert!(matches!(sync_err, SyncError::Dhis2(_)));
    }

    #[test]
    fn test_registry_error_retryable() {
        assert!(RegistryError::ConnectionFailed("x".into()).is_retryable());
        assert!(RegistryError::ServerError {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(!RegistryError::FacilityNotFound("F1".into()).is_retryable());
        assert!(!RegistryError::ClientError {
            status: 400,
            message: "bad".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_dhis2_error_retryable() {
        assert!(Dhis2Error::Timeout("30s".into()).is_retryable());
        assert!(!Dhis2Error::UpdateFailed("409".into()).is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let sync_err: SyncError = io_err.into();
        assert!(matches!(sync_err, SyncError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let sync_err: SyncError = json_err.into();
        assert!(matches!(sync_err, SyncError::Serialization(_)));
    }

    #[test]
    fn test_sync_error_implements_std_error() {
        let err = SyncError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
