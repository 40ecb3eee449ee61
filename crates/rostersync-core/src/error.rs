//! Core error types for rostersync-core.
//!
//! This module defines the error hierarchy using thiserror. Fetch failures
//! never reach an interactive user: the poll coordinator turns them into a
//! cooldown and logs them. Only credential and identity problems propagate.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for rostersync-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credential storage errors
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Remote roster fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Sync loop lifecycle errors
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Failures of the inbound "fetch current roster" capability.
///
/// `RateLimited` and every other variant lead to the same recovery (a fixed
/// cooldown), but they stay distinct so diagnostics can tell them apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Upstream answered HTTP 429 or its in-body "too many requests" code.
    #[error("Rate limited by upstream API")]
    RateLimited,

    /// Non-success HTTP status other than 429
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// Transport-level failure (DNS, connect, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be understood
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Upstream returned an error object in the body
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited)
    }
}

/// Sync loop lifecycle errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The faction identifier for the active view could not be determined.
    #[error("Faction identifier could not be determined for the current view")]
    MissingIdentity,

    /// An operation that needs an active view was called while inactive.
    #[error("Sync loop is not active")]
    Inactive,
}

/// Credential storage errors.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// No API key stored and none supplied
    #[error("No API key provided")]
    Missing,

    /// OS keyring failure
    #[error("Keyring error: {0}")]
    Keyring(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<keyring::Error> for CredentialError {
    fn from(err: keyring::Error) -> Self {
        CredentialError::Keyring(err.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            if status.as_u16() == 429 {
                return FetchError::RateLimited;
            }
            return FetchError::Http {
                status: status.as_u16(),
            };
        }
        if err.is_decode() {
            return FetchError::Malformed(err.without_url().to_string());
        }
        // without_url keeps the API key (a query parameter) out of the message
        FetchError::Network(err.without_url().to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_is_detected() {
        assert!(FetchError::RateLimited.is_rate_limited());
        assert!(!FetchError::Http { status: 500 }.is_rate_limited());
        assert!(!FetchError::Malformed("x".into()).is_rate_limited());
    }

    #[test]
    fn missing_credential_message_matches_prompt_wording() {
        assert_eq!(CredentialError::Missing.to_string(), "No API key provided");
    }

    #[test]
    fn core_error_wraps_sync_error() {
        let err: CoreError = SyncError::MissingIdentity.into();
        assert!(err.to_string().contains("Faction identifier"));
    }
}
