//! Configuration for the OpenFGA `AuthZ` resolver plugin.

use std::time::Duration;

use authz_resolver_sdk::PolicyStoreError;
use secrecy::SecretString;
use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenFgaConfig {
    /// Base URL of the OpenFGA HTTP API.
    pub api_url: String,
    /// Store holding the relationship tuples.
    pub store_id: String,
    /// Pin checks to one model version. Latest model when absent.
    pub authorization_model_id: Option<String>,
    /// Pre-shared API token, sent as `Authorization: Bearer`.
    pub api_token: Option<SecretString>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for OpenFgaConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_owned(),
            store_id: String::new(),
            authorization_model_id: None,
            api_token: None,
            connect_timeout_ms: 2_000,
            request_timeout_ms: 5_000,
        }
    }
}

impl OpenFgaConfig {
    /// Reject configurations that cannot produce a working client.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyStoreError::Config`] when `api_url` is not an
    /// `http(s)` URL or `store_id` is blank.
    pub fn validate(&self) -> Result<(), PolicyStoreError> {
        let url = reqwest::Url::parse(self.api_url.trim())
            .map_err(|e| PolicyStoreError::Config(format!("api_url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PolicyStoreError::Config(
                "api_url must use http or https".to_owned(),
            ));
        }
        if self.store_id.trim().is_empty() {
            return Err(PolicyStoreError::Config("store_id is required".to_owned()));
        }
        if self.connect_timeout_ms == 0 || self.request_timeout_ms == 0 {
            return Err(PolicyStoreError::Config(
                "timeouts must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
