use authz_resolver_sdk::{PolicyStoreError, TupleKey};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::wire::{CheckRequest, CheckResponse, ErrorBody, TupleKeys, WriteRequest};
use crate::config::OpenFgaConfig;

/// OpenFGA HTTP client.
///
/// One instance is shared by every request; `reqwest::Client` pools
/// connections internally.
pub struct Service {
    client: Client,
    /// `{api_url}/stores/{store_id}` without a trailing slash.
    store_url: String,
    authorization_model_id: Option<String>,
}

impl Service {
    /// Build a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyStoreError::Config`] for unusable configuration.
    pub fn new(cfg: &OpenFgaConfig) -> Result<Self, PolicyStoreError> {
        cfg.validate()?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &cfg.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| PolicyStoreError::Config("invalid api_token".to_owned()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| PolicyStoreError::Config(e.to_string()))?;

        let store_url = format!(
            "{}/stores/{}",
            cfg.api_url.trim().trim_end_matches('/'),
            cfg.store_id.trim()
        );

        tracing::info!(
            store_url = %store_url,
            pinned_model = cfg.authorization_model_id.is_some(),
            "OpenFGA policy store client initialized"
        );

        Ok(Self {
            client,
            store_url,
            authorization_model_id: cfg
                .authorization_model_id
                .clone()
                .filter(|id| !id.trim().is_empty()),
        })
    }

    pub(super) async fn check_tuple(&self, tuple: &TupleKey) -> Result<bool, PolicyStoreError> {
        let body = CheckRequest {
            tuple_key: tuple,
            authorization_model_id: self.authorization_model_id.as_deref(),
        };
        let response = self.post("check", &body).await?;
        let decoded: CheckResponse = decode(response).await?;
        Ok(decoded.allowed)
    }

    pub(super) async fn write_tuples(&self, tuples: &[TupleKey]) -> Result<(), PolicyStoreError> {
        if tuples.is_empty() {
            return Ok(());
        }
        let body = WriteRequest {
            writes: TupleKeys { tuple_keys: tuples },
            authorization_model_id: self.authorization_model_id.as_deref(),
        };
        let response = self.post("write", &body).await?;
        ensure_success(response).await.map(drop)
    }

    async fn post<B: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Response, PolicyStoreError> {
        let url = format!("{}/{endpoint}", self.store_url);
        self.client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| PolicyStoreError::Unavailable(e.to_string()))
    }
}

async fn ensure_success(response: Response) -> Result<Response, PolicyStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    let message = if parsed.message.is_empty() {
        body
    } else if parsed.code.is_empty() {
        parsed.message
    } else {
        format!("{}: {}", parsed.code, parsed.message)
    };
    Err(PolicyStoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, PolicyStoreError> {
    let response = ensure_success(response).await?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| PolicyStoreError::Unavailable(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| PolicyStoreError::InvalidResponse(e.to_string()))
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("store_url", &self.store_url)
            .field("authorization_model_id", &self.authorization_model_id)
            .finish_non_exhaustive()
    }
}
