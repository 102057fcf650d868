use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiGatewayConfig {
    pub bind_addr: String,
    /// Global request body size limit in bytes
    pub body_limit_bytes: usize,
    /// `max-age` of the `Cache-Control` hint on the menu structure.
    pub menu_cache_max_age_secs: u64,
}

impl Default for ApiGatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8087".to_owned(),
            body_limit_bytes: 1024 * 1024,
            menu_cache_max_age_secs: 300,
        }
    }
}
