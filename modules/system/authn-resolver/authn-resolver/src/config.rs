//! Configuration for identity resolution.

use secrecy::SecretString;
use serde::Deserialize;

/// Configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthNResolverConfig {
    /// Accept `?user=<id>` as an identity when no other carrier is present.
    ///
    /// Local development only. Never enable in a deployed environment.
    pub allow_dev_query_identity: bool,

    /// Verify bearer-token signatures and claims.
    ///
    /// When absent the token payload is decoded without verification and the
    /// platform in front of the service is trusted to have validated it.
    pub jwt: Option<JwtValidationConfig>,
}

/// Bearer-token validation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JwtValidationConfig {
    /// JWS algorithm name, e.g. `HS256` or `RS256`.
    pub algorithm: String,
    /// Shared secret for `HS*` algorithms.
    pub secret: Option<SecretString>,
    /// PEM-encoded public key for asymmetric algorithms.
    pub public_key_pem: Option<String>,
    /// Accepted `iss` values. Empty disables the issuer check.
    pub issuers: Vec<String>,
    /// Accepted `aud` values. Empty disables the audience check.
    pub audiences: Vec<String>,
    /// Clock skew tolerance for `exp` / `nbf`, in seconds.
    pub leeway_secs: u64,
}

impl Default for JwtValidationConfig {
    fn default() -> Self {
        Self {
            algorithm: "RS256".to_owned(),
            secret: None,
            public_key_pem: None,
            issuers: Vec::new(),
            audiences: Vec::new(),
            leeway_secs: 60,
        }
    }
}
