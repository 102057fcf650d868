//! Errors raised while reading identity carriers.

/// Why a carrier yielded no identity, or why the resolver could not be built.
///
/// Carrier errors never reach callers of
/// [`IdentityResolver::resolve`](crate::IdentityResolver::resolve): a
/// malformed carrier is logged and treated as absent.
#[derive(thiserror::Error, Debug)]
pub enum IdentityError {
    #[error("malformed bearer token: {0}")]
    MalformedToken(&'static str),

    #[error("bearer token rejected: {0}")]
    TokenRejected(#[from] jsonwebtoken::errors::Error),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid query string: {0}")]
    Query(#[from] serde_urlencoded::de::Error),

    #[error("invalid JWT validation config: {0}")]
    InvalidConfig(String),
}
