//! Error types for policy store clients.

use thiserror::Error;

/// Errors that can occur when talking to a policy store.
///
/// These represent infrastructure/transport failures only.
/// A denied check is expressed as `Ok(false)`, not as an error variant.
#[derive(Debug, Error)]
pub enum PolicyStoreError {
    /// The store could not be reached or did not answer in time.
    #[error("policy store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with something other than a success.
    #[error("policy store returned status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The store's answer could not be decoded.
    #[error("invalid policy store response: {0}")]
    InvalidResponse(String),

    /// Client-side configuration is unusable.
    #[error("invalid policy store configuration: {0}")]
    Config(String),
}
