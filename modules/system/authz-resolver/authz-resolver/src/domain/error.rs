//! Domain errors for the `AuthZ` resolver.

use authz_resolver_sdk::PolicyStoreError;

/// Errors surfaced by operations that must report failure.
///
/// Permission checks never return these: they resolve failures to deny.
/// Only writes ([`PermissionChecker::assign`](crate::PermissionChecker::assign))
/// propagate them.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("invalid relationship: {0}")]
    InvalidTuple(&'static str),

    #[error("policy store did not answer within {timeout_ms} ms")]
    Timeout { timeout_ms: u128 },

    #[error(transparent)]
    PolicyStore(#[from] PolicyStoreError),
}
