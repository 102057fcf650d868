//! Public API trait for policy stores.

use async_trait::async_trait;

use crate::error::PolicyStoreError;
use crate::models::TupleKey;

/// Relationship policy store.
///
/// Implementations are process-wide singletons shared behind an `Arc` and
/// carry no per-request state:
///
/// ```ignore
/// let store: Arc<dyn PolicyStoreClient> = Arc::new(OpenFgaClient::new(&cfg)?);
///
/// let allowed = store.check(&tuple).await?;
/// ```
#[async_trait]
pub trait PolicyStoreClient: Send + Sync {
    /// Whether the relationship in `tuple` holds.
    ///
    /// # Errors
    ///
    /// - `Unavailable` if the store cannot be reached
    /// - `Rejected` if the store answers with an error status
    /// - `InvalidResponse` if the answer cannot be decoded
    async fn check(&self, tuple: &TupleKey) -> Result<bool, PolicyStoreError>;

    /// Record the given relationships.
    ///
    /// # Errors
    ///
    /// Same as [`PolicyStoreClient::check`].
    async fn write(&self, tuples: &[TupleKey]) -> Result<(), PolicyStoreError>;
}
