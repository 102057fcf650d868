//! Client implementation for the OpenFGA `AuthZ` resolver plugin.

use async_trait::async_trait;
use authz_resolver_sdk::{PolicyStoreClient, PolicyStoreError, TupleKey};

use super::service::Service;

#[async_trait]
impl PolicyStoreClient for Service {
    async fn check(&self, tuple: &TupleKey) -> Result<bool, PolicyStoreError> {
        let allowed = self.check_tuple(tuple).await?;
        tracing::trace!(tuple = %tuple, allowed, "policy check");
        Ok(allowed)
    }

    async fn write(&self, tuples: &[TupleKey]) -> Result<(), PolicyStoreError> {
        self.write_tuples(tuples).await
    }
}
