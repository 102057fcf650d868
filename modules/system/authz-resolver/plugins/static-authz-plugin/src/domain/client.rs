//! Client implementation for the static `AuthZ` resolver plugin.

use async_trait::async_trait;
use authz_resolver_sdk::{PolicyStoreClient, PolicyStoreError, TupleKey};

use super::service::Service;

#[async_trait]
impl PolicyStoreClient for Service {
    async fn check(&self, tuple: &TupleKey) -> Result<bool, PolicyStoreError> {
        Ok(self.contains(tuple))
    }

    async fn write(&self, tuples: &[TupleKey]) -> Result<(), PolicyStoreError> {
        self.insert_all(tuples);
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn written_tuples_are_visible_to_checks() {
        let service = Service::new();
        let plugin: &dyn PolicyStoreClient = &service;
        let tuple = TupleKey::new("user:u1", "assignee", "role:admin");

        assert!(!plugin.check(&tuple).await.unwrap());
        plugin.write(std::slice::from_ref(&tuple)).await.unwrap();
        assert!(plugin.check(&tuple).await.unwrap());
    }
}
