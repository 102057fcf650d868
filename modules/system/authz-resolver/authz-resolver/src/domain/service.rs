//! Permission checks for resolved identities.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use authz_resolver_sdk::{PolicyStoreClient, TupleKey, objects, relations};
use futures::FutureExt;
use futures::future::join_all;
use menu_security::ResolvedIdentity;

use super::error::DomainError;
use crate::config::AuthZResolverConfig;

/// Live, fail-closed permission checks.
///
/// Holds no per-request state; share one instance across requests.
#[derive(Clone)]
pub struct PermissionChecker {
    store: Arc<dyn PolicyStoreClient>,
    check_timeout: Duration,
}

impl PermissionChecker {
    #[must_use]
    pub fn new(store: Arc<dyn PolicyStoreClient>, cfg: &AuthZResolverConfig) -> Self {
        Self {
            store,
            check_timeout: cfg.check_timeout(),
        }
    }

    /// Whether `identity` may perform admin operations.
    ///
    /// An admin role asserted by the identity carrier grants admin without
    /// consulting the store. Otherwise the store is asked whether the user is
    /// an assignee of the admin role.
    #[tracing::instrument(skip_all, fields(user_id = %identity.user_id()))]
    pub async fn is_admin(&self, identity: &ResolvedIdentity) -> bool {
        if identity.claims_admin() {
            tracing::debug!("admin granted by role claim");
            return true;
        }
        let tuple = TupleKey::for_user(identity.user_id(), relations::ASSIGNEE, objects::ADMIN_ROLE);
        self.check(&tuple).await
    }

    /// Whether `user_id` may see the menu item named `resource_name`.
    #[tracing::instrument(skip(self))]
    pub async fn can_view(&self, user_id: &str, resource_name: &str) -> bool {
        let tuple = TupleKey::for_user(user_id, relations::VIEWER, objects::menu_item(resource_name));
        self.check(&tuple).await
    }

    /// [`PermissionChecker::can_view`] for many names at once.
    ///
    /// Checks run concurrently. The result is keyed by the names as given;
    /// a check that errors or panics yields `false` for its name only.
    #[tracing::instrument(skip_all, fields(user_id = %user_id, count = names.len()))]
    pub async fn can_view_batch<S>(&self, user_id: &str, names: &[S]) -> HashMap<String, bool>
    where
        S: AsRef<str>,
    {
        let checks = names.iter().map(|name| async move {
            let name = name.as_ref();
            (name.to_owned(), self.can_view(user_id, name).await)
        });
        join_all(checks).await.into_iter().collect()
    }

    /// Record a relationship for `user_id` in the policy store.
    ///
    /// # Errors
    ///
    /// - [`DomainError::InvalidTuple`] if any part is blank
    /// - [`DomainError::Timeout`] if the store does not answer in time
    /// - [`DomainError::PolicyStore`] if the store rejects or cannot take the write
    #[tracing::instrument(skip(self))]
    pub async fn assign(
        &self,
        user_id: &str,
        relation: &str,
        object: &str,
    ) -> Result<TupleKey, DomainError> {
        if user_id.trim().is_empty() {
            return Err(DomainError::InvalidTuple("user id is required"));
        }
        if relation.trim().is_empty() {
            return Err(DomainError::InvalidTuple("relation is required"));
        }
        if object.trim().is_empty() {
            return Err(DomainError::InvalidTuple("object is required"));
        }

        let tuple = TupleKey::for_user(user_id.trim(), relation.trim(), object.trim());
        let write = self.store.write(std::slice::from_ref(&tuple));
        match tokio::time::timeout(self.check_timeout, write).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(DomainError::Timeout {
                    timeout_ms: self.check_timeout.as_millis(),
                });
            }
        }

        tracing::info!(%tuple, "relationship written");
        Ok(tuple)
    }

    async fn check(&self, tuple: &TupleKey) -> bool {
        let guarded = AssertUnwindSafe(tokio::time::timeout(
            self.check_timeout,
            self.store.check(tuple),
        ))
        .catch_unwind();
        let Ok(answer) = guarded.await else {
            tracing::warn!(%tuple, "policy check panicked, denying");
            return false;
        };
        match answer {
            Ok(Ok(allowed)) => {
                tracing::debug!(%tuple, allowed, "policy check");
                allowed
            }
            Ok(Err(e)) => {
                tracing::warn!(%tuple, error = %e, "policy check failed, denying");
                false
            }
            Err(_) => {
                tracing::warn!(
                    %tuple,
                    timeout_ms = self.check_timeout.as_millis(),
                    "policy check timed out, denying"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for PermissionChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionChecker")
            .field("check_timeout", &self.check_timeout)
            .finish_non_exhaustive()
    }
}
