//! Configuration for the `AuthZ` resolver.

use std::time::Duration;

use serde::Deserialize;

/// Configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthZResolverConfig {
    /// Upper bound for one policy-store round trip. Exceeding it is a deny.
    pub check_timeout_ms: u64,
}

impl Default for AuthZResolverConfig {
    fn default() -> Self {
        Self {
            check_timeout_ms: 5_000,
        }
    }
}

impl AuthZResolverConfig {
    #[must_use]
    pub fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }
}
