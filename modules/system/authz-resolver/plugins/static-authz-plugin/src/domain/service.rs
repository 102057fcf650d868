//! Service implementation for the static `AuthZ` resolver plugin.

use std::collections::HashSet;

use authz_resolver_sdk::TupleKey;
use parking_lot::RwLock;

use crate::config::StaticAuthZPluginConfig;

/// Static `AuthZ` resolver service.
///
/// Holds the relationship set behind a lock; writes are visible to every
/// later check.
#[derive(Debug, Default)]
pub struct Service {
    tuples: RwLock<HashSet<TupleKey>>,
}

impl Service {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service from plugin configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticAuthZPluginConfig) -> Self {
        let tuples: HashSet<TupleKey> = cfg.tuples.iter().cloned().collect();
        tracing::info!(count = tuples.len(), "static policy store seeded");
        Self {
            tuples: RwLock::new(tuples),
        }
    }

    #[must_use]
    pub fn contains(&self, tuple: &TupleKey) -> bool {
        self.tuples.read().contains(tuple)
    }

    pub fn insert_all(&self, tuples: &[TupleKey]) {
        self.tuples.write().extend(tuples.iter().cloned());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tuples.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tuples.read().is_empty()
    }
}
