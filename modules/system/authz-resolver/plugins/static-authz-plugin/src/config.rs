//! Configuration for the static `AuthZ` resolver plugin.

use authz_resolver_sdk::TupleKey;
use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticAuthZPluginConfig {
    /// Relationships present at startup.
    pub tuples: Vec<TupleKey>,
}
