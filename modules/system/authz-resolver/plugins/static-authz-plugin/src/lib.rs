#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static `AuthZ` Resolver Plugin
//!
//! An in-memory [`PolicyStoreClient`](authz_resolver_sdk::PolicyStoreClient)
//! seeded from configuration, for local development and tests. Checks are
//! exact tuple lookups; there is no relation rewriting.
//!
//! ## Configuration
//!
//! ```yaml
//! policy_store:
//!   backend: static
//!   tuples:
//!     - { user: "user:abc-123", relation: "assignee", object: "role:admin" }
//!     - { user: "user:abc-123", relation: "viewer", object: "menu_item:dashboard" }
//! ```

pub mod config;
pub mod domain;

pub use config::StaticAuthZPluginConfig;
pub use domain::Service;
