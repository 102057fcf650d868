#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! OpenFGA `AuthZ` Resolver Plugin
//!
//! [`PolicyStoreClient`](authz_resolver_sdk::PolicyStoreClient) backed by the
//! OpenFGA HTTP API (`POST /stores/{store_id}/check` and `/write`).
//!
//! ## Configuration
//!
//! ```yaml
//! policy_store:
//!   backend: openfga
//!   api_url: "http://localhost:8080"
//!   store_id: "01HXYZ..."
//!   authorization_model_id: "01HABC..."   # optional, latest model when absent
//!   api_token: "..."                       # optional
//!   connect_timeout_ms: 2000
//!   request_timeout_ms: 5000
//! ```

pub mod config;
pub mod domain;

pub use config::OpenFgaConfig;
pub use domain::Service;
