#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `AuthZ` Resolver SDK
//!
//! Shared vocabulary for relationship-based authorization:
//!
//! - [`TupleKey`] - one `(user, relation, object)` relationship
//! - [`relations`], [`objects`] - the relation and object names used by the menu backend
//! - [`PolicyStoreClient`] - the seam every policy store backend implements
//! - [`PolicyStoreError`] - transport and protocol failures
//!
//! ## Usage
//!
//! ```ignore
//! use authz_resolver_sdk::{PolicyStoreClient, TupleKey, objects, relations};
//!
//! let tuple = TupleKey::for_user("abc-123", relations::VIEWER, objects::menu_item("Risk Dashboard"));
//! let allowed = store.check(&tuple).await?;
//! ```

pub mod api;
pub mod error;
pub mod models;

pub use api::PolicyStoreClient;
pub use error::PolicyStoreError;
pub use models::{TupleKey, normalize_object_name, objects, relations};
