//! `AuthZ` Resolver
//!
//! [`PermissionChecker`] answers admin and viewer questions for one resolved
//! identity by issuing live checks against a [`PolicyStoreClient`]. Decisions
//! are never cached and every failure resolves to deny.
//!
//! [`PolicyStoreClient`]: authz_resolver_sdk::PolicyStoreClient
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;

pub use config::AuthZResolverConfig;
pub use domain::{DomainError, PermissionChecker};
