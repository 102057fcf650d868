#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Request-scoped security primitives shared by the menu backend.
//!
//! - [`ResolvedIdentity`] - the caller identity produced once per request
//! - [`credential`] - task-local slot for the delegated data-store credential
//! - [`constants`] - wire names of identity carriers and well-known claim types

pub mod constants;
pub mod credential;
pub mod identity;

pub use credential::{CredentialScope, CredentialScopeError};
pub use identity::{IdentitySource, ResolvedIdentity};
