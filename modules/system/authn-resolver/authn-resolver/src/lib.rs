//! Identity resolution for the menu backend.
//!
//! [`IdentityResolver`] turns the identity carriers of one HTTP request into
//! at most one [`menu_security::ResolvedIdentity`]. Carriers are tried in a
//! fixed order and never merged:
//!
//! 1. `Authorization: Bearer <JWT>` claims
//! 2. the platform principal header (`x-ms-client-principal`)
//! 3. the `user` query parameter, only when development identities are enabled
//!
//! A malformed carrier is treated as absent and the next one is tried.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;

pub use config::{AuthNResolverConfig, JwtValidationConfig};
pub use domain::{IdentityError, IdentityResolver};
