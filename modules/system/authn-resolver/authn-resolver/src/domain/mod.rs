//! Identity carriers and the resolver that walks them.

pub(crate) mod bearer;
pub mod claims;
pub(crate) mod client_principal;
pub(crate) mod dev_query;
pub mod error;
pub mod resolver;

pub use claims::ClaimSet;
pub use error::IdentityError;
pub use resolver::IdentityResolver;
