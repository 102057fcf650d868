#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Connection provider for the menu data store.
//!
//! Every connection is opened through [`DbProvider::open`], which reads the
//! delegated credential installed for the current request (see
//! [`menu_security::credential`]) and authenticates as the end user when one
//! is present, falling back to the service identity otherwise.
//!
//! [`InMemoryConnector`] backs the in-process store; [`PgConnector`] opens
//! `PostgreSQL` connections through sqlx.

pub mod config;
pub mod connector;
pub mod error;
pub mod postgres;
pub mod provider;

pub use config::{DatabaseConfig, DatabaseDriver};
pub use connector::{
    AuthMode, Connection, ConnectionAuth, ConnectionRequest, Connector, InMemoryConnector,
};
pub use error::DbError;
pub use postgres::PgConnector;
pub use provider::DbProvider;
