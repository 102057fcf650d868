//! Domain layer for the OpenFGA `AuthZ` resolver plugin.

mod client;
pub mod service;
mod wire;

pub use service::Service;
