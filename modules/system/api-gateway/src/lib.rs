#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! HTTP surface of the menu backend.
//!
//! [`ApiGateway`] assembles the axum router: request id and tracing layers,
//! body limits, then the [`RequestPipeline`](pipeline::RequestPipeline) that
//! resolves the caller, applies the route's [`RouteRequirement`] and scopes
//! the delegated data-store credential around each handler.

pub mod auth;
pub mod config;
pub mod module;
pub mod pipeline;
pub mod problem;
pub mod routes;

pub use auth::{GatewayRoutePolicy, RouteRequirement};
pub use config::ApiGatewayConfig;
pub use module::{ApiGateway, GatewayError};
pub use pipeline::{RequestPhase, RequestPipeline};
pub use problem::Problem;
