#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Menu administration domain.
//!
//! [`MenuService`] builds the per-user menu structure (visible groups and the
//! items the caller may view) and performs group/item CRUD against a
//! [`MenuRepository`]. Wire shapes live in [`api::dto`].

pub mod api;
pub mod domain;
pub mod infra;

pub use domain::error::DomainError;
pub use domain::models::{
    MenuGroup, MenuGroupDraft, MenuItem, MenuItemDraft, MenuItemType, MenuSection, MenuStructure,
    PowerBiConfig,
};
pub use domain::repo::MenuRepository;
pub use domain::service::MenuService;
pub use infra::storage::{InMemoryMenuRepository, PgMenuRepository};
