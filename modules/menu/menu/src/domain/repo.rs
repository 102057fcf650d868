use async_trait::async_trait;

use super::error::DomainError;
use super::models::{MenuGroup, MenuGroupDraft, MenuItem, MenuItemDraft, MenuSection};

/// Menu storage.
///
/// Every operation runs against a connection opened for the current request,
/// so implementations see the caller's delegated credential.
///
/// Writes enforce referential rules atomically with the write itself: a
/// `menu_group_id` or `parent_id` naming no group is rejected with
/// [`DomainError::Validation`], and so is a `parent_id` that would make a
/// group its own ancestor.
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// Visible groups in display order, each with its visible items in
    /// display order. Groups without visible items are included.
    async fn visible_sections(&self) -> Result<Vec<MenuSection>, DomainError>;

    async fn insert_item(&self, draft: MenuItemDraft) -> Result<MenuItem, DomainError>;

    /// `None` when no item has `id`.
    async fn update_item(
        &self,
        id: i64,
        draft: MenuItemDraft,
    ) -> Result<Option<MenuItem>, DomainError>;

    /// `false` when no item has `id`.
    async fn delete_item(&self, id: i64) -> Result<bool, DomainError>;

    async fn insert_group(&self, draft: MenuGroupDraft) -> Result<MenuGroup, DomainError>;

    /// `None` when no group has `id`.
    async fn update_group(
        &self,
        id: i64,
        draft: MenuGroupDraft,
    ) -> Result<Option<MenuGroup>, DomainError>;

    /// Items of a deleted group become ungrouped; its child groups become
    /// top-level.
    async fn delete_group(&self, id: i64) -> Result<bool, DomainError>;
}
