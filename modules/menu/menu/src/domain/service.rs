use std::sync::Arc;

use authz_resolver::PermissionChecker;

use super::error::DomainError;
use super::models::{MenuGroup, MenuGroupDraft, MenuItem, MenuItemDraft, MenuStructure};
use super::repo::MenuRepository;

/// Menu administration service.
///
/// Callers are expected to have authenticated the request and, for the
/// mutating operations, checked admin rights. The service only applies the
/// per-item viewer filter. Group references and the group hierarchy are
/// enforced by the repository within the write itself.
#[derive(Clone)]
pub struct MenuService {
    repo: Arc<dyn MenuRepository>,
    permissions: PermissionChecker,
}

impl MenuService {
    #[must_use]
    pub fn new(repo: Arc<dyn MenuRepository>, permissions: PermissionChecker) -> Self {
        Self { repo, permissions }
    }

    /// The menu as `user_id` may see it.
    ///
    /// Items the user may not view are removed; groups left without items are
    /// dropped.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn menu_structure(&self, user_id: &str) -> Result<MenuStructure, DomainError> {
        let sections = self.repo.visible_sections().await?;

        let names: Vec<&str> = sections
            .iter()
            .flat_map(|s| s.items.iter().map(|i| i.name.as_str()))
            .collect();
        let allowed = self.permissions.can_view_batch(user_id, &names).await;
        let candidates = names.len();

        let sections: Vec<_> = sections
            .into_iter()
            .filter_map(|mut section| {
                section
                    .items
                    .retain(|item| allowed.get(&item.name).copied().unwrap_or(false));
                (!section.items.is_empty()).then_some(section)
            })
            .collect();

        tracing::debug!(
            groups = sections.len(),
            items = sections.iter().map(|s| s.items.len()).sum::<usize>(),
            candidates,
            "menu structure built"
        );
        Ok(MenuStructure { sections })
    }

    #[tracing::instrument(skip_all)]
    pub async fn create_item(&self, draft: MenuItemDraft) -> Result<MenuItem, DomainError> {
        draft.validate()?;
        let item = self.repo.insert_item(draft).await?;
        tracing::info!(item_id = item.id, "menu item created");
        Ok(item)
    }

    #[tracing::instrument(skip(self, draft))]
    pub async fn update_item(&self, id: i64, draft: MenuItemDraft) -> Result<MenuItem, DomainError> {
        draft.validate()?;
        let item = self
            .repo
            .update_item(id, draft)
            .await?
            .ok_or(DomainError::ItemNotFound(id))?;
        tracing::info!(item_id = id, "menu item updated");
        Ok(item)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_item(&self, id: i64) -> Result<(), DomainError> {
        if !self.repo.delete_item(id).await? {
            return Err(DomainError::ItemNotFound(id));
        }
        tracing::info!(item_id = id, "menu item deleted");
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub async fn create_group(&self, draft: MenuGroupDraft) -> Result<MenuGroup, DomainError> {
        draft.validate()?;
        let group = self.repo.insert_group(draft).await?;
        tracing::info!(group_id = group.id, "menu group created");
        Ok(group)
    }

    #[tracing::instrument(skip(self, draft))]
    pub async fn update_group(
        &self,
        id: i64,
        draft: MenuGroupDraft,
    ) -> Result<MenuGroup, DomainError> {
        draft.validate()?;
        let group = self
            .repo
            .update_group(id, draft)
            .await?
            .ok_or(DomainError::GroupNotFound(id))?;
        tracing::info!(group_id = id, "menu group updated");
        Ok(group)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_group(&self, id: i64) -> Result<(), DomainError> {
        if !self.repo.delete_group(id).await? {
            return Err(DomainError::GroupNotFound(id));
        }
        tracing::info!(group_id = id, "menu group deleted");
        Ok(())
    }
}

impl std::fmt::Debug for MenuService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuService")
            .field("permissions", &self.permissions)
            .finish_non_exhaustive()
    }
}
