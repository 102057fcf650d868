use std::collections::BTreeMap;

use async_trait::async_trait;
use menu_db::{Connector, DbProvider, InMemoryConnector};
use parking_lot::RwLock;

use crate::domain::error::{DomainError, MENU_GROUP_ID_FIELD, PARENT_ID_FIELD};
use crate::domain::models::{MenuGroup, MenuGroupDraft, MenuItem, MenuItemDraft, MenuSection};
use crate::domain::repo::MenuRepository;

#[derive(Debug, Default)]
struct Tables {
    groups: BTreeMap<i64, MenuGroup>,
    items: BTreeMap<i64, MenuItem>,
    next_group_id: i64,
    next_item_id: i64,
}

impl Tables {
    fn allocate_group_id(&mut self) -> i64 {
        self.next_group_id += 1;
        self.next_group_id
    }

    fn allocate_item_id(&mut self) -> i64 {
        self.next_item_id += 1;
        self.next_item_id
    }

    fn require_group(&self, field: &str, group_id: Option<i64>) -> Result<(), DomainError> {
        match group_id {
            Some(id) if !self.groups.contains_key(&id) => {
                Err(DomainError::unknown_group(field, id))
            }
            _ => Ok(()),
        }
    }

    /// Walks up from `parent_id`; reaching `group_id` means the new parent
    /// sits inside the group's own subtree.
    fn require_acyclic(&self, group_id: i64, parent_id: i64) -> Result<(), DomainError> {
        let mut cursor = Some(parent_id);
        let mut steps = 0;
        while let Some(current) = cursor {
            if current == group_id {
                return Err(DomainError::parent_cycle(group_id, parent_id));
            }
            steps += 1;
            if steps > self.groups.len() {
                break;
            }
            cursor = self.groups.get(&current).and_then(|g| g.parent_id);
        }
        Ok(())
    }
}

/// [`MenuRepository`] kept in process memory.
///
/// Each operation first opens a connection through [`DbProvider`], so the
/// credential in effect for the request is presented (and may be rejected)
/// exactly as it would be for a remote store. Reference checks run under the
/// same write lock as the write they guard.
#[derive(Debug)]
pub struct InMemoryMenuRepository<C = InMemoryConnector> {
    db: DbProvider<C>,
    tables: RwLock<Tables>,
}

impl<C: Connector> InMemoryMenuRepository<C> {
    #[must_use]
    pub fn new(db: DbProvider<C>) -> Self {
        Self {
            db,
            tables: RwLock::new(Tables::default()),
        }
    }

    async fn connect(&self) -> Result<(), DomainError> {
        self.db.open().await?;
        Ok(())
    }
}

#[async_trait]
impl<C: Connector + 'static> MenuRepository for InMemoryMenuRepository<C> {
    async fn visible_sections(&self) -> Result<Vec<MenuSection>, DomainError> {
        self.connect().await?;
        let tables = self.tables.read();

        let mut groups: Vec<&MenuGroup> = tables.groups.values().filter(|g| g.is_visible).collect();
        groups.sort_by_key(|g| (g.display_order, g.id));

        let sections = groups
            .into_iter()
            .map(|group| {
                let mut items: Vec<MenuItem> = tables
                    .items
                    .values()
                    .filter(|i| i.is_visible && i.menu_group_id == Some(group.id))
                    .cloned()
                    .collect();
                items.sort_by_key(|i| (i.display_order, i.id));
                MenuSection {
                    group: group.clone(),
                    items,
                }
            })
            .collect();
        Ok(sections)
    }

    async fn insert_item(&self, draft: MenuItemDraft) -> Result<MenuItem, DomainError> {
        self.connect().await?;
        let mut tables = self.tables.write();
        tables.require_group(MENU_GROUP_ID_FIELD, draft.menu_group_id)?;
        let id = tables.allocate_item_id();
        let item = draft.into_item(id);
        tables.items.insert(id, item.clone());
        Ok(item)
    }

    async fn update_item(
        &self,
        id: i64,
        draft: MenuItemDraft,
    ) -> Result<Option<MenuItem>, DomainError> {
        self.connect().await?;
        let mut tables = self.tables.write();
        if !tables.items.contains_key(&id) {
            return Ok(None);
        }
        tables.require_group(MENU_GROUP_ID_FIELD, draft.menu_group_id)?;
        Ok(tables.items.get_mut(&id).map(|item| {
            draft.apply_to(item);
            item.clone()
        }))
    }

    async fn delete_item(&self, id: i64) -> Result<bool, DomainError> {
        self.connect().await?;
        Ok(self.tables.write().items.remove(&id).is_some())
    }

    async fn insert_group(&self, draft: MenuGroupDraft) -> Result<MenuGroup, DomainError> {
        self.connect().await?;
        let mut tables = self.tables.write();
        tables.require_group(PARENT_ID_FIELD, draft.parent_id)?;
        let id = tables.allocate_group_id();
        let group = draft.into_group(id);
        tables.groups.insert(id, group.clone());
        Ok(group)
    }

    async fn update_group(
        &self,
        id: i64,
        draft: MenuGroupDraft,
    ) -> Result<Option<MenuGroup>, DomainError> {
        self.connect().await?;
        let mut tables = self.tables.write();
        if !tables.groups.contains_key(&id) {
            return Ok(None);
        }
        if let Some(parent_id) = draft.parent_id {
            tables.require_acyclic(id, parent_id)?;
            tables.require_group(PARENT_ID_FIELD, Some(parent_id))?;
        }
        Ok(tables.groups.get_mut(&id).map(|group| {
            *group = draft.into_group(id);
            group.clone()
        }))
    }

    async fn delete_group(&self, id: i64) -> Result<bool, DomainError> {
        self.connect().await?;
        let mut tables = self.tables.write();
        if tables.groups.remove(&id).is_none() {
            return Ok(false);
        }
        for item in tables.items.values_mut() {
            if item.menu_group_id == Some(id) {
                item.menu_group_id = None;
            }
        }
        for group in tables.groups.values_mut() {
            if group.parent_id == Some(id) {
                group.parent_id = None;
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Arc;

    use menu_db::DatabaseConfig;

    use super::*;
    use crate::domain::models::MenuItemType;

    fn repo() -> InMemoryMenuRepository {
        InMemoryMenuRepository::new(DbProvider::new(
            DatabaseConfig::default(),
            Arc::new(InMemoryConnector::new()),
        ))
    }

    fn group(name: &str, parent_id: Option<i64>) -> MenuGroupDraft {
        MenuGroupDraft {
            name: name.to_owned(),
            icon: None,
            parent_id,
            display_order: 0,
            is_visible: true,
        }
    }

    fn item(menu_group_id: Option<i64>) -> MenuItemDraft {
        MenuItemDraft {
            name: "Orders".to_owned(),
            icon: None,
            url: "/orders".to_owned(),
            description: None,
            item_type: MenuItemType::AppComponent,
            menu_group_id,
            display_order: 0,
            is_visible: true,
            power_bi_config: None,
        }
    }

    fn field_of(err: DomainError) -> String {
        match err {
            DomainError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[tokio::test]
    async fn insert_item_into_deleted_group_is_rejected() {
        let repo = repo();
        let main = repo.insert_group(group("Main", None)).await.unwrap();
        assert!(repo.delete_group(main.id).await.unwrap());

        let err = repo.insert_item(item(Some(main.id))).await.unwrap_err();
        assert_eq!(field_of(err), MENU_GROUP_ID_FIELD);
        assert!(repo.tables.read().items.is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_item_wins_over_unknown_group() {
        let repo = repo();
        assert_eq!(repo.update_item(9, item(Some(42))).await.unwrap(), None);
    }

    #[tokio::test]
    async fn group_with_unknown_parent_is_rejected() {
        let repo = repo();
        let err = repo.insert_group(group("Orphan", Some(5))).await.unwrap_err();
        assert_eq!(field_of(err), PARENT_ID_FIELD);
    }

    #[tokio::test]
    async fn reparenting_under_a_descendant_is_rejected() {
        let repo = repo();
        let a = repo.insert_group(group("A", None)).await.unwrap();
        let b = repo.insert_group(group("B", Some(a.id))).await.unwrap();
        let c = repo.insert_group(group("C", Some(b.id))).await.unwrap();

        let err = repo
            .update_group(a.id, group("A", Some(c.id)))
            .await
            .unwrap_err();
        assert_eq!(field_of(err), PARENT_ID_FIELD);

        let stored = repo.tables.read().groups[&a.id].clone();
        assert_eq!(stored.parent_id, None);
    }

    #[tokio::test]
    async fn reparenting_under_a_sibling_is_allowed() {
        let repo = repo();
        let a = repo.insert_group(group("A", None)).await.unwrap();
        let b = repo.insert_group(group("B", None)).await.unwrap();

        let moved = repo
            .update_group(b.id, group("B", Some(a.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.parent_id, Some(a.id));
    }
}
