//! `PostgreSQL` menu storage.
//!
//! Each operation opens its own connection through [`DbProvider`], so the
//! statement runs as the caller named by the request's delegated credential.
//! Group references are foreign keys; a write naming a missing group fails
//! inside the statement itself. Re-parenting a group takes a table lock for
//! the cycle check and the update.

use std::collections::BTreeMap;

use async_trait::async_trait;
use menu_db::{DbError, DbProvider, PgConnector};
use sqlx::migrate::Migrator;
use sqlx::postgres::PgConnection;
use sqlx::{Connection as _, FromRow};

use crate::domain::error::{DomainError, MENU_GROUP_ID_FIELD, PARENT_ID_FIELD};
use crate::domain::models::{
    MenuGroup, MenuGroupDraft, MenuItem, MenuItemDraft, MenuSection, PowerBiConfig,
};
use crate::domain::repo::MenuRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const FOREIGN_KEY_VIOLATION: &str = "23503";

macro_rules! select_items {
    ($tail:literal) => {
        concat!(
            "SELECT i.id, i.name, i.icon, i.url, i.description, i.item_type, i.menu_group_id, ",
            "i.display_order, i.is_visible, p.workspace_id, p.report_id, p.embed_url, ",
            "p.auto_refresh_interval, p.default_zoom, p.show_filter_panel, ",
            "p.show_filter_panel_expanded ",
            "FROM menu_items i LEFT JOIN power_bi_configs p ON p.menu_item_id = i.id ",
            $tail
        )
    };
}

#[derive(Debug, FromRow)]
struct GroupRow {
    id: i64,
    name: String,
    icon: Option<String>,
    parent_id: Option<i64>,
    display_order: i32,
    is_visible: bool,
}

impl From<GroupRow> for MenuGroup {
    fn from(row: GroupRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            icon: row.icon,
            parent_id: row.parent_id,
            display_order: row.display_order,
            is_visible: row.is_visible,
        }
    }
}

/// Item joined with its optional Power BI row.
#[derive(Debug, FromRow)]
struct ItemRow {
    id: i64,
    name: String,
    icon: Option<String>,
    url: String,
    description: Option<String>,
    item_type: String,
    menu_group_id: Option<i64>,
    display_order: i32,
    is_visible: bool,
    workspace_id: Option<String>,
    report_id: Option<String>,
    embed_url: Option<String>,
    auto_refresh_interval: Option<i32>,
    default_zoom: Option<String>,
    show_filter_panel: Option<bool>,
    show_filter_panel_expanded: Option<bool>,
}

impl TryFrom<ItemRow> for MenuItem {
    type Error = DomainError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let power_bi_config = match (row.workspace_id, row.report_id, row.embed_url) {
            (Some(workspace_id), Some(report_id), Some(embed_url)) => Some(PowerBiConfig {
                workspace_id,
                report_id,
                embed_url,
                auto_refresh_interval: row
                    .auto_refresh_interval
                    .and_then(|v| u32::try_from(v).ok()),
                default_zoom: row.default_zoom,
                show_filter_panel: row.show_filter_panel.unwrap_or(true),
                show_filter_panel_expanded: row.show_filter_panel_expanded.unwrap_or(false),
            }),
            _ => None,
        };
        Ok(Self {
            id: row.id,
            name: row.name,
            icon: row.icon,
            url: row.url,
            description: row.description,
            item_type: row.item_type.parse()?,
            menu_group_id: row.menu_group_id,
            display_order: row.display_order,
            is_visible: row.is_visible,
            power_bi_config,
        })
    }
}

/// [`MenuRepository`] over `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgMenuRepository {
    db: DbProvider<PgConnector>,
}

impl PgMenuRepository {
    #[must_use]
    pub fn new(db: DbProvider<PgConnector>) -> Self {
        Self { db }
    }

    /// Apply pending schema migrations.
    ///
    /// Runs as whoever the current scope authenticates; at startup that is
    /// the service identity.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Database`] when the store is unreachable or a
    /// migration fails.
    pub async fn migrate(&self) -> Result<(), DomainError> {
        let mut conn = self.db.open().await?;
        MIGRATOR
            .run(&mut conn)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        tracing::info!("menu schema migrations applied");
        Ok(())
    }
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn visible_sections(&self) -> Result<Vec<MenuSection>, DomainError> {
        let mut conn = self.db.open().await?;

        let groups = sqlx::query_as::<_, GroupRow>(
            "SELECT id, name, icon, parent_id, display_order, is_visible FROM menu_groups \
             WHERE is_visible ORDER BY display_order, id",
        )
        .fetch_all(&mut conn)
        .await
        .map_err(query_err)?;

        let rows = sqlx::query_as::<_, ItemRow>(select_items!(
            "WHERE i.is_visible AND i.menu_group_id IS NOT NULL ORDER BY i.display_order, i.id"
        ))
        .fetch_all(&mut conn)
        .await
        .map_err(query_err)?;

        let mut by_group: BTreeMap<i64, Vec<MenuItem>> = BTreeMap::new();
        for row in rows {
            let item = MenuItem::try_from(row)?;
            if let Some(group_id) = item.menu_group_id {
                by_group.entry(group_id).or_default().push(item);
            }
        }

        Ok(groups
            .into_iter()
            .map(|row| {
                let items = by_group.remove(&row.id).unwrap_or_default();
                MenuSection {
                    group: row.into(),
                    items,
                }
            })
            .collect())
    }

    async fn insert_item(&self, draft: MenuItemDraft) -> Result<MenuItem, DomainError> {
        let refresh = refresh_interval(draft.power_bi_config.as_ref())?;
        let mut conn = self.db.open().await?;
        let mut tx = conn.begin().await.map_err(query_err)?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO menu_items \
             (name, icon, url, description, item_type, menu_group_id, display_order, is_visible) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(&draft.name)
        .bind(&draft.icon)
        .bind(&draft.url)
        .bind(&draft.description)
        .bind(draft.item_type.as_str())
        .bind(draft.menu_group_id)
        .bind(draft.display_order)
        .bind(draft.is_visible)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_err(e, MENU_GROUP_ID_FIELD, draft.menu_group_id))?;

        write_power_bi(&mut *tx, id, draft.power_bi_config.as_ref(), refresh).await?;
        tx.commit().await.map_err(query_err)?;
        Ok(draft.into_item(id))
    }

    async fn update_item(
        &self,
        id: i64,
        draft: MenuItemDraft,
    ) -> Result<Option<MenuItem>, DomainError> {
        let refresh = refresh_interval(draft.power_bi_config.as_ref())?;
        let mut conn = self.db.open().await?;
        let mut tx = conn.begin().await.map_err(query_err)?;

        let stored_group: Option<Option<i64>> = sqlx::query_scalar(
            "UPDATE menu_items SET name = $2, icon = $3, url = $4, description = $5, \
             item_type = $6, menu_group_id = COALESCE($7, menu_group_id), \
             display_order = $8, is_visible = $9 \
             WHERE id = $1 RETURNING menu_group_id",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.icon)
        .bind(&draft.url)
        .bind(&draft.description)
        .bind(draft.item_type.as_str())
        .bind(draft.menu_group_id)
        .bind(draft.display_order)
        .bind(draft.is_visible)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| write_err(e, MENU_GROUP_ID_FIELD, draft.menu_group_id))?;

        let Some(menu_group_id) = stored_group else {
            return Ok(None);
        };

        write_power_bi(&mut *tx, id, draft.power_bi_config.as_ref(), refresh).await?;
        tx.commit().await.map_err(query_err)?;

        let mut item = draft.into_item(id);
        item.menu_group_id = menu_group_id;
        Ok(Some(item))
    }

    async fn delete_item(&self, id: i64) -> Result<bool, DomainError> {
        let mut conn = self.db.open().await?;
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(&mut conn)
            .await
            .map_err(query_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_group(&self, draft: MenuGroupDraft) -> Result<MenuGroup, DomainError> {
        let mut conn = self.db.open().await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO menu_groups (name, icon, parent_id, display_order, is_visible) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&draft.name)
        .bind(&draft.icon)
        .bind(draft.parent_id)
        .bind(draft.display_order)
        .bind(draft.is_visible)
        .fetch_one(&mut conn)
        .await
        .map_err(|e| write_err(e, PARENT_ID_FIELD, draft.parent_id))?;
        Ok(draft.into_group(id))
    }

    async fn update_group(
        &self,
        id: i64,
        draft: MenuGroupDraft,
    ) -> Result<Option<MenuGroup>, DomainError> {
        let mut conn = self.db.open().await?;
        let mut tx = conn.begin().await.map_err(query_err)?;

        sqlx::query("LOCK TABLE menu_groups IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM menu_groups WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(query_err)?;
        if !exists {
            return Ok(None);
        }

        if let Some(parent_id) = draft.parent_id {
            let cycle: bool = sqlx::query_scalar(
                "WITH RECURSIVE ancestors (id, parent_id) AS ( \
                     SELECT id, parent_id FROM menu_groups WHERE id = $1 \
                     UNION \
                     SELECT g.id, g.parent_id FROM menu_groups g \
                     JOIN ancestors a ON g.id = a.parent_id \
                 ) \
                 SELECT EXISTS (SELECT 1 FROM ancestors WHERE id = $2)",
            )
            .bind(parent_id)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(query_err)?;
            if cycle {
                return Err(DomainError::parent_cycle(id, parent_id));
            }
        }

        sqlx::query(
            "UPDATE menu_groups SET name = $2, icon = $3, parent_id = $4, display_order = $5, \
             is_visible = $6 WHERE id = $1",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.icon)
        .bind(draft.parent_id)
        .bind(draft.display_order)
        .bind(draft.is_visible)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_err(e, PARENT_ID_FIELD, draft.parent_id))?;

        tx.commit().await.map_err(query_err)?;
        Ok(Some(draft.into_group(id)))
    }

    async fn delete_group(&self, id: i64) -> Result<bool, DomainError> {
        let mut conn = self.db.open().await?;
        let result = sqlx::query("DELETE FROM menu_groups WHERE id = $1")
            .bind(id)
            .execute(&mut conn)
            .await
            .map_err(query_err)?;
        Ok(result.rows_affected() > 0)
    }
}

async fn write_power_bi(
    conn: &mut PgConnection,
    item_id: i64,
    config: Option<&PowerBiConfig>,
    refresh: Option<i32>,
) -> Result<(), DomainError> {
    match config {
        None => {
            sqlx::query("DELETE FROM power_bi_configs WHERE menu_item_id = $1")
                .bind(item_id)
                .execute(conn)
                .await
                .map_err(query_err)?;
        }
        Some(cfg) => {
            sqlx::query(
                "INSERT INTO power_bi_configs (menu_item_id, workspace_id, report_id, embed_url, \
                 auto_refresh_interval, default_zoom, show_filter_panel, show_filter_panel_expanded) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 ON CONFLICT (menu_item_id) DO UPDATE SET \
                 workspace_id = EXCLUDED.workspace_id, report_id = EXCLUDED.report_id, \
                 embed_url = EXCLUDED.embed_url, \
                 auto_refresh_interval = EXCLUDED.auto_refresh_interval, \
                 default_zoom = EXCLUDED.default_zoom, \
                 show_filter_panel = EXCLUDED.show_filter_panel, \
                 show_filter_panel_expanded = EXCLUDED.show_filter_panel_expanded",
            )
            .bind(item_id)
            .bind(&cfg.workspace_id)
            .bind(&cfg.report_id)
            .bind(&cfg.embed_url)
            .bind(refresh)
            .bind(&cfg.default_zoom)
            .bind(cfg.show_filter_panel)
            .bind(cfg.show_filter_panel_expanded)
            .execute(conn)
            .await
            .map_err(query_err)?;
        }
    }
    Ok(())
}

fn refresh_interval(config: Option<&PowerBiConfig>) -> Result<Option<i32>, DomainError> {
    config
        .and_then(|cfg| cfg.auto_refresh_interval)
        .map(|secs| {
            i32::try_from(secs).map_err(|_| {
                DomainError::validation("powerBIConfig.autoRefreshInterval", "value is too large")
            })
        })
        .transpose()
}

fn query_err(err: sqlx::Error) -> DomainError {
    DomainError::Database(DbError::Query(err))
}

/// A foreign key failure on a write that named `group_id` means that group
/// does not exist.
fn write_err(err: sqlx::Error, field: &str, group_id: Option<i64>) -> DomainError {
    match group_id {
        Some(id) if is_foreign_key_violation(&err) => DomainError::unknown_group(field, id),
        _ => query_err(err),
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == FOREIGN_KEY_VIOLATION)
}
