//! `PgMenuRepository` against a live `PostgreSQL`.
//!
//! Run with `MENU_TEST_DATABASE_URL=postgres://... cargo test -p menu --features pg-tests`.
//! Tests only assert on rows they created, so they can share one database.
#![cfg(feature = "pg-tests")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use menu::{
    DomainError, MenuGroupDraft, MenuItemDraft, MenuItemType, MenuRepository, PgMenuRepository,
    PowerBiConfig,
};
use menu_db::{DatabaseConfig, DatabaseDriver, DbProvider, PgConnector};
use tokio::sync::OnceCell;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

async fn repo() -> PgMenuRepository {
    let url = std::env::var("MENU_TEST_DATABASE_URL")
        .expect("MENU_TEST_DATABASE_URL must point at a test database");
    let config = DatabaseConfig {
        driver: DatabaseDriver::Postgres,
        connection_string: url,
        connect_timeout_ms: 5_000,
    };
    let connector = PgConnector::new(Duration::from_secs(5));
    let repo = PgMenuRepository::new(DbProvider::new(config, Arc::new(connector)));
    MIGRATED
        .get_or_init(|| async { repo.migrate().await.unwrap() })
        .await;
    repo
}

fn group(name: &str, parent_id: Option<i64>, order: i32) -> MenuGroupDraft {
    MenuGroupDraft {
        name: name.to_owned(),
        icon: Some("folder".to_owned()),
        parent_id,
        display_order: order,
        is_visible: true,
    }
}

fn item(name: &str, menu_group_id: Option<i64>, order: i32) -> MenuItemDraft {
    MenuItemDraft {
        name: name.to_owned(),
        icon: None,
        url: format!("/{}", name.to_lowercase()),
        description: None,
        item_type: MenuItemType::AppComponent,
        menu_group_id,
        display_order: order,
        is_visible: true,
        power_bi_config: None,
    }
}

fn report(name: &str, menu_group_id: Option<i64>) -> MenuItemDraft {
    MenuItemDraft {
        item_type: MenuItemType::PowerBiReport,
        power_bi_config: Some(PowerBiConfig {
            workspace_id: "ws-1".to_owned(),
            report_id: format!("{name}-report"),
            embed_url: "https://app.powerbi.com/reportEmbed".to_owned(),
            auto_refresh_interval: Some(600),
            default_zoom: Some("fitToWidth".to_owned()),
            show_filter_panel: true,
            show_filter_panel_expanded: false,
        }),
        ..item(name, menu_group_id, 0)
    }
}

fn field_of(err: DomainError) -> String {
    match err {
        DomainError::Validation { field, .. } => field,
        other => panic!("expected validation error, got {other}"),
    }
}

#[tokio::test]
async fn sections_list_visible_items_in_order_with_power_bi_config() {
    let repo = repo().await;
    let g = repo.insert_group(group("Pg Sections", None, 0)).await.unwrap();
    repo.insert_item(item("Second", Some(g.id), 2)).await.unwrap();
    repo.insert_item(report("First", Some(g.id))).await.unwrap();
    repo.insert_item(MenuItemDraft {
        is_visible: false,
        ..item("Hidden", Some(g.id), 1)
    })
    .await
    .unwrap();

    let sections = repo.visible_sections().await.unwrap();
    let section = sections.iter().find(|s| s.group.id == g.id).unwrap();
    let names: Vec<_> = section.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);

    let cfg = section.items[0].power_bi_config.as_ref().unwrap();
    assert_eq!(cfg.report_id, "First-report");
    assert_eq!(cfg.auto_refresh_interval, Some(600));
}

#[tokio::test]
async fn update_without_group_keeps_group_and_drops_power_bi_config() {
    let repo = repo().await;
    let g = repo.insert_group(group("Pg Update", None, 0)).await.unwrap();
    let created = repo.insert_item(report("Quarterly", Some(g.id))).await.unwrap();

    let updated = repo
        .update_item(created.id, item("Quarterly", None, 3))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.menu_group_id, Some(g.id));

    let sections = repo.visible_sections().await.unwrap();
    let stored = sections
        .iter()
        .flat_map(|s| &s.items)
        .find(|i| i.id == created.id)
        .unwrap();
    assert_eq!(stored.power_bi_config, None);
    assert_eq!(stored.display_order, 3);

    assert_eq!(repo.update_item(-1, item("Nobody", None, 0)).await.unwrap(), None);
}

#[tokio::test]
async fn writes_naming_a_deleted_group_are_rejected() {
    let repo = repo().await;
    let g = repo.insert_group(group("Pg Gone", None, 0)).await.unwrap();
    assert!(repo.delete_group(g.id).await.unwrap());
    assert!(!repo.delete_group(g.id).await.unwrap());

    let err = repo.insert_item(item("Stray", Some(g.id), 0)).await.unwrap_err();
    assert_eq!(field_of(err), "menuGroupId");

    let err = repo.insert_group(group("Child", Some(g.id), 0)).await.unwrap_err();
    assert_eq!(field_of(err), "parentId");
}

#[tokio::test]
async fn deleting_a_group_ungroups_items_and_lifts_children() {
    let repo = repo().await;
    let parent = repo.insert_group(group("Pg Parent", None, 0)).await.unwrap();
    let child = repo.insert_group(group("Pg Child", Some(parent.id), 1)).await.unwrap();
    let loose = repo.insert_item(item("Loose", Some(parent.id), 0)).await.unwrap();

    assert!(repo.delete_group(parent.id).await.unwrap());

    let sections = repo.visible_sections().await.unwrap();
    let lifted = sections.iter().find(|s| s.group.id == child.id).unwrap();
    assert_eq!(lifted.group.parent_id, None);
    assert!(sections.iter().flat_map(|s| &s.items).all(|i| i.id != loose.id));
    assert!(repo.delete_item(loose.id).await.unwrap());
}

#[tokio::test]
async fn reparenting_under_a_descendant_is_rejected() {
    let repo = repo().await;
    let a = repo.insert_group(group("Pg A", None, 0)).await.unwrap();
    let b = repo.insert_group(group("Pg B", Some(a.id), 0)).await.unwrap();
    let c = repo.insert_group(group("Pg C", Some(b.id), 0)).await.unwrap();

    let err = repo
        .update_group(a.id, group("Pg A", Some(c.id), 0))
        .await
        .unwrap_err();
    assert_eq!(field_of(err), "parentId");

    let err = repo
        .update_group(a.id, group("Pg A", Some(a.id), 0))
        .await
        .unwrap_err();
    assert_eq!(field_of(err), "parentId");

    let moved = repo
        .update_group(c.id, group("Pg C", None, 0))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.parent_id, None);
}
