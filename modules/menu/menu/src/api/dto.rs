//! JSON request and response bodies for the menu endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::models::{
    MenuGroup, MenuGroupDraft, MenuItem, MenuItemDraft, MenuItemType, MenuSection, MenuStructure,
    PowerBiConfig,
};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerBiConfigRequest {
    pub workspace_id: String,
    pub report_id: String,
    pub embed_url: String,
    #[serde(default)]
    pub auto_refresh_interval: Option<u32>,
    #[serde(default)]
    pub default_zoom: Option<String>,
    #[serde(default = "default_true")]
    pub show_filter_panel: bool,
    #[serde(default)]
    pub show_filter_panel_expanded: bool,
}

impl From<PowerBiConfigRequest> for PowerBiConfig {
    fn from(r: PowerBiConfigRequest) -> Self {
        Self {
            workspace_id: r.workspace_id,
            report_id: r.report_id,
            embed_url: r.embed_url,
            auto_refresh_interval: r.auto_refresh_interval,
            default_zoom: r.default_zoom,
            show_filter_panel: r.show_filter_panel,
            show_filter_panel_expanded: r.show_filter_panel_expanded,
        }
    }
}

/// Body of `POST /menu-items` and `PUT /menu-items/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemRequest {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Validated against [`MenuItemType`] when converted.
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub menu_group_id: Option<i64>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default, rename = "powerBIConfig", alias = "powerBiConfig")]
    pub power_bi_config: Option<PowerBiConfigRequest>,
}

impl TryFrom<MenuItemRequest> for MenuItemDraft {
    type Error = DomainError;

    fn try_from(r: MenuItemRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            item_type: r.item_type.parse::<MenuItemType>()?,
            name: r.name,
            icon: r.icon,
            url: r.url,
            description: r.description,
            menu_group_id: r.menu_group_id,
            display_order: r.display_order,
            is_visible: r.is_visible,
            power_bi_config: r.power_bi_config.map(Into::into),
        })
    }
}

/// Body of `POST /menu-groups` and `PUT /menu-groups/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuGroupRequest {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

impl From<MenuGroupRequest> for MenuGroupDraft {
    fn from(r: MenuGroupRequest) -> Self {
        Self {
            name: r.name,
            icon: r.icon,
            parent_id: r.parent_id,
            display_order: r.display_order,
            is_visible: r.is_visible,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerBiConfigDto {
    pub workspace_id: String,
    pub report_id: String,
    pub embed_url: String,
    pub auto_refresh_interval: Option<u32>,
    pub default_zoom: Option<String>,
    pub show_filter_panel: bool,
    pub show_filter_panel_expanded: bool,
}

impl From<PowerBiConfig> for PowerBiConfigDto {
    fn from(c: PowerBiConfig) -> Self {
        Self {
            workspace_id: c.workspace_id,
            report_id: c.report_id,
            embed_url: c.embed_url,
            auto_refresh_interval: c.auto_refresh_interval,
            default_zoom: c.default_zoom,
            show_filter_panel: c.show_filter_panel,
            show_filter_panel_expanded: c.show_filter_panel_expanded,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemDto {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub url: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub item_type: MenuItemType,
    #[serde(rename = "powerBIConfig")]
    pub power_bi_config: Option<PowerBiConfigDto>,
}

impl From<MenuItem> for MenuItemDto {
    fn from(i: MenuItem) -> Self {
        Self {
            id: i.id,
            name: i.name,
            icon: i.icon,
            url: i.url,
            description: i.description,
            item_type: i.item_type,
            power_bi_config: i.power_bi_config.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuGroupDto {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub items: Vec<MenuItemDto>,
}

impl From<MenuGroup> for MenuGroupDto {
    fn from(g: MenuGroup) -> Self {
        Self {
            id: g.id,
            name: g.name,
            icon: g.icon,
            items: Vec::new(),
        }
    }
}

impl From<MenuSection> for MenuGroupDto {
    fn from(s: MenuSection) -> Self {
        Self {
            items: s.items.into_iter().map(Into::into).collect(),
            ..Self::from(s.group)
        }
    }
}

/// Body of `GET /menu-structure`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuStructureResponse {
    pub menu_groups: Vec<MenuGroupDto>,
}

impl From<MenuStructure> for MenuStructureResponse {
    fn from(m: MenuStructure) -> Self {
        Self {
            menu_groups: m.sections.into_iter().map(Into::into).collect(),
        }
    }
}
