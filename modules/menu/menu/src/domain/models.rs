//! Menu domain models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Kind of content a menu item opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuItemType {
    AppComponent,
    #[serde(rename = "PowerBIReport")]
    PowerBiReport,
    ExternalApp,
    RemoteModule,
    #[serde(rename = "EmbedHTML")]
    EmbedHtml,
}

impl MenuItemType {
    pub const ALL: [Self; 5] = [
        Self::AppComponent,
        Self::PowerBiReport,
        Self::ExternalApp,
        Self::RemoteModule,
        Self::EmbedHtml,
    ];

    /// Wire name, as accepted in requests and returned in responses.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AppComponent => "AppComponent",
            Self::PowerBiReport => "PowerBIReport",
            Self::ExternalApp => "ExternalApp",
            Self::RemoteModule => "RemoteModule",
            Self::EmbedHtml => "EmbedHTML",
        }
    }
}

impl fmt::Display for MenuItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MenuItemType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::validation("type", format!("invalid menu item type: {s}")))
    }
}

/// Embedding metadata for [`MenuItemType::PowerBiReport`] items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerBiConfig {
    pub workspace_id: String,
    pub report_id: String,
    pub embed_url: String,
    pub auto_refresh_interval: Option<u32>,
    pub default_zoom: Option<String>,
    pub show_filter_panel: bool,
    pub show_filter_panel_expanded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuGroup {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub parent_id: Option<i64>,
    pub display_order: i32,
    pub is_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub url: String,
    pub description: Option<String>,
    pub item_type: MenuItemType,
    pub menu_group_id: Option<i64>,
    pub display_order: i32,
    pub is_visible: bool,
    pub power_bi_config: Option<PowerBiConfig>,
}

/// Field values for creating or replacing a menu item.
///
/// On update, `menu_group_id: None` keeps the current group; a missing
/// `power_bi_config` removes the stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemDraft {
    pub name: String,
    pub icon: Option<String>,
    pub url: String,
    pub description: Option<String>,
    pub item_type: MenuItemType,
    pub menu_group_id: Option<i64>,
    pub display_order: i32,
    pub is_visible: bool,
    pub power_bi_config: Option<PowerBiConfig>,
}

impl MenuItemDraft {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        require("name", &self.name)?;
        require("url", &self.url)?;
        if let Some(cfg) = &self.power_bi_config {
            require("powerBIConfig.workspaceId", &cfg.workspace_id)?;
            require("powerBIConfig.reportId", &cfg.report_id)?;
            require("powerBIConfig.embedUrl", &cfg.embed_url)?;
        }
        Ok(())
    }

    pub(crate) fn into_item(self, id: i64) -> MenuItem {
        MenuItem {
            id,
            name: self.name,
            icon: self.icon,
            url: self.url,
            description: self.description,
            item_type: self.item_type,
            menu_group_id: self.menu_group_id,
            display_order: self.display_order,
            is_visible: self.is_visible,
            power_bi_config: self.power_bi_config,
        }
    }

    pub(crate) fn apply_to(self, item: &mut MenuItem) {
        item.name = self.name;
        item.icon = self.icon;
        item.url = self.url;
        item.description = self.description;
        item.item_type = self.item_type;
        if let Some(group_id) = self.menu_group_id {
            item.menu_group_id = Some(group_id);
        }
        item.display_order = self.display_order;
        item.is_visible = self.is_visible;
        item.power_bi_config = self.power_bi_config;
    }
}

/// Field values for creating or replacing a menu group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuGroupDraft {
    pub name: String,
    pub icon: Option<String>,
    pub parent_id: Option<i64>,
    pub display_order: i32,
    pub is_visible: bool,
}

impl MenuGroupDraft {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        require("name", &self.name)
    }

    pub(crate) fn into_group(self, id: i64) -> MenuGroup {
        MenuGroup {
            id,
            name: self.name,
            icon: self.icon,
            parent_id: self.parent_id,
            display_order: self.display_order,
            is_visible: self.is_visible,
        }
    }
}

/// A visible group with its visible items, both in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSection {
    pub group: MenuGroup,
    pub items: Vec<MenuItem>,
}

/// Menu as seen by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuStructure {
    pub sections: Vec<MenuSection>,
}

fn require(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    Ok(())
}
