//! Relationship tuple model.

use serde::{Deserialize, Serialize};

/// Relation names.
pub mod relations {
    /// Holder of a role, e.g. `user:<id> assignee role:admin`.
    pub const ASSIGNEE: &str = "assignee";
    /// May see a menu item.
    pub const VIEWER: &str = "viewer";
}

/// Object names.
pub mod objects {
    use super::normalize_object_name;

    /// The admin role object.
    pub const ADMIN_ROLE: &str = "role:admin";

    const MENU_ITEM_PREFIX: &str = "menu_item:";

    /// Object key of a menu item, from its display name.
    #[must_use]
    pub fn menu_item(name: &str) -> String {
        format!("{MENU_ITEM_PREFIX}{}", normalize_object_name(name))
    }
}

/// Lowercase `name` and replace spaces with underscores.
///
/// `"Risk Dashboard"` and `"risk_dashboard"` normalize to the same key.
#[must_use]
pub fn normalize_object_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// One `(user, relation, object)` relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TupleKey {
    pub user: String,
    pub relation: String,
    pub object: String,
}

impl TupleKey {
    #[must_use]
    pub fn new(
        user: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }

    /// Tuple whose subject is `user:<user_id>`.
    #[must_use]
    pub fn for_user(
        user_id: &str,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self::new(format!("user:{user_id}"), relation, object)
    }
}

impl std::fmt::Display for TupleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}@{}", self.object, self.relation, self.user)
    }
}
