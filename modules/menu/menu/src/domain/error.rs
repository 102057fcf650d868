use menu_db::DbError;

pub const MENU_GROUP_ID_FIELD: &str = "menuGroupId";
pub const PARENT_ID_FIELD: &str = "parentId";

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("menu item {0} not found")]
    ItemNotFound(i64),

    #[error("menu group {0} not found")]
    GroupNotFound(i64),

    #[error("validation error on field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("database error: {0}")]
    Database(#[from] DbError),
}

impl DomainError {
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// A `field` that references a group which does not exist.
    #[must_use]
    pub fn unknown_group(field: &str, group_id: i64) -> Self {
        Self::validation(field, format!("menu group {group_id} does not exist"))
    }

    #[must_use]
    pub fn parent_cycle(group_id: i64, parent_id: i64) -> Self {
        Self::validation(
            PARENT_ID_FIELD,
            format!("group {parent_id} is group {group_id} or one of its descendants"),
        )
    }
}
