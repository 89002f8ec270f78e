//! Permission domain model

use super::common::StringUuid;
use super::paging::{PageQuery, SortColumn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Permission entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Permission {
    pub id: StringUuid,
    /// Stable slug used by permission checks (e.g. "pages.edit")
    pub name: String,
    pub display_name: String,
    /// System permissions are never renamed or deleted
    pub is_system: bool,
    pub is_deleted: bool,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by_user_id: Option<StringUuid>,
}

impl Default for Permission {
    fn default() -> Self {
        Self {
            id: StringUuid::new_v4(),
            name: String::new(),
            display_name: String::new(),
            is_system: false,
            is_deleted: false,
            modified_at: None,
            modified_by_user_id: None,
        }
    }
}

/// Input for creating a permission
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePermissionInput {
    #[validate(
        length(min = 1, max = 100),
        custom(function = "validate_permission_name")
    )]
    pub name: String,
    #[validate(length(max = 255))]
    pub display_name: Option<String>,
}

/// Input for updating a permission
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePermissionInput {
    pub id: Uuid,
    #[validate(
        length(min = 1, max = 100),
        custom(function = "validate_permission_name")
    )]
    pub name: String,
    #[validate(length(max = 255))]
    pub display_name: Option<String>,
}

/// Permission names are lowercase slugs: "pages.edit", "full_admin_access"
fn validate_permission_name(name: &str) -> Result<(), validator::ValidationError> {
    if PERMISSION_NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_permission_name"))
    }
}

lazy_static::lazy_static! {
    pub static ref PERMISSION_NAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-z][a-z0-9_]*(?:[.:-][a-z0-9_]+)*$").unwrap();
}

/// Sortable permission columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PermissionSortColumn {
    #[default]
    Name,
    DisplayName,
    IsSystem,
}

impl SortColumn for PermissionSortColumn {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "name" => Some(PermissionSortColumn::Name),
            "displayname" | "display_name" => Some(PermissionSortColumn::DisplayName),
            "issystem" | "is_system" => Some(PermissionSortColumn::IsSystem),
            _ => None,
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            PermissionSortColumn::Name => "name",
            PermissionSortColumn::DisplayName => "display_name",
            PermissionSortColumn::IsSystem => "is_system",
        }
    }
}

pub type PermissionPageQuery = PageQuery<PermissionSortColumn>;

/// Permissions guarding the admin API
pub mod admin {
    pub const PERMISSIONS_MANAGE: &str = "permissions.manage";
    pub const ROLES_MANAGE: &str = "roles.manage";
    pub const USERS_MANAGE: &str = "users.manage";
    pub const USERS_IMPERSONATE: &str = "users.impersonate";

    /// Seeded with `is_system = true`, alongside the full admin permission
    pub const SEEDED: &[(&str, &str)] = &[
        (PERMISSIONS_MANAGE, "Manage permissions"),
        (ROLES_MANAGE, "Manage roles"),
        (USERS_MANAGE, "Manage user roles"),
        (USERS_IMPERSONATE, "Impersonate users"),
    ];
}
