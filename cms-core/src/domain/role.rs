//! Role domain model

use super::common::StringUuid;
use super::paging::{PageQuery, SortColumn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Role entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: StringUuid,
    /// Stable identity used by logic; immutable after creation
    pub name: String,
    /// Presentation only
    pub display_name: String,
    pub description: Option<String>,
    /// Optional CMS module the role is scoped to
    pub module: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub is_system: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub created_by_user_id: Option<StringUuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by_user_id: Option<StringUuid>,
}

impl Role {
    /// Label shown in the admin UI
    pub fn display_label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self {
            id: StringUuid::new_v4(),
            name: String::new(),
            display_name: String::new(),
            description: None,
            module: None,
            display_order: 0,
            is_active: true,
            is_system: false,
            is_deleted: false,
            created_at: Utc::now(),
            created_by_user_id: None,
            modified_at: None,
            modified_by_user_id: None,
        }
    }
}

/// Input for creating a role
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoleInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 255))]
    pub display_name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub module: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

/// Input for updating a role's presentation and state.
///
/// The name is not part of the update: it is the role's identity.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRoleInput {
    pub id: Uuid,
    #[validate(length(max = 255))]
    pub display_name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub module: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    pub is_active: bool,
}

/// Persisted changes for a role update, resolved by the service
#[derive(Debug, Clone, PartialEq)]
pub struct RoleChanges {
    pub display_name: String,
    pub description: Option<String>,
    pub module: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub modified_at: DateTime<Utc>,
    pub modified_by_user_id: StringUuid,
}

/// Sortable role columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoleSortColumn {
    #[default]
    Name,
    DisplayName,
    CreatedAt,
}

impl SortColumn for RoleSortColumn {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "name" => Some(RoleSortColumn::Name),
            "displayname" | "display_name" => Some(RoleSortColumn::DisplayName),
            "createdat" | "created_at" => Some(RoleSortColumn::CreatedAt),
            _ => None,
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            RoleSortColumn::Name => "name",
            RoleSortColumn::DisplayName => "display_name",
            RoleSortColumn::CreatedAt => "created_at",
        }
    }
}

pub type RolePageQuery = PageQuery<RoleSortColumn>;

/// Role together with the permissions it grants (for API responses)
#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<super::Permission>,
}
