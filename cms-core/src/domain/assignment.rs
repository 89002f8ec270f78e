//! User-role and role-permission join models

use super::common::StringUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A role held by a user, optionally scoped to one CMS module.
///
/// `(user_id, role_id, module)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: StringUuid,
    pub role_id: StringUuid,
    pub module: Option<String>,
    /// Assigned by seeding or system logic rather than an administrator
    pub is_system_assigned: bool,
    pub is_primary: bool,
    pub assigned_at: DateTime<Utc>,
}

impl UserRole {
    pub fn new(user_id: StringUuid, role_id: StringUuid, module: Option<String>) -> Self {
        Self {
            user_id,
            role_id,
            module,
            is_system_assigned: false,
            is_primary: false,
            assigned_at: Utc::now(),
        }
    }

    pub fn matches(&self, user_id: StringUuid, role_id: StringUuid, module: Option<&str>) -> bool {
        self.user_id == user_id && self.role_id == role_id && self.module.as_deref() == module
    }
}

/// Pick the primary assignment: the flagged row, else the earliest one.
pub fn select_primary(assignments: &[UserRole]) -> Option<&UserRole> {
    assignments.iter().find(|a| a.is_primary).or_else(|| {
        assignments
            .iter()
            .min_by(|a, b| (a.assigned_at, a.role_id).cmp(&(b.assigned_at, b.role_id)))
    })
}

/// Role-permission mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RolePermission {
    pub role_id: StringUuid,
    pub permission_id: StringUuid,
}

/// Input for assigning a role to a user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignRoleInput {
    pub user_id: Uuid,
    pub role_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub module: Option<String>,
    #[serde(default)]
    pub is_system_assigned: bool,
}

/// A user's role with the role details resolved (for API responses)
#[derive(Debug, Clone, Serialize)]
pub struct UserRoleView {
    pub role_id: StringUuid,
    pub role_name: String,
    pub display_name: String,
    pub module: Option<String>,
    pub is_primary: bool,
    pub is_system_assigned: bool,
    pub assigned_at: DateTime<Utc>,
}
