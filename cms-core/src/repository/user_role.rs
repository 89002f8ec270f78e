//! User-role assignment repository

use crate::domain::{StringUuid, UserRole};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRoleRepository: Send + Sync {
    async fn find_by_user(&self, user_id: StringUuid) -> Result<Vec<UserRole>>;
    async fn find_by_role(&self, role_id: StringUuid) -> Result<Vec<UserRole>>;
    /// Distinct role ids held by the user, across all modules
    async fn find_role_ids_by_user(&self, user_id: StringUuid) -> Result<Vec<StringUuid>>;
    async fn insert(&self, assignment: &UserRole) -> Result<()>;
    /// Returns whether a row was removed
    async fn delete(
        &self,
        user_id: StringUuid,
        role_id: StringUuid,
        module: Option<String>,
    ) -> Result<bool>;
    /// Flag every row of `role_id` as primary and clear the flag elsewhere
    async fn set_primary(&self, user_id: StringUuid, role_id: StringUuid) -> Result<()>;
}

/// `module` is stored as '' when unscoped so the unique key covers it
#[derive(FromRow)]
struct UserRoleRow {
    user_id: StringUuid,
    role_id: StringUuid,
    module: String,
    is_system_assigned: bool,
    is_primary: bool,
    assigned_at: DateTime<Utc>,
}

impl From<UserRoleRow> for UserRole {
    fn from(row: UserRoleRow) -> Self {
        Self {
            user_id: row.user_id,
            role_id: row.role_id,
            module: Some(row.module).filter(|m| !m.is_empty()),
            is_system_assigned: row.is_system_assigned,
            is_primary: row.is_primary,
            assigned_at: row.assigned_at,
        }
    }
}

const USER_ROLE_COLUMNS: &str =
    "user_id, role_id, module, is_system_assigned, is_primary, assigned_at";

pub struct UserRoleRepositoryImpl {
    pool: MySqlPool,
}

impl UserRoleRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRoleRepository for UserRoleRepositoryImpl {
    async fn find_by_user(&self, user_id: StringUuid) -> Result<Vec<UserRole>> {
        let rows = sqlx::query_as::<_, UserRoleRow>(&format!(
            "SELECT {} FROM user_roles WHERE user_id = ? ORDER BY assigned_at, role_id",
            USER_ROLE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserRole::from).collect())
    }

    async fn find_by_role(&self, role_id: StringUuid) -> Result<Vec<UserRole>> {
        let rows = sqlx::query_as::<_, UserRoleRow>(&format!(
            "SELECT {} FROM user_roles WHERE role_id = ? ORDER BY assigned_at, user_id",
            USER_ROLE_COLUMNS
        ))
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserRole::from).collect())
    }

    async fn find_role_ids_by_user(&self, user_id: StringUuid) -> Result<Vec<StringUuid>> {
        let ids: Vec<(StringUuid,)> =
            sqlx::query_as("SELECT DISTINCT role_id FROM user_roles WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn insert(&self, assignment: &UserRole) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id, module, is_system_assigned, is_primary, assigned_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(assignment.user_id)
        .bind(assignment.role_id)
        .bind(assignment.module.clone().unwrap_or_default())
        .bind(assignment.is_system_assigned)
        .bind(assignment.is_primary)
        .bind(assignment.assigned_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_write(e, "Role is already assigned to this user"))?;

        Ok(())
    }

    async fn delete(
        &self,
        user_id: StringUuid,
        role_id: StringUuid,
        module: Option<String>,
    ) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM user_roles WHERE user_id = ? AND role_id = ? AND module = ?")
                .bind(user_id)
                .bind(role_id)
                .bind(module.unwrap_or_default())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_primary(&self, user_id: StringUuid, role_id: StringUuid) -> Result<()> {
        sqlx::query("UPDATE user_roles SET is_primary = (role_id = ?) WHERE user_id = ?")
            .bind(role_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
