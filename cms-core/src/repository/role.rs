//! Role repository

use super::{push_order_and_page, push_search_filter};
use crate::domain::{AuditStamp, PagedResult, Role, RoleChanges, RolePageQuery, StringUuid};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};

const ROLE_COLUMNS: &str = "id, name, display_name, description, module, display_order, is_active, \
     is_system, is_deleted, created_at, created_by_user_id, modified_at, modified_by_user_id";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn insert(&self, role: &Role) -> Result<Role>;
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Role>>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>>;
    /// Active, non-deleted roles in display order
    async fn list_active(&self) -> Result<Vec<Role>>;
    async fn list_deleted(&self) -> Result<Vec<Role>>;
    async fn update(&self, id: StringUuid, changes: &RoleChanges) -> Result<Role>;
    async fn set_deleted(&self, id: StringUuid, deleted: bool, stamp: AuditStamp) -> Result<()>;
    async fn delete(&self, id: StringUuid) -> Result<()>;
    async fn find_page(&self, query: &RolePageQuery) -> Result<PagedResult<Role>>;
}

pub struct RoleRepositoryImpl {
    pool: MySqlPool,
}

impl RoleRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for RoleRepositoryImpl {
    async fn insert(&self, role: &Role) -> Result<Role> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name, display_name, description, module, display_order,
                               is_active, is_system, is_deleted, created_at, created_by_user_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(&role.display_name)
        .bind(&role.description)
        .bind(&role.module)
        .bind(role.display_order)
        .bind(role.is_active)
        .bind(role.is_system)
        .bind(role.is_deleted)
        .bind(role.created_at)
        .bind(role.created_by_user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_write(e, format!("Role '{}' already exists", role.name)))?;

        self.find_by_id(role.id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create role")))
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "SELECT {} FROM roles WHERE id = ?",
            ROLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "SELECT {} FROM roles WHERE name = ?",
            ROLE_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    async fn list_active(&self) -> Result<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(&format!(
            "SELECT {} FROM roles WHERE is_active = TRUE AND is_deleted = FALSE ORDER BY display_order, name",
            ROLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    async fn list_deleted(&self) -> Result<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(&format!(
            "SELECT {} FROM roles WHERE is_deleted = TRUE ORDER BY modified_at DESC, name",
            ROLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    async fn update(&self, id: StringUuid, changes: &RoleChanges) -> Result<Role> {
        let result = sqlx::query(
            r#"
            UPDATE roles
            SET display_name = ?, description = ?, module = ?, display_order = ?, is_active = ?,
                modified_at = ?, modified_by_user_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&changes.display_name)
        .bind(&changes.description)
        .bind(&changes.module)
        .bind(changes.display_order)
        .bind(changes.is_active)
        .bind(changes.modified_at)
        .bind(changes.modified_by_user_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Role {} not found", id)));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update role")))
    }

    async fn set_deleted(&self, id: StringUuid, deleted: bool, stamp: AuditStamp) -> Result<()> {
        let result = sqlx::query(
            "UPDATE roles SET is_deleted = ?, modified_at = ?, modified_by_user_id = ? WHERE id = ?",
        )
        .bind(deleted)
        .bind(stamp.at)
        .bind(stamp.by)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Role {} not found", id)));
        }

        Ok(())
    }

    async fn delete(&self, id: StringUuid) -> Result<()> {
        // user_roles and role_permissions rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM roles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Role {} not found", id)));
        }

        Ok(())
    }

    async fn find_page(&self, query: &RolePageQuery) -> Result<PagedResult<Role>> {
        let search_columns = ["name", "display_name"];

        let mut count: QueryBuilder<MySql> =
            QueryBuilder::new("SELECT COUNT(*) FROM roles WHERE is_deleted = FALSE");
        push_search_filter(&mut count, query, &search_columns);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select: QueryBuilder<MySql> = QueryBuilder::new(format!(
            "SELECT {} FROM roles WHERE is_deleted = FALSE",
            ROLE_COLUMNS
        ));
        push_search_filter(&mut select, query, &search_columns);
        push_order_and_page(&mut select, query);
        let items = select.build_query_as::<Role>().fetch_all(&self.pool).await?;

        Ok(PagedResult::new(total.max(0) as u64, items))
    }
}
