//! Permission repository

use super::{push_order_and_page, push_search_filter};
use crate::domain::{AuditStamp, PagedResult, Permission, PermissionPageQuery, StringUuid};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};

const PERMISSION_COLUMNS: &str =
    "id, name, display_name, is_system, is_deleted, modified_at, modified_by_user_id";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    async fn insert(&self, permission: &Permission) -> Result<Permission>;
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Permission>>;
    /// Looks at every row, including soft-deleted ones
    async fn find_by_name(&self, name: &str) -> Result<Option<Permission>>;
    async fn list_active(&self) -> Result<Vec<Permission>>;
    async fn list_deleted(&self) -> Result<Vec<Permission>>;
    async fn update(&self, permission: &Permission) -> Result<Permission>;
    async fn set_deleted(&self, id: StringUuid, deleted: bool, stamp: AuditStamp) -> Result<()>;
    async fn delete(&self, id: StringUuid) -> Result<()>;
    async fn find_page(&self, query: &PermissionPageQuery) -> Result<PagedResult<Permission>>;
}

pub struct PermissionRepositoryImpl {
    pool: MySqlPool,
}

impl PermissionRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PermissionRepositoryImpl {
    async fn insert(&self, permission: &Permission) -> Result<Permission> {
        sqlx::query(
            r#"
            INSERT INTO permissions (id, name, display_name, is_system, is_deleted, modified_at, modified_by_user_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(permission.id)
        .bind(&permission.name)
        .bind(&permission.display_name)
        .bind(permission.is_system)
        .bind(permission.is_deleted)
        .bind(permission.modified_at)
        .bind(permission.modified_by_user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_write(e, format!("Permission '{}' already exists", permission.name))
        })?;

        self.find_by_id(permission.id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create permission")))
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Permission>> {
        let permission = sqlx::query_as::<_, Permission>(&format!(
            "SELECT {} FROM permissions WHERE id = ?",
            PERMISSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(permission)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Permission>> {
        let permission = sqlx::query_as::<_, Permission>(&format!(
            "SELECT {} FROM permissions WHERE name = ?",
            PERMISSION_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(permission)
    }

    async fn list_active(&self) -> Result<Vec<Permission>> {
        let permissions = sqlx::query_as::<_, Permission>(&format!(
            "SELECT {} FROM permissions WHERE is_deleted = FALSE ORDER BY name",
            PERMISSION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }

    async fn list_deleted(&self) -> Result<Vec<Permission>> {
        let permissions = sqlx::query_as::<_, Permission>(&format!(
            "SELECT {} FROM permissions WHERE is_deleted = TRUE ORDER BY modified_at DESC, name",
            PERMISSION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }

    async fn update(&self, permission: &Permission) -> Result<Permission> {
        let result = sqlx::query(
            r#"
            UPDATE permissions
            SET name = ?, display_name = ?, modified_at = ?, modified_by_user_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&permission.name)
        .bind(&permission.display_name)
        .bind(permission.modified_at)
        .bind(permission.modified_by_user_id)
        .bind(permission.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_write(e, format!("Permission '{}' already exists", permission.name))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Permission {} not found",
                permission.id
            )));
        }

        self.find_by_id(permission.id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update permission")))
    }

    async fn set_deleted(&self, id: StringUuid, deleted: bool, stamp: AuditStamp) -> Result<()> {
        let result = sqlx::query(
            "UPDATE permissions SET is_deleted = ?, modified_at = ?, modified_by_user_id = ? WHERE id = ?",
        )
        .bind(deleted)
        .bind(stamp.at)
        .bind(stamp.by)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Permission {} not found", id)));
        }

        Ok(())
    }

    async fn delete(&self, id: StringUuid) -> Result<()> {
        // role_permissions rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM permissions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Permission {} not found", id)));
        }

        Ok(())
    }

    async fn find_page(&self, query: &PermissionPageQuery) -> Result<PagedResult<Permission>> {
        let search_columns = ["name", "display_name"];

        let mut count: QueryBuilder<MySql> =
            QueryBuilder::new("SELECT COUNT(*) FROM permissions WHERE is_deleted = FALSE");
        push_search_filter(&mut count, query, &search_columns);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select: QueryBuilder<MySql> = QueryBuilder::new(format!(
            "SELECT {} FROM permissions WHERE is_deleted = FALSE",
            PERMISSION_COLUMNS
        ));
        push_search_filter(&mut select, query, &search_columns);
        push_order_and_page(&mut select, query);
        let items = select
            .build_query_as::<Permission>()
            .fetch_all(&self.pool)
            .await?;

        Ok(PagedResult::new(total.max(0) as u64, items))
    }
}
