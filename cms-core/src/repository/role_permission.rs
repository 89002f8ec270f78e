//! Role-permission mapping repository

use crate::domain::{Permission, RolePermission, StringUuid};
use crate::error::Result;
use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RolePermissionRepository: Send + Sync {
    /// Idempotent
    async fn assign(&self, grant: RolePermission) -> Result<()>;
    async fn remove(&self, grant: RolePermission) -> Result<()>;
    /// Non-deleted permissions granted by the role
    async fn find_permissions_for_role(&self, role_id: StringUuid) -> Result<Vec<Permission>>;
    /// Replace the role's grants with exactly `permission_ids`
    async fn replace_for_role(
        &self,
        role_id: StringUuid,
        permission_ids: &[StringUuid],
    ) -> Result<()>;
    /// Single set-membership query: does any non-deleted role in `role_ids`
    /// grant any non-deleted permission named in `permission_names`?
    async fn does_any_role_have_permission(
        &self,
        role_ids: &[StringUuid],
        permission_names: &[String],
    ) -> Result<bool>;
    /// Distinct permission names granted by the roles
    async fn find_permission_names_for_roles(&self, role_ids: &[StringUuid])
        -> Result<Vec<String>>;
}

pub struct RolePermissionRepositoryImpl {
    pool: MySqlPool,
}

impl RolePermissionRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RolePermissionRepository for RolePermissionRepositoryImpl {
    async fn assign(&self, grant: RolePermission) -> Result<()> {
        sqlx::query("INSERT IGNORE INTO role_permissions (role_id, permission_id) VALUES (?, ?)")
            .bind(grant.role_id)
            .bind(grant.permission_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn remove(&self, grant: RolePermission) -> Result<()> {
        sqlx::query("DELETE FROM role_permissions WHERE role_id = ? AND permission_id = ?")
            .bind(grant.role_id)
            .bind(grant.permission_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_permissions_for_role(&self, role_id: StringUuid) -> Result<Vec<Permission>> {
        let permissions = sqlx::query_as::<_, Permission>(
            r#"
            SELECT p.id, p.name, p.display_name, p.is_system, p.is_deleted, p.modified_at, p.modified_by_user_id
            FROM permissions p
            INNER JOIN role_permissions rp ON p.id = rp.permission_id
            WHERE rp.role_id = ? AND p.is_deleted = FALSE
            ORDER BY p.name
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }

    async fn replace_for_role(
        &self,
        role_id: StringUuid,
        permission_ids: &[StringUuid],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = ?")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        if !permission_ids.is_empty() {
            let mut insert: QueryBuilder<MySql> =
                QueryBuilder::new("INSERT IGNORE INTO role_permissions (role_id, permission_id) ");
            insert.push_values(permission_ids, |mut row, permission_id| {
                row.push_bind(role_id).push_bind(*permission_id);
            });
            insert.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn does_any_role_have_permission(
        &self,
        role_ids: &[StringUuid],
        permission_names: &[String],
    ) -> Result<bool> {
        if role_ids.is_empty() || permission_names.is_empty() {
            return Ok(false);
        }

        let mut query: QueryBuilder<MySql> = QueryBuilder::new(
            r#"
            SELECT CAST(EXISTS(
                SELECT 1
                FROM role_permissions rp
                INNER JOIN permissions p ON p.id = rp.permission_id
                INNER JOIN roles r ON r.id = rp.role_id
                WHERE p.is_deleted = FALSE AND r.is_deleted = FALSE AND rp.role_id IN (
            "#,
        );
        let mut ids = query.separated(", ");
        for role_id in role_ids {
            ids.push_bind(*role_id);
        }
        query.push(") AND p.name IN (");
        let mut names = query.separated(", ");
        for name in permission_names {
            names.push_bind(name.clone());
        }
        query.push(")) AS SIGNED)");

        let found: i64 = query.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(found > 0)
    }

    async fn find_permission_names_for_roles(
        &self,
        role_ids: &[StringUuid],
    ) -> Result<Vec<String>> {
        if role_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut query: QueryBuilder<MySql> = QueryBuilder::new(
            r#"
            SELECT DISTINCT p.name
            FROM role_permissions rp
            INNER JOIN permissions p ON p.id = rp.permission_id
            INNER JOIN roles r ON r.id = rp.role_id
            WHERE p.is_deleted = FALSE AND r.is_deleted = FALSE AND rp.role_id IN (
            "#,
        );
        let mut ids = query.separated(", ");
        for role_id in role_ids {
            ids.push_bind(*role_id);
        }
        query.push(") ORDER BY p.name");

        let names: Vec<String> = query.build_query_scalar().fetch_all(&self.pool).await?;
        Ok(names)
    }
}
