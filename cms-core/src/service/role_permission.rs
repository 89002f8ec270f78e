//! Role-permission grant business logic

use crate::domain::{Permission, Role, RolePermission, RoleWithPermissions, StringUuid};
use crate::error::{AppError, Result};
use crate::repository::{PermissionRepository, RolePermissionRepository, RoleRepository};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

pub struct RolePermissionService<
    G: RolePermissionRepository,
    R: RoleRepository,
    P: PermissionRepository,
> {
    repo: Arc<G>,
    roles: Arc<R>,
    permissions: Arc<P>,
}

impl<G: RolePermissionRepository, R: RoleRepository, P: PermissionRepository>
    RolePermissionService<G, R, P>
{
    pub fn new(repo: Arc<G>, roles: Arc<R>, permissions: Arc<P>) -> Self {
        Self {
            repo,
            roles,
            permissions,
        }
    }

    /// Grant a permission to a role. Granting twice is a no-op.
    pub async fn assign(&self, role_id: StringUuid, permission_id: StringUuid) -> Result<()> {
        self.live_role(role_id).await?;
        self.live_permission(permission_id).await?;

        self.repo
            .assign(RolePermission {
                role_id,
                permission_id,
            })
            .await?;
        info!(role_id = %role_id, permission_id = %permission_id, "permission granted");
        Ok(())
    }

    pub async fn unassign(&self, role_id: StringUuid, permission_id: StringUuid) -> Result<()> {
        self.repo
            .remove(RolePermission {
                role_id,
                permission_id,
            })
            .await?;
        info!(role_id = %role_id, permission_id = %permission_id, "permission revoked");
        Ok(())
    }

    pub async fn get_permissions_for_role(&self, role_id: StringUuid) -> Result<Vec<Permission>> {
        self.role(role_id).await?;
        self.repo.find_permissions_for_role(role_id).await
    }

    pub async fn get_role_with_permissions(&self, role_id: StringUuid) -> Result<RoleWithPermissions> {
        let role = self.role(role_id).await?;
        let permissions = self.repo.find_permissions_for_role(role_id).await?;
        Ok(RoleWithPermissions { role, permissions })
    }

    /// Replace the role's grants with exactly `permission_ids`.
    pub async fn set_permissions_for_role(
        &self,
        role_id: StringUuid,
        permission_ids: &[StringUuid],
    ) -> Result<Vec<Permission>> {
        self.live_role(role_id).await?;

        let unique: BTreeSet<StringUuid> = permission_ids.iter().copied().collect();
        for permission_id in &unique {
            self.live_permission(*permission_id).await?;
        }

        let ids: Vec<StringUuid> = unique.into_iter().collect();
        self.repo.replace_for_role(role_id, &ids).await?;
        info!(role_id = %role_id, count = ids.len(), "role permissions replaced");

        self.repo.find_permissions_for_role(role_id).await
    }

    async fn role(&self, role_id: StringUuid) -> Result<Role> {
        self.roles
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Role {} not found", role_id)))
    }

    async fn live_role(&self, role_id: StringUuid) -> Result<Role> {
        match self.roles.find_by_id(role_id).await? {
            Some(role) if !role.is_deleted => Ok(role),
            _ => Err(AppError::NotFound(format!("Role {} not found", role_id))),
        }
    }

    async fn live_permission(&self, permission_id: StringUuid) -> Result<Permission> {
        match self.permissions.find_by_id(permission_id).await? {
            Some(permission) if !permission.is_deleted => Ok(permission),
            _ => Err(AppError::NotFound(format!(
                "Permission {} not found",
                permission_id
            ))),
        }
    }
}
