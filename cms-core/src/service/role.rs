//! Role business logic

use crate::config::AccessConfig;
use crate::domain::{
    resolve_display_name, select_primary, AuditStamp, CreateRoleInput, PageRequest, PagedResult,
    Role, RoleChanges, RolePageQuery, StringUuid, UpdateRoleInput,
};
use crate::error::{AppError, Result};
use crate::registry::ModuleRegistry;
use crate::repository::{RoleRepository, UserRoleRepository};
use crate::telemetry::metrics::record_soft_delete;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

pub struct RoleService<R: RoleRepository, U: UserRoleRepository> {
    repo: Arc<R>,
    user_roles: Arc<U>,
    modules: Arc<ModuleRegistry>,
    protect_system_roles: bool,
}

impl<R: RoleRepository, U: UserRoleRepository> RoleService<R, U> {
    pub fn new(
        repo: Arc<R>,
        user_roles: Arc<U>,
        modules: Arc<ModuleRegistry>,
        access: &AccessConfig,
    ) -> Self {
        Self {
            repo,
            user_roles,
            modules,
            protect_system_roles: access.protect_system_roles,
        }
    }

    pub async fn get_by_id(&self, id: StringUuid) -> Result<Option<Role>> {
        self.repo.find_by_id(id).await
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.repo.find_by_name(name.trim()).await
    }

    pub async fn get(&self, id: StringUuid) -> Result<Role> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Role {} not found", id)))
    }

    pub async fn create(&self, input: CreateRoleInput, performed_by: StringUuid) -> Result<Role> {
        input.validate()?;
        let module = self.modules.ensure_known(input.module.as_deref())?;

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Role name is required".to_string()));
        }
        if self.repo.find_by_name(&name).await?.is_some() {
            return Err(AppError::Conflict(format!("Role '{}' already exists", name)));
        }

        let role = Role {
            id: StringUuid::new_v4(),
            display_name: resolve_display_name(&name, input.display_name.as_deref()),
            name,
            description: input.description,
            module,
            display_order: input.display_order,
            is_active: true,
            is_system: false,
            is_deleted: false,
            created_at: Utc::now(),
            created_by_user_id: Some(performed_by),
            modified_at: None,
            modified_by_user_id: None,
        };

        let created = self.repo.insert(&role).await?;
        info!(role_id = %created.id, name = %created.name, performed_by = %performed_by, "role created");
        Ok(created)
    }

    /// Update the editable attributes of a role. The name is immutable.
    pub async fn update(&self, input: UpdateRoleInput, performed_by: StringUuid) -> Result<Role> {
        input.validate()?;
        let module = self.modules.ensure_known(input.module.as_deref())?;

        let id = StringUuid::from(input.id);
        let existing = self.get(id).await?;

        if existing.is_active != input.is_active {
            let transition = if input.is_active {
                "activated"
            } else {
                "deactivated"
            };
            info!(role_id = %id, performed_by = %performed_by, transition, "role state change");
        }

        let changes = RoleChanges {
            display_name: resolve_display_name(&existing.name, input.display_name.as_deref()),
            description: input.description,
            module,
            display_order: input.display_order,
            is_active: input.is_active,
            modified_at: Utc::now(),
            modified_by_user_id: performed_by,
        };

        let updated = self.repo.update(id, &changes).await?;
        info!(role_id = %id, "role updated");
        Ok(updated)
    }

    /// Permanently delete a role together with its assignments and grants.
    pub async fn delete(&self, id: StringUuid) -> Result<()> {
        let existing = self.get(id).await?;
        self.ensure_not_protected(&existing, "deleted")?;

        self.repo.delete(id).await?;
        info!(role_id = %id, "role deleted");
        Ok(())
    }

    pub async fn get_paged_list(&self, request: &PageRequest) -> Result<PagedResult<Role>> {
        let query = RolePageQuery::from_request(request);
        self.repo.find_page(&query).await
    }

    /// Active, non-deleted roles in display order
    pub async fn get_all_roles(&self) -> Result<Vec<Role>> {
        self.repo.list_active().await
    }

    /// The assignment flagged primary, else the earliest assignment.
    /// Assignments of soft-deleted roles are skipped, matching the role listing.
    pub async fn get_primary_role_id_for_user(
        &self,
        user_id: StringUuid,
    ) -> Result<Option<StringUuid>> {
        let mut live = vec![];
        for assignment in self.user_roles.find_by_user(user_id).await? {
            if let Some(role) = self.repo.find_by_id(assignment.role_id).await? {
                if !role.is_deleted {
                    live.push(assignment);
                }
            }
        }
        Ok(select_primary(&live).map(|a| a.role_id))
    }

    pub async fn soft_delete(&self, id: StringUuid, user_id: StringUuid) -> Result<()> {
        let existing = self.get(id).await?;
        self.ensure_not_protected(&existing, "deleted")?;

        self.repo
            .set_deleted(id, true, AuditStamp::now(user_id))
            .await?;
        record_soft_delete("role");
        info!(role_id = %id, user_id = %user_id, "role moved to recycle bin");
        Ok(())
    }

    pub async fn restore(&self, id: StringUuid, user_id: StringUuid) -> Result<()> {
        self.get(id).await?;
        self.repo
            .set_deleted(id, false, AuditStamp::now(user_id))
            .await?;
        info!(role_id = %id, user_id = %user_id, "role restored");
        Ok(())
    }

    pub async fn get_deleted(&self) -> Result<Vec<Role>> {
        self.repo.list_deleted().await
    }

    fn ensure_not_protected(&self, role: &Role, action: &str) -> Result<()> {
        if self.protect_system_roles && role.is_system {
            warn!(role_id = %role.id, action, "rejected change to system role");
            return Err(AppError::BusinessRule(format!(
                "System role '{}' cannot be {}",
                role.name, action
            )));
        }
        Ok(())
    }
}
