//! User-role assignment business logic

use crate::domain::{select_primary, AssignRoleInput, StringUuid, UserRole, UserRoleView};
use crate::error::{AppError, Result};
use crate::registry::ModuleRegistry;
use crate::repository::{RoleRepository, UserRoleRepository};
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

pub struct UserRoleService<U: UserRoleRepository, R: RoleRepository> {
    repo: Arc<U>,
    roles: Arc<R>,
    modules: Arc<ModuleRegistry>,
}

impl<U: UserRoleRepository, R: RoleRepository> UserRoleService<U, R> {
    pub fn new(repo: Arc<U>, roles: Arc<R>, modules: Arc<ModuleRegistry>) -> Self {
        Self {
            repo,
            roles,
            modules,
        }
    }

    /// Assign a role to a user, optionally scoped to a module.
    ///
    /// Re-assigning an existing (user, role, module) triple returns the
    /// stored row. The user's first assignment becomes primary.
    pub async fn assign(&self, input: AssignRoleInput, performed_by: StringUuid) -> Result<UserRole> {
        input.validate()?;
        let module = self.modules.ensure_known(input.module.as_deref())?;
        let user_id = StringUuid::from(input.user_id);
        let role_id = StringUuid::from(input.role_id);

        match self.roles.find_by_id(role_id).await? {
            Some(role) if !role.is_deleted => {}
            _ => return Err(AppError::NotFound(format!("Role {} not found", role_id))),
        }

        let existing = self.repo.find_by_user(user_id).await?;
        if let Some(current) = existing
            .iter()
            .find(|a| a.matches(user_id, role_id, module.as_deref()))
        {
            return Ok(current.clone());
        }

        let assignment = UserRole {
            user_id,
            role_id,
            module,
            is_system_assigned: input.is_system_assigned,
            is_primary: existing.is_empty(),
            assigned_at: Utc::now(),
        };
        self.repo.insert(&assignment).await?;

        info!(
            user_id = %user_id,
            role_id = %role_id,
            module = assignment.module.as_deref().unwrap_or(""),
            primary = assignment.is_primary,
            performed_by = %performed_by,
            "role assigned"
        );
        Ok(assignment)
    }

    /// Remove one assignment. When it carried the primary flag, the earliest
    /// remaining assignment is promoted.
    pub async fn unassign(
        &self,
        user_id: StringUuid,
        role_id: StringUuid,
        module: Option<&str>,
    ) -> Result<()> {
        let module = module
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty());

        let removed = self.repo.delete(user_id, role_id, module.clone()).await?;
        if !removed {
            return Err(AppError::NotFound(format!(
                "User {} does not hold role {}",
                user_id, role_id
            )));
        }

        let remaining = self.repo.find_by_user(user_id).await?;
        if !remaining.iter().any(|a| a.is_primary) {
            if let Some(next) = select_primary(&remaining) {
                self.repo.set_primary(user_id, next.role_id).await?;
                info!(user_id = %user_id, role_id = %next.role_id, "primary role promoted");
            }
        }

        info!(
            user_id = %user_id,
            role_id = %role_id,
            module = module.as_deref().unwrap_or(""),
            "role unassigned"
        );
        Ok(())
    }

    pub async fn set_primary(&self, user_id: StringUuid, role_id: StringUuid) -> Result<()> {
        let assignments = self.repo.find_by_user(user_id).await?;
        if !assignments.iter().any(|a| a.role_id == role_id) {
            return Err(AppError::NotFound(format!(
                "User {} does not hold role {}",
                user_id, role_id
            )));
        }

        self.repo.set_primary(user_id, role_id).await?;
        info!(user_id = %user_id, role_id = %role_id, "primary role set");
        Ok(())
    }

    /// Assignments joined with their roles. Rows of soft-deleted roles are hidden.
    pub async fn get_roles_for_user(&self, user_id: StringUuid) -> Result<Vec<UserRoleView>> {
        let assignments = self.repo.find_by_user(user_id).await?;

        let mut roles = HashMap::new();
        for role_id in assignments.iter().map(|a| a.role_id).collect::<BTreeSet<_>>() {
            if let Some(role) = self.roles.find_by_id(role_id).await? {
                if !role.is_deleted {
                    roles.insert(role_id, role);
                }
            }
        }

        Ok(assignments
            .into_iter()
            .filter_map(|a| {
                roles.get(&a.role_id).map(|role| UserRoleView {
                    role_id: a.role_id,
                    role_name: role.name.clone(),
                    display_name: role.display_label().to_string(),
                    module: a.module,
                    is_primary: a.is_primary,
                    is_system_assigned: a.is_system_assigned,
                    assigned_at: a.assigned_at,
                })
            })
            .collect())
    }

    /// Distinct users holding the role, in any module
    pub async fn get_users_in_role(&self, role_id: StringUuid) -> Result<Vec<StringUuid>> {
        if self.roles.find_by_id(role_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Role {} not found", role_id)));
        }

        let users: BTreeSet<StringUuid> = self
            .repo
            .find_by_role(role_id)
            .await?
            .into_iter()
            .map(|a| a.user_id)
            .collect();
        Ok(users.into_iter().collect())
    }

    pub async fn is_user_in_role(&self, user_id: StringUuid, role_name: &str) -> Result<bool> {
        let Some(role) = self.roles.find_by_name(role_name.trim()).await? else {
            return Ok(false);
        };
        if role.is_deleted {
            return Ok(false);
        }

        let role_ids = self.repo.find_role_ids_by_user(user_id).await?;
        Ok(role_ids.contains(&role.id))
    }
}
