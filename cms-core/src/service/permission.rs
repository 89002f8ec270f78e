//! Permission business logic

use crate::domain::{
    resolve_display_name, AuditStamp, CreatePermissionInput, PageRequest, PagedResult,
    Permission, PermissionPageQuery, StringUuid, UpdatePermissionInput,
};
use crate::error::{AppError, Result};
use crate::repository::PermissionRepository;
use crate::telemetry::metrics::record_soft_delete;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

pub struct PermissionService<R: PermissionRepository> {
    repo: Arc<R>,
}

impl<R: PermissionRepository> PermissionService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Non-deleted permissions ordered by name
    pub async fn get_all(&self) -> Result<Vec<Permission>> {
        self.repo.list_active().await
    }

    pub async fn get_by_id(&self, id: StringUuid) -> Result<Option<Permission>> {
        self.repo.find_by_id(id).await
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Permission>> {
        self.repo.find_by_name(name.trim()).await
    }

    pub async fn get(&self, id: StringUuid) -> Result<Permission> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Permission {} not found", id)))
    }

    pub async fn create(
        &self,
        input: CreatePermissionInput,
        created_by: StringUuid,
    ) -> Result<Permission> {
        input.validate()?;

        let name = input.name.trim().to_string();
        if self.repo.find_by_name(&name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Permission '{}' already exists",
                name
            )));
        }

        let stamp = AuditStamp::now(created_by);
        let permission = Permission {
            id: StringUuid::new_v4(),
            display_name: resolve_display_name(&name, input.display_name.as_deref()),
            name,
            is_system: false,
            is_deleted: false,
            modified_at: Some(stamp.at),
            modified_by_user_id: Some(stamp.by),
        };

        let created = self.repo.insert(&permission).await?;
        info!(permission_id = %created.id, name = %created.name, "permission created");
        Ok(created)
    }

    pub async fn update(
        &self,
        input: UpdatePermissionInput,
        modified_by: StringUuid,
    ) -> Result<Permission> {
        input.validate()?;

        let id = StringUuid::from(input.id);
        let existing = self.get(id).await?;
        let name = input.name.trim().to_string();

        if name != existing.name {
            if existing.is_system {
                warn!(permission_id = %id, "rejected rename of system permission");
                return Err(AppError::BusinessRule(format!(
                    "System permission '{}' cannot be renamed",
                    existing.name
                )));
            }
            if let Some(other) = self.repo.find_by_name(&name).await? {
                if other.id != id {
                    return Err(AppError::Conflict(format!(
                        "Permission '{}' already exists",
                        name
                    )));
                }
            }
        }

        let updated = Permission {
            display_name: resolve_display_name(&name, input.display_name.as_deref()),
            name,
            modified_at: Some(Utc::now()),
            modified_by_user_id: Some(modified_by),
            ..existing
        };

        let saved = self.repo.update(&updated).await?;
        info!(permission_id = %id, "permission updated");
        Ok(saved)
    }

    pub async fn soft_delete(&self, id: StringUuid, user_id: StringUuid) -> Result<()> {
        let existing = self.get(id).await?;
        if existing.is_system {
            warn!(permission_id = %id, "rejected soft delete of system permission");
            return Err(AppError::BusinessRule(format!(
                "System permission '{}' cannot be deleted",
                existing.name
            )));
        }

        self.repo
            .set_deleted(id, true, AuditStamp::now(user_id))
            .await?;
        record_soft_delete("permission");
        info!(permission_id = %id, user_id = %user_id, "permission moved to recycle bin");
        Ok(())
    }

    pub async fn restore(&self, id: StringUuid, user_id: StringUuid) -> Result<()> {
        self.get(id).await?;
        self.repo
            .set_deleted(id, false, AuditStamp::now(user_id))
            .await?;
        info!(permission_id = %id, user_id = %user_id, "permission restored");
        Ok(())
    }

    /// Permanently remove a permission from the recycle bin.
    ///
    /// A missing id is a no-op. Live permissions must be soft-deleted first.
    pub async fn hard_delete(&self, id: StringUuid) -> Result<()> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(());
        };

        if existing.is_system {
            warn!(permission_id = %id, "rejected hard delete of system permission");
            return Err(AppError::BusinessRule(format!(
                "System permission '{}' cannot be deleted",
                existing.name
            )));
        }
        if !existing.is_deleted {
            return Err(AppError::BusinessRule(format!(
                "Permission '{}' must be moved to the recycle bin before it can be purged",
                existing.name
            )));
        }

        self.repo.delete(id).await?;
        info!(permission_id = %id, "permission purged");
        Ok(())
    }

    pub async fn get_deleted(&self) -> Result<Vec<Permission>> {
        self.repo.list_deleted().await
    }

    pub async fn get_paged_list(&self, request: &PageRequest) -> Result<PagedResult<Permission>> {
        let query = PermissionPageQuery::from_request(request);
        self.repo.find_page(&query).await
    }
}
