//! Permission checks for callers and stored users

use crate::context::CallerContext;
use crate::domain::StringUuid;
use crate::error::{AppError, Result};
use crate::repository::{RolePermissionRepository, UserRoleRepository};
use crate::telemetry::metrics::record_authorization_check;
use std::sync::Arc;
use tracing::debug;

pub struct AuthorizationService<U: UserRoleRepository, G: RolePermissionRepository> {
    user_roles: Arc<U>,
    grants: Arc<G>,
    full_admin_permission: String,
}

impl<U: UserRoleRepository, G: RolePermissionRepository> AuthorizationService<U, G> {
    pub fn new(user_roles: Arc<U>, grants: Arc<G>, full_admin_permission: impl Into<String>) -> Self {
        Self {
            user_roles,
            grants,
            full_admin_permission: full_admin_permission.into(),
        }
    }

    pub fn full_admin_permission(&self) -> &str {
        &self.full_admin_permission
    }

    /// Evaluate against the claims carried by the caller's token.
    /// Anonymous callers hold nothing.
    pub fn has_permission(&self, ctx: &CallerContext, permission_name: &str) -> bool {
        let granted = ctx.is_authenticated()
            && (ctx.has_claim(permission_name) || ctx.has_claim(&self.full_admin_permission));

        record_authorization_check("claims", granted);
        debug!(
            user_id = ?ctx.user_id(),
            permission = permission_name,
            granted,
            "claims permission check"
        );
        granted
    }

    /// Evaluate against the stored role and grant tables.
    pub async fn has_permission_for_user(
        &self,
        user_id: StringUuid,
        permission_name: &str,
    ) -> Result<bool> {
        let role_ids = self.user_roles.find_role_ids_by_user(user_id).await?;

        let granted = if role_ids.is_empty() {
            false
        } else {
            let names = [
                permission_name.to_string(),
                self.full_admin_permission.clone(),
            ];
            self.grants
                .does_any_role_have_permission(&role_ids, &names)
                .await?
        };

        record_authorization_check("store", granted);
        debug!(
            user_id = %user_id,
            permission = permission_name,
            roles = role_ids.len(),
            granted,
            "stored permission check"
        );
        Ok(granted)
    }

    pub fn require_permission(&self, ctx: &CallerContext, permission_name: &str) -> Result<()> {
        if !ctx.is_authenticated() {
            return Err(AppError::Unauthorized(
                "Authentication required".to_string(),
            ));
        }
        if !self.has_permission(ctx, permission_name) {
            return Err(AppError::Forbidden(format!(
                "Missing permission '{}'",
                permission_name
            )));
        }
        Ok(())
    }

    /// Refuse unless the caller's claims cover every permission in `permissions`.
    /// Full admin claims cover everything; a full admin permission in the set
    /// is only covered by the caller holding it too.
    pub fn require_claims_cover(&self, ctx: &CallerContext, permissions: &[String]) -> Result<()> {
        if !ctx.is_authenticated() {
            return Err(AppError::Unauthorized(
                "Authentication required".to_string(),
            ));
        }
        if ctx.has_claim(&self.full_admin_permission) {
            return Ok(());
        }
        match permissions.iter().find(|p| !ctx.has_claim(p.as_str())) {
            Some(missing) => {
                debug!(
                    user_id = ?ctx.user_id(),
                    permission = %missing,
                    "caller claims do not cover permission"
                );
                Err(AppError::Forbidden(format!(
                    "Missing permission '{}'",
                    missing
                )))
            }
            None => Ok(()),
        }
    }

    /// The claim set materialised into access tokens
    pub async fn get_permission_names_for_user(&self, user_id: StringUuid) -> Result<Vec<String>> {
        let role_ids = self.user_roles.find_role_ids_by_user(user_id).await?;
        if role_ids.is_empty() {
            return Ok(vec![]);
        }
        self.grants.find_permission_names_for_roles(&role_ids).await
    }
}
