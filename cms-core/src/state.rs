//! Application state trait for dependency injection
//!
//! Handlers are generic over `HasServices` so the production `AppState`
//! and the in-memory state used by the HTTP tests share one router.

use crate::config::Config;
use crate::jwt::JwtManager;
use crate::registry::ModuleRegistry;
use crate::repository::{
    PermissionRepository, RolePermissionRepository, RoleRepository, UserRoleRepository,
};
use crate::service::{
    AuthorizationService, PermissionService, RolePermissionService, RoleService, UserRoleService,
};
use metrics_exporter_prometheus::PrometheusHandle;

pub trait HasServices: Clone + Send + Sync + 'static {
    type PermissionRepo: PermissionRepository;
    type RoleRepo: RoleRepository;
    type UserRoleRepo: UserRoleRepository;
    type RolePermissionRepo: RolePermissionRepository;

    fn config(&self) -> &Config;

    fn modules(&self) -> &ModuleRegistry;

    fn permission_service(&self) -> &PermissionService<Self::PermissionRepo>;

    fn role_service(&self) -> &RoleService<Self::RoleRepo, Self::UserRoleRepo>;

    fn user_role_service(&self) -> &UserRoleService<Self::UserRoleRepo, Self::RoleRepo>;

    fn role_permission_service(
        &self,
    ) -> &RolePermissionService<Self::RolePermissionRepo, Self::RoleRepo, Self::PermissionRepo>;

    fn authorization_service(
        &self,
    ) -> &AuthorizationService<Self::UserRoleRepo, Self::RolePermissionRepo>;

    /// Get the JWT manager for token verification
    fn jwt_manager(&self) -> &JwtManager;

    /// `None` when metrics are disabled
    fn prometheus_handle(&self) -> Option<&PrometheusHandle>;

    /// Whether the backing store answers
    fn check_ready(&self) -> impl std::future::Future<Output = bool> + Send;
}
