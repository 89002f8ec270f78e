//! Business logic layer

pub mod authorization;
pub mod permission;
pub mod role;
pub mod role_permission;
pub mod user_role;

pub use authorization::AuthorizationService;
pub use permission::PermissionService;
pub use role::RoleService;
pub use role_permission::RolePermissionService;
pub use user_role::UserRoleService;
