//! Server initialization and routing

use crate::api;
use crate::config::Config;
use crate::error::set_expose_internal_errors;
use crate::jwt::JwtManager;
use crate::middleware::ObservabilityLayer;
use crate::migration;
use crate::registry::ModuleRegistry;
use crate::repository::{
    permission::PermissionRepositoryImpl, role::RoleRepositoryImpl,
    role_permission::RolePermissionRepositoryImpl, user_role::UserRoleRepositoryImpl,
};
use crate::service::{
    AuthorizationService, PermissionService, RolePermissionService, RoleService, UserRoleService,
};
use crate::state::HasServices;
use anyhow::Result;
use axum::{
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: MySqlPool,
    pub modules: Arc<ModuleRegistry>,
    pub permission_service: Arc<PermissionService<PermissionRepositoryImpl>>,
    pub role_service: Arc<RoleService<RoleRepositoryImpl, UserRoleRepositoryImpl>>,
    pub user_role_service: Arc<UserRoleService<UserRoleRepositoryImpl, RoleRepositoryImpl>>,
    pub role_permission_service: Arc<
        RolePermissionService<
            RolePermissionRepositoryImpl,
            RoleRepositoryImpl,
            PermissionRepositoryImpl,
        >,
    >,
    pub authorization_service:
        Arc<AuthorizationService<UserRoleRepositoryImpl, RolePermissionRepositoryImpl>>,
    pub jwt_manager: JwtManager,
    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Config, db_pool: MySqlPool, prometheus_handle: Option<PrometheusHandle>) -> Self {
        let modules = Arc::new(ModuleRegistry::from_names(&config.modules));

        let permission_repo = Arc::new(PermissionRepositoryImpl::new(db_pool.clone()));
        let role_repo = Arc::new(RoleRepositoryImpl::new(db_pool.clone()));
        let user_role_repo = Arc::new(UserRoleRepositoryImpl::new(db_pool.clone()));
        let role_permission_repo = Arc::new(RolePermissionRepositoryImpl::new(db_pool.clone()));

        let permission_service = Arc::new(PermissionService::new(permission_repo.clone()));
        let role_service = Arc::new(RoleService::new(
            role_repo.clone(),
            user_role_repo.clone(),
            modules.clone(),
            &config.access,
        ));
        let user_role_service = Arc::new(UserRoleService::new(
            user_role_repo.clone(),
            role_repo.clone(),
            modules.clone(),
        ));
        let role_permission_service = Arc::new(RolePermissionService::new(
            role_permission_repo.clone(),
            role_repo,
            permission_repo,
        ));
        let authorization_service = Arc::new(AuthorizationService::new(
            user_role_repo,
            role_permission_repo,
            config.access.full_admin_permission.clone(),
        ));

        let jwt_manager = JwtManager::new(config.jwt.clone());

        Self {
            config: Arc::new(config),
            db_pool,
            modules,
            permission_service,
            role_service,
            user_role_service,
            role_permission_service,
            authorization_service,
            jwt_manager,
            prometheus_handle,
        }
    }
}

impl HasServices for AppState {
    type PermissionRepo = PermissionRepositoryImpl;
    type RoleRepo = RoleRepositoryImpl;
    type UserRoleRepo = UserRoleRepositoryImpl;
    type RolePermissionRepo = RolePermissionRepositoryImpl;

    fn config(&self) -> &Config {
        &self.config
    }

    fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    fn permission_service(&self) -> &PermissionService<Self::PermissionRepo> {
        &self.permission_service
    }

    fn role_service(&self) -> &RoleService<Self::RoleRepo, Self::UserRoleRepo> {
        &self.role_service
    }

    fn user_role_service(&self) -> &UserRoleService<Self::UserRoleRepo, Self::RoleRepo> {
        &self.user_role_service
    }

    fn role_permission_service(
        &self,
    ) -> &RolePermissionService<Self::RolePermissionRepo, Self::RoleRepo, Self::PermissionRepo>
    {
        &self.role_permission_service
    }

    fn authorization_service(
        &self,
    ) -> &AuthorizationService<Self::UserRoleRepo, Self::RolePermissionRepo> {
        &self.authorization_service
    }

    fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }

    fn prometheus_handle(&self) -> Option<&PrometheusHandle> {
        self.prometheus_handle.as_ref()
    }

    async fn check_ready(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.db_pool).await.is_ok()
    }
}

/// Run the HTTP server until shutdown
pub async fn run(config: Config, prometheus_handle: Option<PrometheusHandle>) -> Result<()> {
    set_expose_internal_errors(config.is_development());

    migration::ensure_database_exists(&config).await?;

    let db_pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.url)
        .await?;
    info!("Connected to database");

    migration::run_migrations(&db_pool).await?;
    migration::seed_system_access(&db_pool, &config.access).await?;

    let http_addr = config.http_addr();
    let state = AppState::new(config, db_pool, prometheus_handle);
    info!(modules = ?state.modules.names().collect::<Vec<_>>(), "module registry loaded");

    let app = build_router(state);

    let listener = TcpListener::bind(&http_addr).await?;
    info!("HTTP server started on {}", http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}

/// Build the HTTP router with generic state type
///
/// Generic over the state so tests drive the same routes with in-memory
/// repositories.
pub fn build_router<S: HasServices>(state: S) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready::<S>))
        .route("/metrics", get(api::metrics::metrics_handler::<S>))
        // Permissions
        .route(
            "/api/v1/permissions",
            get(api::permission::list::<S>).post(api::permission::create::<S>),
        )
        .route(
            "/api/v1/permissions/deleted",
            get(api::permission::list_deleted::<S>),
        )
        .route(
            "/api/v1/permissions/{id}",
            get(api::permission::get::<S>)
                .put(api::permission::update::<S>)
                .delete(api::permission::soft_delete::<S>),
        )
        .route(
            "/api/v1/permissions/{id}/restore",
            post(api::permission::restore::<S>),
        )
        .route(
            "/api/v1/permissions/{id}/purge",
            delete(api::permission::purge::<S>),
        )
        // Roles
        .route(
            "/api/v1/roles",
            get(api::role::list::<S>).post(api::role::create::<S>),
        )
        .route("/api/v1/roles/all", get(api::role::list_all::<S>))
        .route("/api/v1/roles/deleted", get(api::role::list_deleted::<S>))
        .route(
            "/api/v1/roles/{id}",
            get(api::role::get::<S>)
                .put(api::role::update::<S>)
                .delete(api::role::delete::<S>),
        )
        .route(
            "/api/v1/roles/{id}/soft-delete",
            post(api::role::soft_delete::<S>),
        )
        .route("/api/v1/roles/{id}/restore", post(api::role::restore::<S>))
        .route(
            "/api/v1/roles/{id}/permissions",
            get(api::role::list_permissions::<S>).put(api::role::set_permissions::<S>),
        )
        .route(
            "/api/v1/roles/{id}/permissions/{permission_id}",
            post(api::role::grant_permission::<S>).delete(api::role::revoke_permission::<S>),
        )
        // User role assignments
        .route(
            "/api/v1/users/{id}/roles",
            get(api::user_role::list_roles::<S>).post(api::user_role::assign_role::<S>),
        )
        .route(
            "/api/v1/users/{id}/roles/{role_id}",
            delete(api::user_role::unassign_role::<S>),
        )
        .route(
            "/api/v1/users/{id}/primary-role",
            get(api::user_role::get_primary_role::<S>).put(api::user_role::set_primary_role::<S>),
        )
        .route(
            "/api/v1/users/{id}/permissions/{name}",
            get(api::user_role::check_permission::<S>),
        )
        .route(
            "/api/v1/users/{id}/impersonate",
            post(api::user_role::impersonate::<S>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(ObservabilityLayer)
        .layer(cors)
        .with_state(state)
}
