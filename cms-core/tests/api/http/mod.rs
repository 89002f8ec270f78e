//! HTTP handler tests
//!
//! `TestAppState` implements `HasServices` over the in-memory repositories so
//! the production `build_router()` runs without MySQL.

pub mod permission_http_test;
pub mod role_http_test;
pub mod system_http_test;

use super::{
    test_config, TestPermissionRepository, TestRolePermissionRepository, TestRoleRepository,
    TestServices, TestUserRoleRepository,
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use cms_core::config::Config;
use cms_core::domain::admin;
use cms_core::jwt::JwtManager;
use cms_core::registry::ModuleRegistry;
use cms_core::server::build_router;
use cms_core::service::{
    AuthorizationService, PermissionService, RolePermissionService, RoleService, UserRoleService,
};
use cms_core::state::HasServices;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

// ============================================================================
// Test state
// ============================================================================

#[derive(Clone)]
pub struct TestAppState {
    pub config: Arc<Config>,
    pub services: Arc<TestServices>,
    pub jwt_manager: JwtManager,
}

impl TestAppState {
    pub fn new() -> Self {
        let config = test_config();
        let services = Arc::new(TestServices::new(&config));
        let jwt_manager = JwtManager::new(config.jwt.clone());
        Self {
            config: Arc::new(config),
            services,
            jwt_manager,
        }
    }

    /// Bearer token for a fresh user holding `permissions` as claims
    pub fn token_with(&self, permissions: &[&str]) -> String {
        self.token_for(Uuid::new_v4(), permissions)
    }

    pub fn token_for(&self, user_id: Uuid, permissions: &[&str]) -> String {
        self.jwt_manager
            .issue_access_token(
                user_id,
                permissions.iter().map(|p| p.to_string()).collect(),
            )
            .unwrap()
    }

    /// Token carrying every admin permission
    pub fn admin_token(&self) -> String {
        self.token_with(&[
            admin::PERMISSIONS_MANAGE,
            admin::ROLES_MANAGE,
            admin::USERS_MANAGE,
            admin::USERS_IMPERSONATE,
        ])
    }
}

impl HasServices for TestAppState {
    type PermissionRepo = TestPermissionRepository;
    type RoleRepo = TestRoleRepository;
    type UserRoleRepo = TestUserRoleRepository;
    type RolePermissionRepo = TestRolePermissionRepository;

    fn config(&self) -> &Config {
        &self.config
    }

    fn modules(&self) -> &ModuleRegistry {
        &self.services.modules
    }

    fn permission_service(&self) -> &PermissionService<Self::PermissionRepo> {
        &self.services.permission_service
    }

    fn role_service(&self) -> &RoleService<Self::RoleRepo, Self::UserRoleRepo> {
        &self.services.role_service
    }

    fn user_role_service(&self) -> &UserRoleService<Self::UserRoleRepo, Self::RoleRepo> {
        &self.services.user_role_service
    }

    fn role_permission_service(
        &self,
    ) -> &RolePermissionService<Self::RolePermissionRepo, Self::RoleRepo, Self::PermissionRepo>
    {
        &self.services.role_permission_service
    }

    fn authorization_service(
        &self,
    ) -> &AuthorizationService<Self::UserRoleRepo, Self::RolePermissionRepo> {
        &self.services.authorization_service
    }

    fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }

    fn prometheus_handle(&self) -> Option<&PrometheusHandle> {
        None
    }

    async fn check_ready(&self) -> bool {
        true
    }
}

pub fn build_test_router(state: TestAppState) -> Router {
    build_router(state)
}

// ============================================================================
// Request helpers
// ============================================================================

async fn send<R: DeserializeOwned>(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<String>,
) -> (StatusCode, Option<R>) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Option<R> = serde_json::from_slice(&bytes).ok();

    (status, body)
}

pub async fn get_json<R: DeserializeOwned>(
    app: &Router,
    path: &str,
    token: Option<&str>,
) -> (StatusCode, Option<R>) {
    send(app, Method::GET, path, token, None).await
}

pub async fn post_json<T: Serialize, R: DeserializeOwned>(
    app: &Router,
    path: &str,
    token: Option<&str>,
    body: &T,
) -> (StatusCode, Option<R>) {
    let json = serde_json::to_string(body).unwrap();
    send(app, Method::POST, path, token, Some(json)).await
}

pub async fn put_json<T: Serialize, R: DeserializeOwned>(
    app: &Router,
    path: &str,
    token: Option<&str>,
    body: &T,
) -> (StatusCode, Option<R>) {
    let json = serde_json::to_string(body).unwrap();
    send(app, Method::PUT, path, token, Some(json)).await
}

pub async fn delete_json<R: DeserializeOwned>(
    app: &Router,
    path: &str,
    token: Option<&str>,
) -> (StatusCode, Option<R>) {
    send(app, Method::DELETE, path, token, None).await
}

/// POST without a body, for action endpoints like restore
pub async fn post_empty<R: DeserializeOwned>(
    app: &Router,
    path: &str,
    token: Option<&str>,
) -> (StatusCode, Option<R>) {
    send(app, Method::POST, path, token, None).await
}

/// Raw text body, for endpoints that do not answer JSON
pub async fn get_text(app: &Router, path: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&bytes).to_string())
}
