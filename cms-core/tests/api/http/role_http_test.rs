//! Role and role-permission API HTTP handler tests

use super::{
    build_test_router, delete_json, get_json, post_empty, post_json, put_json, TestAppState,
};
use cms_core::api::{MessageResponse, PaginatedResponse, SuccessResponse};
use cms_core::domain::{admin, Permission, Role};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::json;

/// `RoleWithPermissions` only serializes, so tests read it back through this
#[derive(Debug, Deserialize)]
struct TestRoleWithPermissions {
    #[serde(flatten)]
    role: Role,
    permissions: Vec<Permission>,
}

async fn seed_role(state: &TestAppState, name: &str) -> Role {
    let role = Role {
        name: name.to_string(),
        display_name: name.to_string(),
        ..Default::default()
    };
    state.services.roles.add_role(role.clone()).await;
    role
}

async fn seed_permission(state: &TestAppState, name: &str) -> Permission {
    let permission = Permission {
        name: name.to_string(),
        display_name: name.to_string(),
        ..Default::default()
    };
    state
        .services
        .permissions
        .add_permission(permission.clone())
        .await;
    permission
}

#[tokio::test]
async fn test_create_role() {
    let state = TestAppState::new();
    let token = state.token_with(&[admin::ROLES_MANAGE]);
    let app = build_test_router(state);

    let input = json!({ "name": "editor", "module": "pages", "display_order": 2 });
    let (status, body): (StatusCode, Option<SuccessResponse<Role>>) =
        post_json(&app, "/api/v1/roles", Some(&token), &input).await;

    assert_eq!(status, StatusCode::CREATED);
    let role = body.unwrap().data;
    assert_eq!(role.name, "editor");
    assert_eq!(role.display_name, "editor");
    assert_eq!(role.module.as_deref(), Some("pages"));
    assert!(role.is_active);

    let (status, _): (StatusCode, Option<serde_json::Value>) =
        post_json(&app, "/api/v1/roles", Some(&token), &input).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_role_unknown_module() {
    let state = TestAppState::new();
    let token = state.token_with(&[admin::ROLES_MANAGE]);
    let app = build_test_router(state);

    let input = json!({ "name": "auditor", "module": "billing" });
    let (status, _): (StatusCode, Option<serde_json::Value>) =
        post_json(&app, "/api/v1/roles", Some(&token), &input).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_roles_require_roles_manage() {
    let state = TestAppState::new();
    let token = state.token_with(&[admin::PERMISSIONS_MANAGE]);
    let app = build_test_router(state);

    let (status, _): (StatusCode, Option<serde_json::Value>) =
        get_json(&app, "/api/v1/roles", Some(&token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_deactivated_role_leaves_active_list() {
    let state = TestAppState::new();
    let editor = seed_role(&state, "editor").await;
    seed_role(&state, "author").await;
    let token = state.token_with(&[admin::ROLES_MANAGE]);
    let app = build_test_router(state);

    let input = json!({ "display_name": "Editor", "is_active": false });
    let (status, body): (StatusCode, Option<SuccessResponse<Role>>) = put_json(
        &app,
        &format!("/api/v1/roles/{}", editor.id),
        Some(&token),
        &input,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated = body.unwrap().data;
    assert!(!updated.is_active);
    assert_eq!(updated.name, "editor");
    assert_eq!(updated.display_name, "Editor");

    let (_, body): (StatusCode, Option<SuccessResponse<Vec<Role>>>) =
        get_json(&app, "/api/v1/roles/all", Some(&token)).await;
    let active: Vec<String> = body.unwrap().data.into_iter().map(|r| r.name).collect();
    assert_eq!(active, vec!["author".to_string()]);

    // Inactive roles stay in the paged admin list
    let (_, body): (StatusCode, Option<PaginatedResponse<Role>>) =
        get_json(&app, "/api/v1/roles", Some(&token)).await;
    assert_eq!(body.unwrap().pagination.total_count, 2);
}

#[tokio::test]
async fn test_role_soft_delete_and_restore() {
    let state = TestAppState::new();
    let role = seed_role(&state, "translator").await;
    let token = state.token_with(&[admin::ROLES_MANAGE]);
    let app = build_test_router(state);

    let (status, _): (StatusCode, Option<MessageResponse>) = post_empty(
        &app,
        &format!("/api/v1/roles/{}/soft-delete", role.id),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body): (StatusCode, Option<PaginatedResponse<Role>>) =
        get_json(&app, "/api/v1/roles", Some(&token)).await;
    assert_eq!(body.unwrap().pagination.total_count, 0);

    let (_, body): (StatusCode, Option<SuccessResponse<Vec<Role>>>) =
        get_json(&app, "/api/v1/roles/deleted", Some(&token)).await;
    assert_eq!(body.unwrap().data.len(), 1);

    let (status, body): (StatusCode, Option<SuccessResponse<Role>>) = post_empty(
        &app,
        &format!("/api/v1/roles/{}/restore", role.id),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.unwrap().data.is_deleted);
}

#[tokio::test]
async fn test_system_role_cannot_be_deleted() {
    let state = TestAppState::new();
    let role = Role {
        name: "administrator".to_string(),
        display_name: "Administrator".to_string(),
        is_system: true,
        ..Default::default()
    };
    state.services.roles.add_role(role.clone()).await;
    let token = state.token_with(&[admin::ROLES_MANAGE]);
    let app = build_test_router(state);

    let (status, _): (StatusCode, Option<serde_json::Value>) =
        delete_json(&app, &format!("/api/v1/roles/{}", role.id), Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _): (StatusCode, Option<serde_json::Value>) = post_empty(
        &app,
        &format!("/api/v1/roles/{}/soft-delete", role.id),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_grant_and_revoke_permission() {
    let state = TestAppState::new();
    let role = seed_role(&state, "seo_manager").await;
    let permission = seed_permission(&state, "seo.edit").await;
    let token = state.token_with(&[admin::ROLES_MANAGE]);
    let app = build_test_router(state);

    let path = format!("/api/v1/roles/{}/permissions/{}", role.id, permission.id);
    let (status, _): (StatusCode, Option<MessageResponse>) =
        post_empty(&app, &path, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body): (StatusCode, Option<SuccessResponse<TestRoleWithPermissions>>) =
        get_json(&app, &format!("/api/v1/roles/{}", role.id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let detail = body.unwrap().data;
    assert_eq!(detail.role.id, role.id);
    assert_eq!(detail.permissions.len(), 1);
    assert_eq!(detail.permissions[0].name, "seo.edit");

    let (status, _): (StatusCode, Option<MessageResponse>) =
        delete_json(&app, &path, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body): (StatusCode, Option<SuccessResponse<Vec<Permission>>>) = get_json(
        &app,
        &format!("/api/v1/roles/{}/permissions", role.id),
        Some(&token),
    )
    .await;
    assert!(body.unwrap().data.is_empty());
}

#[tokio::test]
async fn test_grant_unknown_permission_not_found() {
    let state = TestAppState::new();
    let role = seed_role(&state, "viewer").await;
    let token = state.token_with(&[admin::ROLES_MANAGE]);
    let app = build_test_router(state);

    let (status, _): (StatusCode, Option<serde_json::Value>) = post_empty(
        &app,
        &format!(
            "/api/v1/roles/{}/permissions/{}",
            role.id,
            uuid::Uuid::new_v4()
        ),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_permissions_replaces_grants() {
    let state = TestAppState::new();
    let role = seed_role(&state, "menu_editor").await;
    let view = seed_permission(&state, "menus.view").await;
    let edit = seed_permission(&state, "menus.edit").await;
    let token = state.token_with(&[admin::ROLES_MANAGE]);
    let app = build_test_router(state);

    let path = format!("/api/v1/roles/{}/permissions", role.id);
    let (status, body): (StatusCode, Option<SuccessResponse<Vec<Permission>>>) = put_json(
        &app,
        &path,
        Some(&token),
        &json!({ "permission_ids": [view.id, edit.id] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap().data.len(), 2);

    let (_, body): (StatusCode, Option<SuccessResponse<Vec<Permission>>>) = put_json(
        &app,
        &path,
        Some(&token),
        &json!({ "permission_ids": [edit.id] }),
    )
    .await;
    let names: Vec<String> = body.unwrap().data.into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["menus.edit".to_string()]);
}
