//! Permission API HTTP handler tests

use super::{
    build_test_router, delete_json, get_json, post_empty, post_json, put_json, TestAppState,
};
use cms_core::api::{MessageResponse, PaginatedResponse, SuccessResponse};
use cms_core::domain::{admin, Permission, MAX_SKIP};
use axum::http::StatusCode;
use serde_json::json;

async fn seed(state: &TestAppState, names: &[&str]) -> Vec<Permission> {
    let mut created = vec![];
    for name in names {
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
        created.push(permission);
    }
    created
}

#[tokio::test]
async fn test_list_permissions_requires_authentication() {
    let state = TestAppState::new();
    let app = build_test_router(state);

    let (status, _): (StatusCode, Option<serde_json::Value>) =
        get_json(&app, "/api/v1/permissions", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_permissions_requires_manage_permission() {
    let state = TestAppState::new();
    let token = state.token_with(&["pages.edit"]);
    let app = build_test_router(state);

    let (status, _): (StatusCode, Option<serde_json::Value>) =
        get_json(&app, "/api/v1/permissions", Some(&token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let state = TestAppState::new();
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<serde_json::Value>) =
        get_json(&app, "/api/v1/permissions", Some("not-a-jwt")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body.unwrap()["error"], "unauthorized");
}

#[tokio::test]
async fn test_list_permissions_paged() {
    let state = TestAppState::new();
    seed(&state, &["b.view", "a.view", "c.view"]).await;
    let token = state.token_with(&[admin::PERMISSIONS_MANAGE]);
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<PaginatedResponse<Permission>>) = get_json(
        &app,
        "/api/v1/permissions?sort_column=name&sort_direction=desc&skip=0&take=2",
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response = body.unwrap();
    let names: Vec<&str> = response.data.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["c.view", "b.view"]);
    assert_eq!(response.pagination.total_count, 3);
    assert_eq!(response.pagination.take, 2);
}

#[tokio::test]
async fn test_list_permissions_oversized_skip_is_clamped() {
    let state = TestAppState::new();
    seed(&state, &["a.view"]).await;
    let token = state.token_with(&[admin::PERMISSIONS_MANAGE]);
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<PaginatedResponse<Permission>>) = get_json(
        &app,
        &format!("/api/v1/permissions?skip={}", u64::MAX),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response = body.unwrap();
    assert!(response.data.is_empty());
    assert_eq!(response.pagination.skip, MAX_SKIP);
    assert_eq!(response.pagination.total_count, 1);
}

#[tokio::test]
async fn test_full_admin_claim_passes_every_gate() {
    let state = TestAppState::new();
    seed(&state, &["pages.view"]).await;
    let token = state.token_with(&["full_admin_access"]);
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<PaginatedResponse<Permission>>) =
        get_json(&app, "/api/v1/permissions", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap().data.len(), 1);
}

#[tokio::test]
async fn test_create_permission() {
    let state = TestAppState::new();
    let token = state.token_with(&[admin::PERMISSIONS_MANAGE]);
    let app = build_test_router(state.clone());

    let input = json!({ "name": "pages.publish", "display_name": "Publish pages" });
    let (status, body): (StatusCode, Option<SuccessResponse<Permission>>) =
        post_json(&app, "/api/v1/permissions", Some(&token), &input).await;

    assert_eq!(status, StatusCode::CREATED);
    let permission = body.unwrap().data;
    assert_eq!(permission.name, "pages.publish");
    assert_eq!(permission.display_name, "Publish pages");
    assert!(!permission.is_system);

    let (status, _): (StatusCode, Option<serde_json::Value>) =
        post_json(&app, "/api/v1/permissions", Some(&token), &input).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_permission_invalid_name() {
    let state = TestAppState::new();
    let token = state.token_with(&[admin::PERMISSIONS_MANAGE]);
    let app = build_test_router(state);

    let input = json!({ "name": "Not A Name!" });
    let (status, _): (StatusCode, Option<serde_json::Value>) =
        post_json(&app, "/api/v1/permissions", Some(&token), &input).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_permission() {
    let state = TestAppState::new();
    let created = seed(&state, &["menus.edit"]).await;
    let token = state.token_with(&[admin::PERMISSIONS_MANAGE]);
    let app = build_test_router(state);

    let input = json!({ "name": "menus.write", "display_name": "Write menus" });
    let (status, body): (StatusCode, Option<SuccessResponse<Permission>>) = put_json(
        &app,
        &format!("/api/v1/permissions/{}", created[0].id),
        Some(&token),
        &input,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let updated = body.unwrap().data;
    assert_eq!(updated.name, "menus.write");
    assert_eq!(updated.display_name, "Write menus");
}

#[tokio::test]
async fn test_get_permission_not_found() {
    let state = TestAppState::new();
    let token = state.token_with(&[admin::PERMISSIONS_MANAGE]);
    let app = build_test_router(state);

    let (status, _): (StatusCode, Option<serde_json::Value>) = get_json(
        &app,
        &format!("/api/v1/permissions/{}", uuid::Uuid::new_v4()),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_soft_delete_restore_and_purge() {
    let state = TestAppState::new();
    let created = seed(&state, &["files.upload"]).await;
    let id = created[0].id;
    let token = state.token_with(&[admin::PERMISSIONS_MANAGE]);
    let app = build_test_router(state);

    // Purge is refused while the permission is live
    let (status, _): (StatusCode, Option<serde_json::Value>) = delete_json(
        &app,
        &format!("/api/v1/permissions/{}/purge", id),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _): (StatusCode, Option<MessageResponse>) =
        delete_json(&app, &format!("/api/v1/permissions/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body): (StatusCode, Option<SuccessResponse<Vec<Permission>>>) =
        get_json(&app, "/api/v1/permissions/deleted", Some(&token)).await;
    assert_eq!(body.unwrap().data.len(), 1);

    let (status, body): (StatusCode, Option<SuccessResponse<Permission>>) = post_empty(
        &app,
        &format!("/api/v1/permissions/{}/restore", id),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let restored = body.unwrap().data;
    assert!(!restored.is_deleted);
    assert_eq!(restored.name, "files.upload");

    let (_, _): (StatusCode, Option<MessageResponse>) =
        delete_json(&app, &format!("/api/v1/permissions/{}", id), Some(&token)).await;
    let (status, _): (StatusCode, Option<MessageResponse>) = delete_json(
        &app,
        &format!("/api/v1/permissions/{}/purge", id),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _): (StatusCode, Option<serde_json::Value>) =
        get_json(&app, &format!("/api/v1/permissions/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_system_permission_cannot_be_deleted() {
    let state = TestAppState::new();
    let system = state
        .services
        .permissions
        .add_system_permission(admin::ROLES_MANAGE)
        .await;
    let token = state.token_with(&[admin::PERMISSIONS_MANAGE]);
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<serde_json::Value>) = delete_json(
        &app,
        &format!("/api/v1/permissions/{}", system.id),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_some());
}
