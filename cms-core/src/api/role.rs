//! Role and role-permission API handlers

use crate::api::{authorize, MessageResponse, PaginatedResponse, SuccessResponse};
use crate::domain::admin::ROLES_MANAGE;
use crate::domain::{
    CreateRoleInput, PageRequest, Permission, Role, RoleWithPermissions, StringUuid,
    UpdateRoleInput,
};
use crate::error::Result;
use crate::middleware::Caller;
use crate::state::HasServices;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

/// Body of PUT /roles/{id}; the id comes from the path
#[derive(Debug, Deserialize)]
pub struct UpdateRoleBody {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SetPermissionsBody {
    pub permission_ids: Vec<StringUuid>,
}

pub async fn list<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Query(request): Query<PageRequest>,
) -> Result<Json<PaginatedResponse<Role>>> {
    authorize(&state, &caller, ROLES_MANAGE)?;
    let page = state.role_service().get_paged_list(&request).await?;
    Ok(Json(PaginatedResponse::from_page(page, &request)))
}

/// Active roles in display order, for pickers
pub async fn list_all<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
) -> Result<Json<SuccessResponse<Vec<Role>>>> {
    authorize(&state, &caller, ROLES_MANAGE)?;
    let roles = state.role_service().get_all_roles().await?;
    Ok(Json(SuccessResponse::new(roles)))
}

pub async fn list_deleted<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
) -> Result<Json<SuccessResponse<Vec<Role>>>> {
    authorize(&state, &caller, ROLES_MANAGE)?;
    let roles = state.role_service().get_deleted().await?;
    Ok(Json(SuccessResponse::new(roles)))
}

pub async fn get<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(id): Path<StringUuid>,
) -> Result<Json<SuccessResponse<RoleWithPermissions>>> {
    authorize(&state, &caller, ROLES_MANAGE)?;
    let role = state
        .role_permission_service()
        .get_role_with_permissions(id)
        .await?;
    Ok(Json(SuccessResponse::new(role)))
}

pub async fn create<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Json(input): Json<CreateRoleInput>,
) -> Result<(StatusCode, Json<SuccessResponse<Role>>)> {
    let actor = authorize(&state, &caller, ROLES_MANAGE)?;
    let role = state.role_service().create(input, actor).await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(role))))
}

pub async fn update<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(id): Path<StringUuid>,
    Json(body): Json<UpdateRoleBody>,
) -> Result<Json<SuccessResponse<Role>>> {
    let actor = authorize(&state, &caller, ROLES_MANAGE)?;
    let input = UpdateRoleInput {
        id: *id,
        display_name: body.display_name,
        description: body.description,
        module: body.module,
        display_order: body.display_order,
        is_active: body.is_active,
    };
    let role = state.role_service().update(input, actor).await?;
    Ok(Json(SuccessResponse::new(role)))
}

/// DELETE removes the role permanently
pub async fn delete<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(id): Path<StringUuid>,
) -> Result<Json<MessageResponse>> {
    authorize(&state, &caller, ROLES_MANAGE)?;
    state.role_service().delete(id).await?;
    Ok(Json(MessageResponse::new("Role deleted")))
}

pub async fn soft_delete<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(id): Path<StringUuid>,
) -> Result<Json<MessageResponse>> {
    let actor = authorize(&state, &caller, ROLES_MANAGE)?;
    state.role_service().soft_delete(id, actor).await?;
    Ok(Json(MessageResponse::new("Role moved to recycle bin")))
}

pub async fn restore<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(id): Path<StringUuid>,
) -> Result<Json<SuccessResponse<Role>>> {
    let actor = authorize(&state, &caller, ROLES_MANAGE)?;
    let service = state.role_service();
    service.restore(id, actor).await?;
    let role = service.get(id).await?;
    Ok(Json(SuccessResponse::new(role)))
}

pub async fn list_permissions<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(id): Path<StringUuid>,
) -> Result<Json<SuccessResponse<Vec<Permission>>>> {
    authorize(&state, &caller, ROLES_MANAGE)?;
    let permissions = state
        .role_permission_service()
        .get_permissions_for_role(id)
        .await?;
    Ok(Json(SuccessResponse::new(permissions)))
}

/// Replace the role's whole permission set
pub async fn set_permissions<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(id): Path<StringUuid>,
    Json(body): Json<SetPermissionsBody>,
) -> Result<Json<SuccessResponse<Vec<Permission>>>> {
    authorize(&state, &caller, ROLES_MANAGE)?;
    let permissions = state
        .role_permission_service()
        .set_permissions_for_role(id, &body.permission_ids)
        .await?;
    Ok(Json(SuccessResponse::new(permissions)))
}

pub async fn grant_permission<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path((id, permission_id)): Path<(StringUuid, StringUuid)>,
) -> Result<Json<MessageResponse>> {
    authorize(&state, &caller, ROLES_MANAGE)?;
    state
        .role_permission_service()
        .assign(id, permission_id)
        .await?;
    Ok(Json(MessageResponse::new("Permission granted")))
}

pub async fn revoke_permission<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path((id, permission_id)): Path<(StringUuid, StringUuid)>,
) -> Result<Json<MessageResponse>> {
    authorize(&state, &caller, ROLES_MANAGE)?;
    state
        .role_permission_service()
        .unassign(id, permission_id)
        .await?;
    Ok(Json(MessageResponse::new("Permission revoked")))
}
