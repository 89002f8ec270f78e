//! Permission API handlers

use crate::api::{authorize, MessageResponse, PaginatedResponse, SuccessResponse};
use crate::domain::admin::PERMISSIONS_MANAGE;
use crate::domain::{
    CreatePermissionInput, PageRequest, Permission, StringUuid, UpdatePermissionInput,
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

/// Body of PUT /permissions/{id}; the id comes from the path
#[derive(Debug, Deserialize)]
pub struct UpdatePermissionBody {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Paged, searchable list of live permissions
pub async fn list<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Query(request): Query<PageRequest>,
) -> Result<Json<PaginatedResponse<Permission>>> {
    authorize(&state, &caller, PERMISSIONS_MANAGE)?;
    let page = state.permission_service().get_paged_list(&request).await?;
    Ok(Json(PaginatedResponse::from_page(page, &request)))
}

pub async fn list_deleted<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
) -> Result<Json<SuccessResponse<Vec<Permission>>>> {
    authorize(&state, &caller, PERMISSIONS_MANAGE)?;
    let permissions = state.permission_service().get_deleted().await?;
    Ok(Json(SuccessResponse::new(permissions)))
}

pub async fn get<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(id): Path<StringUuid>,
) -> Result<Json<SuccessResponse<Permission>>> {
    authorize(&state, &caller, PERMISSIONS_MANAGE)?;
    let permission = state.permission_service().get(id).await?;
    Ok(Json(SuccessResponse::new(permission)))
}

pub async fn create<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Json(input): Json<CreatePermissionInput>,
) -> Result<(StatusCode, Json<SuccessResponse<Permission>>)> {
    let actor = authorize(&state, &caller, PERMISSIONS_MANAGE)?;
    let permission = state.permission_service().create(input, actor).await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(permission))))
}

pub async fn update<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(id): Path<StringUuid>,
    Json(body): Json<UpdatePermissionBody>,
) -> Result<Json<SuccessResponse<Permission>>> {
    let actor = authorize(&state, &caller, PERMISSIONS_MANAGE)?;
    let input = UpdatePermissionInput {
        id: *id,
        name: body.name,
        display_name: body.display_name,
    };
    let permission = state.permission_service().update(input, actor).await?;
    Ok(Json(SuccessResponse::new(permission)))
}

/// DELETE moves the permission to the recycle bin
pub async fn soft_delete<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(id): Path<StringUuid>,
) -> Result<Json<MessageResponse>> {
    let actor = authorize(&state, &caller, PERMISSIONS_MANAGE)?;
    state.permission_service().soft_delete(id, actor).await?;
    Ok(Json(MessageResponse::new("Permission moved to recycle bin")))
}

pub async fn restore<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(id): Path<StringUuid>,
) -> Result<Json<SuccessResponse<Permission>>> {
    let actor = authorize(&state, &caller, PERMISSIONS_MANAGE)?;
    let service = state.permission_service();
    service.restore(id, actor).await?;
    let permission = service.get(id).await?;
    Ok(Json(SuccessResponse::new(permission)))
}

/// Permanently remove a permission that is already in the recycle bin
pub async fn purge<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(id): Path<StringUuid>,
) -> Result<Json<MessageResponse>> {
    authorize(&state, &caller, PERMISSIONS_MANAGE)?;
    state.permission_service().hard_delete(id).await?;
    Ok(Json(MessageResponse::new("Permission purged")))
}
