//! User role assignment, permission lookup and impersonation handlers

use crate::api::{authorize, MessageResponse, SuccessResponse};
use crate::domain::admin::{USERS_IMPERSONATE, USERS_MANAGE};
use crate::domain::{AssignRoleInput, StringUuid, UserRole, UserRoleView};
use crate::error::Result;
use crate::middleware::Caller;
use crate::state::HasServices;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AssignRoleBody {
    pub role_id: Uuid,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub is_system_assigned: bool,
}

#[derive(Debug, Deserialize)]
pub struct ModuleScope {
    #[serde(default)]
    pub module: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PrimaryRoleBody {
    pub role_id: StringUuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PrimaryRoleResponse {
    pub role_id: Option<StringUuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PermissionCheckResponse {
    pub permission: String,
    pub granted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub async fn list_roles<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(user_id): Path<StringUuid>,
) -> Result<Json<SuccessResponse<Vec<UserRoleView>>>> {
    authorize(&state, &caller, USERS_MANAGE)?;
    let roles = state.user_role_service().get_roles_for_user(user_id).await?;
    Ok(Json(SuccessResponse::new(roles)))
}

pub async fn assign_role<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(user_id): Path<StringUuid>,
    Json(body): Json<AssignRoleBody>,
) -> Result<(StatusCode, Json<SuccessResponse<UserRole>>)> {
    let actor = authorize(&state, &caller, USERS_MANAGE)?;
    let input = AssignRoleInput {
        user_id: *user_id,
        role_id: body.role_id,
        module: body.module,
        is_system_assigned: body.is_system_assigned,
    };
    let assignment = state.user_role_service().assign(input, actor).await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(assignment))))
}

/// `?module=` selects a module-scoped assignment
pub async fn unassign_role<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path((user_id, role_id)): Path<(StringUuid, StringUuid)>,
    Query(scope): Query<ModuleScope>,
) -> Result<Json<MessageResponse>> {
    authorize(&state, &caller, USERS_MANAGE)?;
    state
        .user_role_service()
        .unassign(user_id, role_id, scope.module.as_deref())
        .await?;
    Ok(Json(MessageResponse::new("Role unassigned")))
}

pub async fn get_primary_role<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(user_id): Path<StringUuid>,
) -> Result<Json<SuccessResponse<PrimaryRoleResponse>>> {
    authorize(&state, &caller, USERS_MANAGE)?;
    let role_id = state
        .role_service()
        .get_primary_role_id_for_user(user_id)
        .await?;
    Ok(Json(SuccessResponse::new(PrimaryRoleResponse { role_id })))
}

pub async fn set_primary_role<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(user_id): Path<StringUuid>,
    Json(body): Json<PrimaryRoleBody>,
) -> Result<Json<SuccessResponse<PrimaryRoleResponse>>> {
    authorize(&state, &caller, USERS_MANAGE)?;
    state
        .user_role_service()
        .set_primary(user_id, body.role_id)
        .await?;
    Ok(Json(SuccessResponse::new(PrimaryRoleResponse {
        role_id: Some(body.role_id),
    })))
}

/// Stored-permission check for a user, evaluated against the role tables
pub async fn check_permission<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path((user_id, permission)): Path<(StringUuid, String)>,
) -> Result<Json<SuccessResponse<PermissionCheckResponse>>> {
    authorize(&state, &caller, USERS_MANAGE)?;
    let granted = state
        .authorization_service()
        .has_permission_for_user(user_id, &permission)
        .await?;
    Ok(Json(SuccessResponse::new(PermissionCheckResponse {
        permission,
        granted,
    })))
}

/// Mint an access token for another user, with claims from their roles.
/// The target's permissions must be covered by the caller's own claims.
pub async fn impersonate<S: HasServices>(
    State(state): State<S>,
    Caller(caller): Caller,
    Path(user_id): Path<StringUuid>,
) -> Result<Json<SuccessResponse<TokenResponse>>> {
    let actor = authorize(&state, &caller, USERS_IMPERSONATE)?;
    let permissions = state
        .authorization_service()
        .get_permission_names_for_user(user_id)
        .await?;
    // The minted token may never exceed what the impersonator already holds
    state
        .authorization_service()
        .require_claims_cover(&caller, &permissions)?;

    let jwt = state.jwt_manager();
    let access_token = jwt.issue_impersonation_token(*user_id, permissions, *actor)?;
    info!(user_id = %user_id, impersonator = %actor, "impersonation token issued");

    Ok(Json(SuccessResponse::new(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt.access_token_ttl_secs(),
    })))
}
