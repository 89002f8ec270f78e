//! Bearer token extraction into an explicit `CallerContext`

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::context::CallerContext;
use crate::state::HasServices;

/// The caller behind a request.
///
/// Requests without an `Authorization` header resolve to an anonymous
/// context; a header that is present but invalid is rejected.
#[derive(Debug, Clone)]
pub struct Caller(pub CallerContext);

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Invalid Authorization header format
    InvalidHeader(String),
    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::InvalidHeader(_) => "Invalid authorization header",
            AuthError::InvalidToken(_) => "Invalid token",
        };
        let body = serde_json::json!({
            "error": "unauthorized",
            "message": message,
        });

        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// `Ok(None)` when no Authorization header is present
fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let auth_header = value
        .to_str()
        .map_err(|_| AuthError::InvalidHeader("Invalid header encoding".to_string()))?;

    match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim())),
        _ => Err(AuthError::InvalidHeader(
            "Authorization header must use Bearer scheme".to_string(),
        )),
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: HasServices + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_bearer_token(&parts.headers)? else {
            return Ok(Caller(CallerContext::anonymous()));
        };

        let claims = state.jwt_manager().verify_access_token(token).map_err(|e| {
            tracing::debug!(error = %e, "access token rejected");
            AuthError::InvalidToken("Token validation failed".to_string())
        })?;

        claims
            .into_context()
            .map(Caller)
            .map_err(|_| AuthError::InvalidToken("Invalid user ID in token".to_string()))
    }
}
