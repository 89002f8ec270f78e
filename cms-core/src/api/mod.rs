//! REST API shared utilities (response types, paging, permission gate)

pub mod health;
pub mod metrics;
pub mod permission;
pub mod role;
pub mod user_role;

use crate::context::CallerContext;
use crate::domain::{PageRequest, PagedResult, StringUuid};
use crate::error::{AppError, Result};
use crate::state::HasServices;
use serde::{Deserialize, Serialize};

/// Require `permission` from the caller and return the acting user id.
pub(crate) fn authorize<S: HasServices>(
    state: &S,
    caller: &CallerContext,
    permission: &str,
) -> Result<StringUuid> {
    state
        .authorization_service()
        .require_permission(caller, permission)?;
    caller
        .user_id()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}

/// Paged list wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    pub skip: u64,
    pub take: u64,
    pub total_count: u64,
}

impl<T: Serialize> PaginatedResponse<T> {
    /// Echoes the effective window of `request` after defaults and clamping
    pub fn from_page(page: PagedResult<T>, request: &PageRequest) -> Self {
        let (skip, take) = request.window();
        Self {
            data: page.items,
            pagination: PaginationMeta {
                skip,
                take,
                total_count: page.total_count,
            },
        }
    }
}

/// Success response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Message response (for delete, etc.)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
