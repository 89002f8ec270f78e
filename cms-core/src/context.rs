//! Caller context passed explicitly into authorization checks

use crate::domain::StringUuid;
use std::collections::HashSet;
use uuid::Uuid;

/// Who is calling, and which permission claims were materialised for them
/// at sign-in. Anonymous callers have no user id and no claims.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    user_id: Option<Uuid>,
    permissions: HashSet<String>,
}

impl CallerContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated<I, S>(user_id: Uuid, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_id: Some(user_id),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn user_id(&self) -> Option<StringUuid> {
        self.user_id.map(StringUuid::from)
    }

    pub fn has_claim(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn permissions(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }
}
