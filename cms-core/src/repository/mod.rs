//! Data access layer (Repository pattern)

pub mod permission;
pub mod role;
pub mod role_permission;
pub mod user_role;

pub use permission::PermissionRepository;
pub use role::RoleRepository;
pub use role_permission::RolePermissionRepository;
pub use user_role::UserRoleRepository;

use crate::domain::{PageQuery, SortColumn};
use sqlx::{MySql, QueryBuilder};

/// Append `AND (LOWER(col) LIKE ? OR ...)` for the query's search term.
pub(crate) fn push_search_filter<C: SortColumn>(
    builder: &mut QueryBuilder<'_, MySql>,
    query: &PageQuery<C>,
    columns: &[&str],
) {
    let Some(pattern) = query.like_pattern() else {
        return;
    };

    builder.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            builder.push(" OR ");
        }
        builder.push(format!("LOWER({}) LIKE ", column));
        builder.push_bind(pattern.clone());
    }
    builder.push(")");
}

/// Append ORDER BY / LIMIT / OFFSET. Ties break on name then id so pages are stable.
pub(crate) fn push_order_and_page<C: SortColumn>(
    builder: &mut QueryBuilder<'_, MySql>,
    query: &PageQuery<C>,
) {
    builder.push(format!(
        " ORDER BY {} {}, name ASC, id ASC LIMIT ",
        query.sort.as_sql(),
        query.direction.as_sql()
    ));
    builder.push_bind(i64::try_from(query.take).unwrap_or(i64::MAX));
    builder.push(" OFFSET ");
    builder.push_bind(i64::try_from(query.skip).unwrap_or(i64::MAX));
}
