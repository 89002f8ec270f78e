//! Filter / sort / paginate request types shared by the admin list views

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Largest offset a SQL `OFFSET` bind can carry
pub const MAX_SKIP: u64 = i64::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Unknown or missing values sort ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "desc" || s == "descending" => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Orient an ascending comparison
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// A closed set of sortable columns for one entity.
pub trait SortColumn: Copy + Default + PartialEq + std::fmt::Debug + Send + Sync {
    /// Case-insensitive lookup; `None` for unknown columns.
    fn parse(name: &str) -> Option<Self>;

    /// Column expression used in ORDER BY. Never user input.
    fn as_sql(&self) -> &'static str;
}

/// Raw list parameters as they arrive from the admin UI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, alias = "sort")]
    pub sort_column: Option<String>,
    #[serde(default, alias = "dir")]
    pub sort_direction: Option<String>,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub take: u64,
}

impl PageRequest {
    /// Effective `(skip, take)`: zero take means the default page size,
    /// larger requests are clamped. `skip` is clamped to [`MAX_SKIP`].
    pub fn window(&self) -> (u64, u64) {
        let take = match self.take {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        (self.skip.min(MAX_SKIP), take)
    }
}

/// Normalised list query handed to repositories
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery<C: SortColumn> {
    /// Lower-cased, trimmed search term; `None` matches everything
    pub search: Option<String>,
    pub sort: C,
    pub direction: SortDirection,
    pub skip: u64,
    pub take: u64,
}

impl<C: SortColumn> PageQuery<C> {
    pub fn from_request(request: &PageRequest) -> Self {
        let search = request
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let sort = request
            .sort_column
            .as_deref()
            .and_then(C::parse)
            .unwrap_or_default();
        let (skip, take) = request.window();

        Self {
            search,
            sort,
            direction: SortDirection::parse(request.sort_direction.as_deref()),
            skip,
            take,
        }
    }

    /// Whether any of `fields` contains the search term, ignoring case
    pub fn matches(&self, fields: &[&str]) -> bool {
        match &self.search {
            None => true,
            Some(term) => fields.iter().any(|f| f.to_lowercase().contains(term)),
        }
    }

    /// SQL LIKE pattern for the search term with wildcards escaped
    pub fn like_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|term| {
            let escaped = term
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{}%", escaped)
        })
    }
}

/// One page of results plus the count of every matching row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub total_count: u64,
    pub items: Vec<T>,
}

impl<T> PagedResult<T> {
    pub fn new(total_count: u64, items: Vec<T>) -> Self {
        Self { total_count, items }
    }

    pub fn empty() -> Self {
        Self::new(0, vec![])
    }
}
