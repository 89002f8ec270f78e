//! Registry of CMS modules that roles and assignments can be scoped to.
//!
//! Populated once at startup from configuration; there is no runtime discovery.

use crate::error::{AppError, Result};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: BTreeSet<String>,
}

impl ModuleRegistry {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let modules = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        Self { modules }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains(&name.trim().to_lowercase())
    }

    /// Normalise an optional module scope, rejecting unknown modules.
    pub fn ensure_known(&self, module: Option<&str>) -> Result<Option<String>> {
        match module.map(|m| m.trim().to_lowercase()) {
            None => Ok(None),
            Some(m) if m.is_empty() => Ok(None),
            Some(m) if self.modules.contains(&m) => Ok(Some(m)),
            Some(m) => Err(AppError::Validation(format!("Unknown module '{}'", m))),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
