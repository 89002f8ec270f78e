//! CMS Core - admin access-control backend
//!
//! Permissions, roles, user-role and role-permission mappings with soft
//! delete, plus the authorization checks the admin UI relies on. Exposed as
//! a JSON REST API over MySQL.

pub mod api;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod migration;
pub mod registry;
pub mod repository;
pub mod server;
pub mod service;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use context::CallerContext;
pub use error::{AppError, Result};
