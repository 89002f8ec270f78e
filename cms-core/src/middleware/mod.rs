//! HTTP middleware: caller extraction and request observability

pub mod auth;
pub mod observability;

pub use auth::{AuthError, Caller};
pub use observability::ObservabilityLayer;
