//! Configuration management for CMS Core

use anyhow::{Context, Result};
use std::env;

/// Default modules registered when `CMS_MODULES` is not set
pub const DEFAULT_MODULES: &[&str] = &["core", "pages", "menus", "settings", "files", "seo"];

/// Sentinel permission that satisfies every permission check
pub const DEFAULT_FULL_ADMIN_PERMISSION: &str = "full_admin_access";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Runtime environment ("development" exposes internal error detail)
    pub environment: String,
    /// Database configuration
    pub database: DatabaseConfig,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Logging and metrics configuration
    pub telemetry: TelemetryConfig,
    /// Access-control rules
    pub access: AccessConfig,
    /// Modules available for role scoping
    pub modules: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub access_token_ttl_secs: i64,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "json" or "pretty"
    pub log_format: String,
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "pretty".to_string(),
            metrics_enabled: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Permission name that grants every permission
    pub full_admin_permission: String,
    /// Reject deletion of roles flagged `is_system`
    pub protect_system_roles: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            full_admin_permission: DEFAULT_FULL_ADMIN_PERMISSION.to_string(),
            protect_system_roles: true,
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|s| matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

/// Split a comma-separated module list, dropping blanks
pub fn parse_module_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .collect()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid HTTP_PORT")?,
            environment: env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").context("DATABASE_URL is required")?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .unwrap_or(2),
                acquire_timeout_secs: env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .context("Invalid DATABASE_ACQUIRE_TIMEOUT_SECS")?,
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").context("JWT_SECRET is required")?,
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "cms-core".to_string()),
                access_token_ttl_secs: env::var("JWT_ACCESS_TOKEN_TTL_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .unwrap_or(3600),
            },
            telemetry: TelemetryConfig {
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
                metrics_enabled: env_flag("METRICS_ENABLED", false),
            },
            access: AccessConfig {
                full_admin_permission: env::var("FULL_ADMIN_PERMISSION")
                    .unwrap_or_else(|_| DEFAULT_FULL_ADMIN_PERMISSION.to_string()),
                protect_system_roles: env_flag("PROTECT_SYSTEM_ROLES", true),
            },
            modules: env::var("CMS_MODULES")
                .map(|s| parse_module_list(&s))
                .unwrap_or_else(|_| DEFAULT_MODULES.iter().map(|m| m.to_string()).collect()),
        })
    }

    /// Get HTTP server address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}
