//! Access token handling

use crate::config::JwtConfig;
use crate::context::CallerContext;
use crate::error::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ACCESS_TOKEN_AUDIENCE: &str = "cms-admin";
const ACCESS_TOKEN_TYPE: &str = "access";

/// Admin access token claims. `permissions` is materialised from the
/// user's roles when the token is issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    pub iss: String,
    pub aud: String,
    /// Token type discriminator (prevents token confusion attacks)
    #[serde(default)]
    pub token_type: String,
    pub permissions: Vec<String>,
    /// Set when an administrator minted this token for another user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impersonated_by: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl AccessClaims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
    }

    pub fn into_context(self) -> Result<CallerContext> {
        let user_id = self.user_id()?;
        Ok(CallerContext::authenticated(user_id, self.permissions))
    }
}

/// HS256 token manager
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn access_token_ttl_secs(&self) -> i64 {
        self.config.access_token_ttl_secs
    }

    fn strict_validation(&self) -> Validation {
        let mut v = Validation::new(Algorithm::HS256);
        v.leeway = 5;
        v.set_audience(&[ACCESS_TOKEN_AUDIENCE]);
        v.set_issuer(&[&self.config.issuer]);
        v
    }

    pub fn issue_access_token(&self, user_id: Uuid, permissions: Vec<String>) -> Result<String> {
        self.issue(user_id, permissions, None)
    }

    /// Token for `user_id` minted on behalf of `impersonator`
    pub fn issue_impersonation_token(
        &self,
        user_id: Uuid,
        permissions: Vec<String>,
        impersonator: Uuid,
    ) -> Result<String> {
        self.issue(user_id, permissions, Some(impersonator))
    }

    fn issue(
        &self,
        user_id: Uuid,
        permissions: Vec<String>,
        impersonator: Option<Uuid>,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.access_token_ttl_secs);

        let claims = AccessClaims {
            sub: user_id.to_string(),
            iss: self.config.issuer.clone(),
            aud: ACCESS_TOKEN_AUDIENCE.to_string(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            permissions,
            impersonated_by: impersonator.map(|id| id.to_string()),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        let header = Header::new(Algorithm::HS256);
        encode(&header, &claims, &self.encoding_key).map_err(|e| AppError::Internal(e.into()))
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims> {
        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &self.strict_validation())?;
        if token_data.claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(AppError::Unauthorized("Unexpected token type".to_string()));
        }
        Ok(token_data.claims)
    }
}
