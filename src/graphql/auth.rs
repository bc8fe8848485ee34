//! GraphQL authentication
//!
//! Tokens are HS256 JWTs whose `sub` is the user id. The HTTP handler
//! verifies the bearer token and attaches an [AuthUser] to the request;
//! resolvers read it back through [AuthExt].

use async_graphql::Context;
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{ApiError, ApiResult};

/// User context extracted from a JWT, available in GraphQL resolvers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Token signing and password hashing settings, registered as schema data.
#[derive(Clone)]
pub struct AuthConfig {
    jwt_secret: String,
    token_ttl: chrono::Duration,
    bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_ttl: chrono::Duration, bcrypt_cost: u32) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl,
            bcrypt_cost,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.jwt_ttl, config.bcrypt_cost)
    }

    /// Sign a token for the given user
    pub fn issue_token(&self, user_id: i32) -> ApiResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?)
    }

    /// Verify a token and extract the user it was issued for
    pub fn verify_token(&self, token: &str) -> ApiResult<AuthUser> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )?;

        let user_id = token_data
            .claims
            .sub
            .parse()
            .map_err(|_| jsonwebtoken::errors::Error::from(ErrorKind::InvalidSubject))?;

        Ok(AuthUser { user_id })
    }

    /// Hash a password with bcrypt
    pub fn hash_password(&self, password: &str) -> ApiResult<String> {
        Ok(bcrypt::hash(password, self.bcrypt_cost)?)
    }

    /// Verify a password against a bcrypt hash
    pub fn verify_password(&self, password: &str, hash: &str) -> ApiResult<bool> {
        Ok(bcrypt::verify(password, hash)?)
    }
}

/// Extension trait to get the authenticated user from GraphQL context
pub trait AuthExt {
    /// The authenticated user, or `Cannot {action} without logging in.`
    fn require_user(&self, action: &str) -> ApiResult<&AuthUser>;

    /// The authenticated user if present
    fn try_auth_user(&self) -> Option<&AuthUser>;
}

impl<'a> AuthExt for Context<'a> {
    fn require_user(&self, action: &str) -> ApiResult<&AuthUser> {
        self.data_opt::<AuthUser>()
            .ok_or_else(|| ApiError::unauthenticated(action))
    }

    fn try_auth_user(&self) -> Option<&AuthUser> {
        self.data_opt::<AuthUser>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn config() -> AuthConfig {
        AuthConfig::new("test-secret", chrono::Duration::hours(1), 4)
    }

    #[test]
    fn test_token_roundtrip() {
        let auth = config();
        let token = auth.issue_token(42).unwrap();
        assert_eq!(auth.verify_token(&token).unwrap(), AuthUser { user_id: 42 });
    }

    #[test]
    fn test_token_wrong_secret() {
        let token = config().issue_token(1).unwrap();
        let other = AuthConfig::new("other-secret", chrono::Duration::hours(1), 4);
        assert_matches!(other.verify_token(&token), Err(ApiError::Token(_)));
    }

    #[test]
    fn test_token_expired() {
        let expired = AuthConfig::new("test-secret", chrono::Duration::hours(-2), 4);
        let token = expired.issue_token(1).unwrap();
        assert_matches!(config().verify_token(&token), Err(ApiError::Token(_)));
    }

    #[test]
    fn test_garbage_token() {
        assert_matches!(config().verify_token("not.a.jwt"), Err(ApiError::Token(_)));
    }

    #[test]
    fn test_password_hash() {
        let auth = config();
        let hash = auth.hash_password("hunter2").unwrap();
        assert!(auth.verify_password("hunter2", &hash).unwrap());
        assert!(!auth.verify_password("hunter3", &hash).unwrap());
    }
}
