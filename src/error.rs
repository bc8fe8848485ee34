//! API error taxonomy
//!
//! Every failure a resolver can surface maps to one of these variants. The
//! [ErrorExtensions] impl attaches a machine-readable `code`
//! extension; resolvers convert with `async_graphql::ResultExt::extend`.

use std::sync::Arc;

use async_graphql::ErrorExtensions;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Operation requires a logged-in user
    #[error("{0}")]
    Unauthenticated(String),

    /// Login attempt with unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Any failure reported by the store, passed through as-is
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// Store failure shared by every resolver waiting on one batch load
    #[error("{0}")]
    Loader(#[from] Arc<sqlx::Error>),

    #[error("Invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

impl ApiError {
    pub fn unauthenticated(action: &str) -> Self {
        ApiError::Unauthenticated(format!("Cannot {} without logging in.", action))
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) | ApiError::InvalidCredentials => "UNAUTHENTICATED",
            ApiError::Database(_) | ApiError::Loader(_) => "DATABASE_ERROR",
            ApiError::Token(_) => "INVALID_TOKEN",
            ApiError::PasswordHash(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_message() {
        let err = ApiError::unauthenticated("post");
        assert_eq!(err.to_string(), "Cannot post without logging in.");
    }

    #[test]
    fn test_code_extension_is_attached() {
        let err = ApiError::InvalidCredentials.extend();
        assert_eq!(err.message, "Invalid email or password");
        let ext = err.extensions.expect("extensions set");
        assert_eq!(
            ext.get("code"),
            Some(&async_graphql::Value::from("UNAUTHENTICATED"))
        );
    }

    #[test]
    fn test_database_error_keeps_store_message() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.to_string(), sqlx::Error::RowNotFound.to_string());
        assert_eq!(err.code(), "DATABASE_ERROR");
    }
}
