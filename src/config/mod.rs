//! Application configuration management

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::Engine;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (for logging the playground URL)
    pub host: Option<String>,

    /// Server port
    pub port: u16,

    /// SQLite connection URL, e.g. `sqlite://linkboard.db?mode=rwc`
    pub database_url: String,

    /// Maximum pool size
    pub database_max_connections: u32,

    /// How long to keep retrying the initial connection
    pub database_connect_timeout: Duration,

    /// JWT secret for signing and verifying tokens
    pub jwt_secret: String,

    /// Lifetime of issued tokens
    pub jwt_ttl: chrono::Duration,

    /// bcrypt work factor for password hashes
    pub bcrypt_cost: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .or_else(|_| env::var("DATABASE_PATH").map(|p| format!("sqlite://{}?mode=rwc", p)))
            .unwrap_or_else(|_| "sqlite://linkboard.db?mode=rwc".to_string());

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret.trim().to_string(),
            _ => {
                tracing::warn!("JWT_SECRET not set; tokens will not survive a restart");
                dev_secret()
            }
        };

        Ok(Self {
            host: env::var("HOST").ok(),

            port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url,

            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            database_connect_timeout: Duration::from_secs(
                env::var("DATABASE_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),

            jwt_secret,

            jwt_ttl: chrono::Duration::hours(
                env::var("JWT_TTL_HOURS")
                    .unwrap_or_else(|_| "168".to_string())
                    .parse()
                    .context("Invalid JWT_TTL_HOURS")?,
            ),

            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),
        })
    }
}

/// Random per-process secret for development runs without JWT_SECRET
fn dev_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_secret_is_random() {
        let first = dev_secret();
        let second = dev_secret();
        assert_ne!(first, second);
        // 32 random bytes, standard base64 with padding
        assert_eq!(first.len(), 44);
        assert_eq!(
            base64::engine::general_purpose::STANDARD
                .decode(&first)
                .unwrap()
                .len(),
            32
        );
    }
}
