//! Database connection and repositories

pub mod links;
pub mod schema_sync;
pub mod sqlite_helpers;
pub mod users;
pub mod votes;

use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use links::{CreateLink, LinkRepository};
pub use schema_sync::{SchemaSyncResult, sync_all_entity_schemas};
pub use users::{CreateUser, UserRepository};
pub use votes::VoteRepository;

/// Pause between connection attempts in `connect_with_retry`.
const RETRY_INTERVAL: Duration = Duration::from_secs(2);

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    fn connect_options(url: &str) -> Result<SqliteConnectOptions> {
        Ok(SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid DATABASE_URL: {}", url))?
            .create_if_missing(true)
            .foreign_keys(true))
    }

    /// Create a new database connection pool
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(Self::connect_options(url)?)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;

        Ok(Self { pool })
    }

    /// Create a new database connection pool, retrying every few seconds
    /// until `timeout` has elapsed.
    pub async fn connect_with_retry(
        url: &str,
        max_connections: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let started = Instant::now();
        loop {
            match Self::connect(url, max_connections).await {
                Ok(db) => return Ok(db),
                Err(e) if started.elapsed() + RETRY_INTERVAL < timeout => {
                    tracing::warn!(
                        error = %e,
                        retry_in_secs = RETRY_INTERVAL.as_secs(),
                        "Database connection failed, retrying"
                    );
                    tokio::time::sleep(RETRY_INTERVAL).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Private in-memory database on a single connection, for tests.
    #[cfg(test)]
    pub async fn connect_in_memory() -> Result<Self> {
        // Every connection to :memory: is its own database, so keep exactly one alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(Self::connect_options("sqlite::memory:")?)
            .await?;

        Ok(Self { pool })
    }

    /// In-memory database with all entity tables created.
    #[cfg(test)]
    pub async fn test_database() -> Self {
        let db = Self::connect_in_memory()
            .await
            .expect("in-memory database");
        let result = sync_all_entity_schemas(db.pool()).await;
        assert!(result.errors.is_empty(), "schema sync failed: {:?}", result.errors);
        db
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get a links repository
    pub fn links(&self) -> LinkRepository {
        LinkRepository::new(self.pool.clone())
    }

    /// Get a users repository
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Get a votes repository
    pub fn votes(&self) -> VoteRepository {
        VoteRepository::new(self.pool.clone())
    }

    /// Create missing tables and columns for every entity.
    pub async fn sync_schema(&self) -> Result<SchemaSyncResult> {
        let result = sync_all_entity_schemas(&self.pool).await;
        if let Some(first) = result.errors.first() {
            anyhow::bail!(
                "Schema sync failed with {} error(s), first: {}",
                result.errors.len(),
                first
            );
        }
        Ok(result)
    }

    /// Check that the store answers a trivial query.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
