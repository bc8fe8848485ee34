//! Application state and HTTP router construction.

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::Config;
use crate::db::Database;
use crate::graphql::{self, AuthConfig, LinkboardSchema, build_schema};

/// Shared state for HTTP handlers (GraphQL, probes).
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: AuthConfig,
    pub schema: LinkboardSchema,
}

impl AppState {
    pub fn new(config: &Config, db: Database) -> Self {
        let auth = AuthConfig::from_config(config);
        let schema = build_schema(db.clone(), auth.clone());
        Self { db, auth, schema }
    }

    /// State over a fresh in-memory store.
    #[cfg(test)]
    pub async fn for_tests() -> Self {
        let config = Config {
            host: None,
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            database_connect_timeout: std::time::Duration::from_secs(1),
            jwt_secret: "test-secret".to_string(),
            jwt_ttl: chrono::Duration::hours(1),
            bcrypt_cost: 4,
        };
        Self::new(&config, Database::test_database().await)
    }
}

/// Build the full Axum router: /graphql, probes and layers.
/// Returns Router<()> (state fully applied) for use with axum::serve.
pub fn build_app(state: AppState) -> Router<()> {
    Router::new()
        .merge(api::health::router())
        .merge(graphql::service::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
