//! Linkboard - GraphQL backend for a link-sharing board
//!
//! All operations are exposed via GraphQL at /graphql.

mod api;
mod app;
mod config;
mod db;
mod entities;
mod error;
mod graphql;
mod orm;

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{AppState, build_app};
use crate::config::Config;
use crate::db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting Linkboard");

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let db = Database::connect_with_retry(
        &config.database_url,
        config.database_max_connections,
        config.database_connect_timeout,
    )
    .await?;
    tracing::info!("Database connected");

    let sync = db.sync_schema().await?;
    tracing::info!(
        tables_created = sync.tables_created.len(),
        columns_added = sync.columns_added.len(),
        "Schema synchronized"
    );

    let state = AppState::new(&config, db);
    tracing::info!("GraphQL schema built");

    let app = build_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    tracing::info!(
        "GraphQL playground: http://{}:{}/graphql",
        config.host.as_deref().unwrap_or("localhost"),
        config.port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
