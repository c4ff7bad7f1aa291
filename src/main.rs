//! Catalog Server - library catalog REST API

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_server::{
    api,
    config::{AppConfig, SessionBackend, StorageBackend},
    repository::{MemoryStore, Repository},
    services::{redis::RedisService, sessions::{MemorySessionStore, SessionStore}, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("catalog_server={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Catalog Server v{}", env!("CARGO_PKG_VERSION"));

    let repository = match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .connect(&config.database.url)
                .await
                .context("Failed to connect to database")?;

            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;

            tracing::info!("Database migrations completed");
            Repository::new(pool)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory catalog store, data is lost on exit");
            Repository::in_memory(Arc::new(MemoryStore::new()))
        }
    };

    let sessions: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Redis => {
            let redis = RedisService::new(&config.redis.url, config.session.ttl_seconds)
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("Connected to Redis");
            Arc::new(redis)
        }
        SessionBackend::Memory => Arc::new(MemorySessionStore::new(Duration::from_secs(
            config.session.ttl_seconds,
        ))),
    };

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let services = Services::new(repository, sessions, config.catalog.clone());
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
