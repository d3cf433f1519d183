//! LND Backend
//!
//! REST backend for the lost-and-found registry.
//!
//! ## Architecture
//!
//! - Routes: HTTP request handling and routing
//! - Services: authentication logic
//! - Repositories: user store and token blacklist (Postgres, optionally Redis)

use anyhow::Result;
use lnd_backend::{
    config::{self, BlacklistBackend},
    db,
    repositories::{
        spawn_purge_task, CredentialStore, PgTokenBlacklist, PgUserRepository,
        RedisTokenBlacklist, TokenBlacklist,
    },
    routes,
    state::AppState,
};
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting LND backend"
    );

    // Validate production configuration
    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    // Create database pool
    info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database.url, config.database.max_connections).await?;

    // Run migrations (skip in production if using separate migration job)
    if !config::AppConfig::is_production() {
        db::run_migrations(&db_pool).await?;
    }

    let users: Arc<dyn CredentialStore> = Arc::new(PgUserRepository::new(db_pool.clone()));

    let blacklist: Arc<dyn TokenBlacklist> = match config.blacklist.backend {
        BlacklistBackend::Postgres => {
            let store: Arc<dyn TokenBlacklist> = Arc::new(PgTokenBlacklist::new(db_pool.clone()));
            spawn_purge_task(
                store.clone(),
                Duration::from_secs(config.blacklist.purge_interval_secs),
            );
            store
        }
        BlacklistBackend::Redis => Arc::new(RedisTokenBlacklist::new(
            connect_redis(&config.redis.url).await?,
        )),
    };
    info!(backend = ?config.blacklist.backend, "Token blacklist ready");

    // Create application state
    let state = AppState::new(config.clone(), users, blacklist);

    // Build application
    let app = routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Connect to Redis
///
/// Unlike a cache, the blacklist cannot be skipped: without it revoked
/// sessions would be accepted again, so a connection failure is fatal.
async fn connect_redis(url: &str) -> Result<ConnectionManager> {
    info!("Connecting to Redis...");
    let client = redis::Client::open(url)?;
    let conn = ConnectionManager::new(client).await?;
    info!("Redis connection established");
    Ok(conn)
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "lnd_backend=info,tower_http=info".into()
        } else {
            "lnd_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    // Check JWT secret is not default
    if config.jwt.secret.contains("development") || config.jwt.secret.len() < 32 {
        errors.push("JWT secret must be at least 32 characters and not contain 'development'");
    }

    if config.cors.allowed_origin.starts_with("http://localhost") {
        warn!("CORS origin points at localhost - ensure this is intentional for production");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
