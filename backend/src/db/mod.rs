//! Database connection and pool management
//!
//! The pool is opened once in `main` and handed to the Postgres-backed
//! stores. Nothing else in the crate connects to the database.

use anyhow::Result;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Pool tuning knobs
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600, // 10 minutes
        }
    }
}

/// Create a PostgreSQL connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let config = DbConfig {
        url: database_url.to_string(),
        max_connections,
        ..Default::default()
    };
    create_pool_with_config(&config).await
}

/// Create a PostgreSQL connection pool with custom configuration
pub async fn create_pool_with_config(config: &DbConfig) -> Result<PgPool> {
    let connect_options = PgConnectOptions::from_str(&config.url)?
        .application_name("lnd-backend");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect_with(connect_options)
        .await?;

    info!(
        max = config.max_connections,
        min = config.min_connections,
        "Database pool created"
    );

    Ok(pool)
}

/// Apply the `users` and `token_blacklist` migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}

/// Round-trip a trivial query
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            warn!("Database health check failed: {}", e);
            e.into()
        })
}
