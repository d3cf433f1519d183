//! Token blacklist stores
//!
//! Postgres keeps entries in `token_blacklist` and relies on
//! [`spawn_purge_task`] for expiry. Redis expires keys natively.

use super::TokenBlacklist;
use crate::db;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Postgres-backed blacklist
#[derive(Clone)]
pub struct PgTokenBlacklist {
    pool: PgPool,
}

impl PgTokenBlacklist {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenBlacklist for PgTokenBlacklist {
    async fn exists(&self, token: &str) -> Result<bool> {
        let found = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM token_blacklist WHERE token = $1)
            "#,
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await?;

        Ok(found)
    }

    async fn insert(&self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO token_blacklist (token, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (token)
            DO UPDATE SET expires_at = GREATEST(token_blacklist.expires_at, EXCLUDED.expires_at)
            "#,
        )
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM token_blacklist WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        db::health_check(&self.pool).await
    }
}

const REDIS_KEY_PREFIX: &str = "lnd:token_blacklist:";

/// Redis-backed blacklist; each entry is a key that expires with its token
#[derive(Clone)]
pub struct RedisTokenBlacklist {
    conn: ConnectionManager,
}

impl RedisTokenBlacklist {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(token: &str) -> String {
        format!("{}{}", REDIS_KEY_PREFIX, token)
    }
}

/// Whole seconds until `expires_at`, rounded up and never zero
fn ttl_secs(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (expires_at - now).num_milliseconds().max(1);
    ((millis + 999) / 1000) as u64
}

#[async_trait]
impl TokenBlacklist for RedisTokenBlacklist {
    async fn exists(&self, token: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let found = redis::cmd("EXISTS")
            .arg(Self::key(token))
            .query_async::<_, bool>(&mut conn)
            .await?;
        Ok(found)
    }

    async fn insert(&self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(Self::key(token))
            .arg(1)
            .arg("EX")
            .arg(ttl_secs(expires_at, Utc::now()))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        // Redis drops expired keys on its own
        Ok(0)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}

/// Periodically purge expired blacklist entries.
///
/// Lookups never depend on this having run; it only keeps the table small.
/// A zero period is raised to one second.
pub fn spawn_purge_task(store: Arc<dyn TokenBlacklist>, every: Duration) -> JoinHandle<()> {
    let every = every.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => debug!(purged, "Purged expired blacklist entries"),
                Err(e) => warn!("Blacklist purge failed: {}", e),
            }
        }
    })
}
