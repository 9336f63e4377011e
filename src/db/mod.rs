//! Database access layer.
//!
//! One module per entity, each exposing free async functions over a
//! `PgExecutor` so callers can pass either the pool or an open transaction.
//! Transactions come from `pool.begin()`; the row-lock primitive lives in
//! [`attempts::lock`].

pub mod answers;
pub mod attempts;
pub mod cohorts;
pub mod levels;
pub mod programs;
pub mod questions;
pub mod registrations;
pub mod reports;
pub mod sessions;
pub mod traits;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::Result;

/// Connect to Postgres using the configured URL.
pub async fn connect(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

/// Apply schema migrations from the `migrations/` directory.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| crate::error::Error::Config(format!("migration failed: {e}")))?;
    Ok(())
}
