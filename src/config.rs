//! Environment-driven configuration.
//!
//! `.env.local` takes priority over `.env`; both are optional. A single
//! `DATABASE_URL` wins over the discrete `DB_*` variables.

use crate::error::{Error, Result};

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port (`PORT`, default 4005).
    pub port: u16,
    /// Postgres connection string.
    pub database_url: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::dotenv();

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("invalid PORT value: {raw}")))?,
            Err(_) => 4005,
        };

        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                let host = std::env::var("DB_HOST")
                    .map_err(|_| Error::Config("DATABASE_URL or DB_HOST must be set".into()))?;
                let db_port = std::env::var("DB_PORT").unwrap_or_else(|_| "5432".into());
                let user = std::env::var("DB_USER").unwrap_or_default();
                let pass = std::env::var("DB_PASS").unwrap_or_default();
                let name = std::env::var("DB_NAME").unwrap_or_default();
                format!("postgres://{user}:{pass}@{host}:{db_port}/{name}")
            }
        };

        Ok(Config { port, database_url })
    }
}
