//! exam-engine - Assessment Execution Core
//!
//! Owns the attempt lifecycle state machine, adaptive question
//! materialization, answer recording and sincerity flagging, the
//! transactional completion rollup, and the background expiration
//! scheduler. HTTP routing and the database schema are thin shells around
//! those services.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

use sqlx::PgPool;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
}

impl AppState {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}
