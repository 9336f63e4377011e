//! Background expiration scheduler.
//!
//! A single long-lived task sweeps every two minutes, moving overdue
//! attempts, sessions, and cohorts into their expired states. Every update
//! is status-guarded, so a sweep racing an in-flight finalizer (or a repeat
//! of itself) cannot regress a terminal row.

use chrono::Utc;
use sqlx::PgPool;
use std::time::Duration;
use tokio::time;
use tracing::{debug, info, warn};

use crate::db;
use crate::error::Result;
use crate::services::cohort;

/// Sweep cadence.
const TICK_INTERVAL: Duration = Duration::from_secs(120);

/// Spawn the scheduler loop.
pub fn spawn(pool: PgPool) {
    tokio::spawn(run(pool));
}

async fn run(pool: PgPool) {
    let mut interval = time::interval(TICK_INTERVAL);
    info!("expiration scheduler started (120s interval)");

    loop {
        interval.tick().await;
        if let Err(e) = tick(&pool).await {
            warn!(error = %e, "expiration sweep failed");
        }
    }
}

/// One full sweep: attempts, then sessions, then cohorts.
pub async fn tick(pool: &PgPool) -> Result<()> {
    expire_attempts(pool).await?;
    expire_sessions(pool).await?;
    expire_cohorts(pool).await?;
    Ok(())
}

/// Overdue NOT_STARTED attempts expire outright; overdue IN_PROGRESS
/// attempts keep their partial work and become PARTIALLY_EXPIRED.
async fn expire_attempts(pool: &PgPool) -> Result<()> {
    let now = Utc::now();
    let expired = db::attempts::expire_not_started(pool, now).await?;
    let partial = db::attempts::expire_in_progress(pool, now).await?;
    if expired > 0 || partial > 0 {
        info!(expired, partially_expired = partial, "expired overdue attempts");
    }
    Ok(())
}

/// Sessions past `valid_to` expire according to whether anything inside
/// them was touched.
async fn expire_sessions(pool: &PgPool) -> Result<()> {
    let now = Utc::now();
    let session_ids = db::sessions::expired_candidate_ids(pool, now).await?;
    if session_ids.is_empty() {
        return Ok(());
    }

    for session_id in session_ids {
        let stats = db::attempts::progress_stats(pool, session_id).await?;
        let status = if stats.started > 0 {
            "PARTIALLY_EXPIRED"
        } else {
            "EXPIRED"
        };
        db::sessions::set_status(pool, session_id, status).await?;
        debug!(session_id, status, "expired session");
    }
    Ok(())
}

/// Cohorts past `valid_to` are re-derived from their member sessions, using
/// the same derivation as the completion rollup.
async fn expire_cohorts(pool: &PgPool) -> Result<()> {
    let now = Utc::now();
    let cohorts = db::cohorts::expired_candidates(pool, now).await?;

    for row in cohorts {
        let stats = db::cohorts::session_stats(pool, row.group_id, row.program_id).await?;
        let status = cohort::derive_status(stats, row.valid_to, now);
        db::cohorts::set_status(pool, row.group_id, row.program_id, status.as_str()).await?;
        debug!(
            group_id = row.group_id,
            program_id = row.program_id,
            status = status.as_str(),
            "expired cohort assessment"
        );
    }
    Ok(())
}
