//! Attempt row access.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgExecutor;

use crate::error::Result;
use crate::models::{AssessmentAttempt, ProgressStats};

const COLUMNS: &str = "id, assessment_session_id, user_id, registration_id, program_id, \
     assessment_level_id, unlock_at, expires_at, started_at, completed_at, status, \
     total_score, sincerity_index, sincerity_class, dominant_trait_id, metadata";

/// Lookup scoped to the owning candidate. Returns `None` both for a missing
/// row and for someone else's attempt, so callers cannot distinguish the two.
pub async fn find_for_user(
    exec: impl PgExecutor<'_>,
    attempt_id: i64,
    user_id: i64,
) -> Result<Option<AssessmentAttempt>> {
    let row = sqlx::query_as::<_, AssessmentAttempt>(&format!(
        "SELECT {COLUMNS} FROM assessment_attempts WHERE id = $1 AND user_id = $2"
    ))
    .bind(attempt_id)
    .bind(user_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

/// Acquire a row-level exclusive lock on the attempt and return the fresh
/// row. Must run inside a transaction; blocks concurrent finalizers until
/// commit or rollback.
pub async fn lock(
    exec: impl PgExecutor<'_>,
    attempt_id: i64,
) -> Result<Option<AssessmentAttempt>> {
    let row = sqlx::query_as::<_, AssessmentAttempt>(&format!(
        "SELECT {COLUMNS} FROM assessment_attempts WHERE id = $1 FOR UPDATE"
    ))
    .bind(attempt_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

pub async fn find_by_session_and_level(
    exec: impl PgExecutor<'_>,
    session_id: i64,
    level_id: i64,
) -> Result<Option<AssessmentAttempt>> {
    let row = sqlx::query_as::<_, AssessmentAttempt>(&format!(
        "SELECT {COLUMNS} FROM assessment_attempts \
         WHERE assessment_session_id = $1 AND assessment_level_id = $2"
    ))
    .bind(session_id)
    .bind(level_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

pub async fn list_for_session(
    exec: impl PgExecutor<'_>,
    session_id: i64,
) -> Result<Vec<AssessmentAttempt>> {
    let rows = sqlx::query_as::<_, AssessmentAttempt>(&format!(
        "SELECT {COLUMNS} FROM assessment_attempts WHERE assessment_session_id = $1"
    ))
    .bind(session_id)
    .fetch_all(exec)
    .await?;
    Ok(rows)
}

/// Guarded NOT_STARTED → IN_PROGRESS transition. A no-op when the attempt
/// already moved past the start states, so it is safe to re-issue.
pub async fn mark_in_progress(
    exec: impl PgExecutor<'_>,
    attempt_id: i64,
    now: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE assessment_attempts \
         SET status = 'IN_PROGRESS', started_at = $2, updated_at = $2 \
         WHERE id = $1 AND status IN ('NOT_STARTED', 'NOT_YET_STARTED')",
    )
    .bind(attempt_id)
    .bind(now)
    .execute(exec)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Finalize the attempt row. `dominant_trait_id` is only written when a
/// trait was actually derived.
#[allow(clippy::too_many_arguments)]
pub async fn complete(
    exec: impl PgExecutor<'_>,
    attempt_id: i64,
    now: DateTime<Utc>,
    total_score: f64,
    sincerity_index: f64,
    sincerity_class: &str,
    dominant_trait_id: Option<i64>,
    metadata: &Value,
) -> Result<()> {
    sqlx::query(
        "UPDATE assessment_attempts \
         SET status = 'COMPLETED', completed_at = $2, updated_at = $2, \
             total_score = $3, sincerity_index = $4, sincerity_class = $5, \
             dominant_trait_id = COALESCE($6, dominant_trait_id), metadata = $7 \
         WHERE id = $1",
    )
    .bind(attempt_id)
    .bind(now)
    .bind(total_score)
    .bind(sincerity_index)
    .bind(sincerity_class)
    .bind(dominant_trait_id)
    .bind(metadata)
    .execute(exec)
    .await?;
    Ok(())
}

/// Set the start window of a freshly-unlocked next-level attempt.
pub async fn set_unlock_window(
    exec: impl PgExecutor<'_>,
    attempt_id: i64,
    unlock_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "UPDATE assessment_attempts \
         SET unlock_at = $2, expires_at = $3, updated_at = now() \
         WHERE id = $1",
    )
    .bind(attempt_id)
    .bind(unlock_at)
    .bind(expires_at)
    .execute(exec)
    .await?;
    Ok(())
}

/// Trait carried by the most recently completed sibling attempt, if any.
pub async fn latest_completed_trait(
    exec: impl PgExecutor<'_>,
    session_id: i64,
) -> Result<Option<i64>> {
    let trait_id = sqlx::query_scalar::<_, i64>(
        "SELECT dominant_trait_id FROM assessment_attempts \
         WHERE assessment_session_id = $1 \
           AND dominant_trait_id IS NOT NULL \
           AND status = 'COMPLETED' \
         ORDER BY completed_at DESC \
         LIMIT 1",
    )
    .bind(session_id)
    .fetch_optional(exec)
    .await?;
    Ok(trait_id)
}

/// `(total, started, completed)` over the session's attempts.
pub async fn progress_stats(
    exec: impl PgExecutor<'_>,
    session_id: i64,
) -> Result<ProgressStats> {
    let stats = sqlx::query_as::<_, ProgressStats>(
        "SELECT COUNT(*) AS total, \
                COUNT(*) FILTER (WHERE status NOT IN ('NOT_STARTED', 'NOT_YET_STARTED')) AS started, \
                COUNT(*) FILTER (WHERE status = 'COMPLETED') AS completed \
         FROM assessment_attempts \
         WHERE assessment_session_id = $1",
    )
    .bind(session_id)
    .fetch_one(exec)
    .await?;
    Ok(stats)
}

/// Reap attempts never started within their window.
pub async fn expire_not_started(
    exec: impl PgExecutor<'_>,
    now: DateTime<Utc>,
) -> Result<u64> {
    let n = sqlx::query(
        "UPDATE assessment_attempts SET status = 'EXPIRED', updated_at = $1 \
         WHERE status = 'NOT_STARTED' AND expires_at < $1",
    )
    .bind(now)
    .execute(exec)
    .await?
    .rows_affected();
    Ok(n)
}

/// Reap attempts started but not finished within their window.
pub async fn expire_in_progress(
    exec: impl PgExecutor<'_>,
    now: DateTime<Utc>,
) -> Result<u64> {
    let n = sqlx::query(
        "UPDATE assessment_attempts SET status = 'PARTIALLY_EXPIRED', updated_at = $1 \
         WHERE status = 'IN_PROGRESS' AND expires_at < $1",
    )
    .bind(now)
    .execute(exec)
    .await?
    .rows_affected();
    Ok(n)
}
