//! Session row access.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::error::Result;
use crate::models::AssessmentSession;

const COLUMNS: &str = "id, user_id, registration_id, program_id, group_id, valid_from, \
     valid_to, status, started_at, completed_at, metadata";

pub async fn find(
    exec: impl PgExecutor<'_>,
    session_id: i64,
) -> Result<Option<AssessmentSession>> {
    let row = sqlx::query_as::<_, AssessmentSession>(&format!(
        "SELECT {COLUMNS} FROM assessment_sessions WHERE id = $1"
    ))
    .bind(session_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

/// Guarded NOT_STARTED → IN_PROGRESS transition, mirroring the attempt heal.
pub async fn mark_in_progress(
    exec: impl PgExecutor<'_>,
    session_id: i64,
    now: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE assessment_sessions \
         SET status = 'IN_PROGRESS', started_at = $2, updated_at = $2 \
         WHERE id = $1 AND status IN ('NOT_STARTED', 'NOT_YET_STARTED')",
    )
    .bind(session_id)
    .bind(now)
    .execute(exec)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Mark the session fully completed.
pub async fn complete(
    exec: impl PgExecutor<'_>,
    session_id: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "UPDATE assessment_sessions \
         SET status = 'COMPLETED', completed_at = $2, updated_at = $2 \
         WHERE id = $1",
    )
    .bind(session_id)
    .bind(now)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn set_status(
    exec: impl PgExecutor<'_>,
    session_id: i64,
    status: &str,
) -> Result<()> {
    sqlx::query("UPDATE assessment_sessions SET status = $2, updated_at = now() WHERE id = $1")
        .bind(session_id)
        .bind(status)
        .execute(exec)
        .await?;
    Ok(())
}

/// Sessions past `valid_to` that still sit in a non-terminal status.
pub async fn expired_candidate_ids(
    exec: impl PgExecutor<'_>,
    now: DateTime<Utc>,
) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM assessment_sessions \
         WHERE valid_to < $1 \
           AND status NOT IN ('COMPLETED', 'EXPIRED', 'PARTIALLY_EXPIRED')",
    )
    .bind(now)
    .fetch_all(exec)
    .await?;
    Ok(ids)
}
