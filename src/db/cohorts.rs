//! Cohort assessment rows (group-level aggregates).

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::error::Result;
use crate::models::{CohortAssessment, ProgressStats};

const COLUMNS: &str = "id, group_id, program_id, status, valid_to";

pub async fn find_by_group_and_program(
    exec: impl PgExecutor<'_>,
    group_id: i64,
    program_id: i64,
) -> Result<Option<CohortAssessment>> {
    let row = sqlx::query_as::<_, CohortAssessment>(&format!(
        "SELECT {COLUMNS} FROM cohort_assessments WHERE group_id = $1 AND program_id = $2"
    ))
    .bind(group_id)
    .bind(program_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

pub async fn set_status(
    exec: impl PgExecutor<'_>,
    group_id: i64,
    program_id: i64,
    status: &str,
) -> Result<()> {
    sqlx::query(
        "UPDATE cohort_assessments SET status = $3, updated_at = now() \
         WHERE group_id = $1 AND program_id = $2",
    )
    .bind(group_id)
    .bind(program_id)
    .bind(status)
    .execute(exec)
    .await?;
    Ok(())
}

/// `(total, started, completed)` over the cohort's member sessions.
pub async fn session_stats(
    exec: impl PgExecutor<'_>,
    group_id: i64,
    program_id: i64,
) -> Result<ProgressStats> {
    let stats = sqlx::query_as::<_, ProgressStats>(
        "SELECT COUNT(*) AS total, \
                COUNT(*) FILTER (WHERE status NOT IN ('NOT_STARTED', 'NOT_YET_STARTED')) AS started, \
                COUNT(*) FILTER (WHERE status = 'COMPLETED') AS completed \
         FROM assessment_sessions \
         WHERE group_id = $1 AND program_id = $2",
    )
    .bind(group_id)
    .bind(program_id)
    .fetch_one(exec)
    .await?;
    Ok(stats)
}

/// Cohorts past `valid_to` still sitting in a non-terminal status.
pub async fn expired_candidates(
    exec: impl PgExecutor<'_>,
    now: DateTime<Utc>,
) -> Result<Vec<CohortAssessment>> {
    let rows = sqlx::query_as::<_, CohortAssessment>(&format!(
        "SELECT {COLUMNS} FROM cohort_assessments \
         WHERE valid_to < $1 \
           AND status NOT IN ('COMPLETED', 'EXPIRED', 'PARTIALLY_EXPIRED')"
    ))
    .bind(now)
    .fetch_all(exec)
    .await?;
    Ok(rows)
}
