//! Assessment level access.

use sqlx::PgExecutor;

use crate::error::Result;
use crate::models::AssessmentLevel;

const COLUMNS: &str = "id, name, level_number, pattern_type, unlock_after_hours, \
     start_within_hours, duration_minutes, is_mandatory, max_score";

pub async fn find(
    exec: impl PgExecutor<'_>,
    level_id: i64,
) -> Result<Option<AssessmentLevel>> {
    let row = sqlx::query_as::<_, AssessmentLevel>(&format!(
        "SELECT {COLUMNS} FROM assessment_levels WHERE id = $1"
    ))
    .bind(level_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

/// The next mandatory level after the given rank, if any.
pub async fn next_mandatory(
    exec: impl PgExecutor<'_>,
    level_number: i32,
) -> Result<Option<AssessmentLevel>> {
    let row = sqlx::query_as::<_, AssessmentLevel>(&format!(
        "SELECT {COLUMNS} FROM assessment_levels \
         WHERE level_number > $1 AND is_mandatory = TRUE \
         ORDER BY level_number ASC \
         LIMIT 1"
    ))
    .bind(level_number)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}
