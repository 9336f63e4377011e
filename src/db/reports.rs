//! Assessment report rows (finalization artifacts).

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgExecutor;

use crate::error::Result;
use crate::models::AssessmentReport;

pub async fn find_for_session(
    exec: impl PgExecutor<'_>,
    session_id: i64,
) -> Result<Option<AssessmentReport>> {
    let row = sqlx::query_as::<_, AssessmentReport>(
        "SELECT id, assessment_session_id, report_number, generated_at, disc_scores, \
                agile_scores, level3_scores, level4_scores, overall_sincerity, \
                dominant_trait_id \
         FROM assessment_reports \
         WHERE assessment_session_id = $1 \
         LIMIT 1",
    )
    .bind(session_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

/// Rows already issued under a report-number prefix; the next sequence
/// number is this plus one.
pub async fn count_with_prefix(exec: impl PgExecutor<'_>, prefix: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM assessment_reports WHERE report_number LIKE $1 || '%'",
    )
    .bind(prefix)
    .fetch_one(exec)
    .await?;
    Ok(count)
}

/// Fields of a new report row.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub assessment_session_id: i64,
    pub report_number: String,
    pub generated_at: DateTime<Utc>,
    pub disc_scores: Value,
    pub agile_scores: Value,
    pub level3_scores: Value,
    pub level4_scores: Value,
    pub overall_sincerity: f64,
    pub dominant_trait_id: Option<i64>,
}

pub async fn insert(exec: impl PgExecutor<'_>, report: &NewReport) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO assessment_reports ( \
             assessment_session_id, report_number, generated_at, disc_scores, \
             agile_scores, level3_scores, level4_scores, overall_sincerity, \
             dominant_trait_id, metadata \
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, '{}') \
         RETURNING id",
    )
    .bind(report.assessment_session_id)
    .bind(&report.report_number)
    .bind(report.generated_at)
    .bind(&report.disc_scores)
    .bind(&report.agile_scores)
    .bind(&report.level3_scores)
    .bind(&report.level4_scores)
    .bind(report.overall_sincerity)
    .bind(report.dominant_trait_id)
    .fetch_one(exec)
    .await?;
    Ok(id)
}
