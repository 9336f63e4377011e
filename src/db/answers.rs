//! Answer row access: slot lookup, submission writes, completion counts,
//! seeding, and the raw aggregation queries used by scoring.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use std::collections::HashMap;

use crate::error::Result;
use crate::models::{AnswerStatus, AnswerView, AssessmentAnswer};

const COLUMNS: &str = "id, assessment_attempt_id, assessment_session_id, user_id, \
     registration_id, program_id, assessment_level_id, main_question_id, open_question_id, \
     main_option_id, open_option_id, question_source, question_sequence, answer_score, \
     time_spent_seconds, answer_change_count, is_attention_fail, is_distraction_chosen, \
     sincerity_flag, status";

pub async fn find(exec: impl PgExecutor<'_>, answer_id: i64) -> Result<Option<AssessmentAnswer>> {
    let row = sqlx::query_as::<_, AssessmentAnswer>(&format!(
        "SELECT {COLUMNS} FROM assessment_answers WHERE id = $1"
    ))
    .bind(answer_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

/// Precise slot lookup by attempt and question, scoped to one source column.
pub async fn find_by_question(
    exec: impl PgExecutor<'_>,
    attempt_id: i64,
    question_id: i64,
    open: bool,
) -> Result<Option<AssessmentAnswer>> {
    let column = if open { "open_question_id" } else { "main_question_id" };
    let row = sqlx::query_as::<_, AssessmentAnswer>(&format!(
        "SELECT {COLUMNS} FROM assessment_answers \
         WHERE assessment_attempt_id = $1 AND {column} = $2"
    ))
    .bind(attempt_id)
    .bind(question_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

/// Legacy ambiguous lookup matching either question column. Can pick the
/// wrong slot when a MAIN and an OPEN question share an id value; callers
/// warn when they fall back to this.
pub async fn find_by_either_question(
    exec: impl PgExecutor<'_>,
    attempt_id: i64,
    question_id: i64,
) -> Result<Option<AssessmentAnswer>> {
    let row = sqlx::query_as::<_, AssessmentAnswer>(&format!(
        "SELECT {COLUMNS} FROM assessment_answers \
         WHERE assessment_attempt_id = $1 \
           AND (main_question_id = $2 OR open_question_id = $2) \
         ORDER BY id \
         LIMIT 1"
    ))
    .bind(attempt_id)
    .bind(question_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

/// Field updates applied when a candidate submits an answer.
#[derive(Debug, Clone)]
pub struct SubmissionUpdate {
    pub answer_id: i64,
    pub main_option_id: Option<i64>,
    pub open_option_id: Option<i64>,
    pub answer_score: f64,
    pub is_attention_fail: bool,
    pub is_distraction_chosen: bool,
    pub sincerity_flag: i32,
    /// Added to the running total; edits accumulate time.
    pub time_taken_seconds: i64,
    /// Overwrites the previous count.
    pub answer_change_count: i32,
}

pub async fn record_submission(
    exec: impl PgExecutor<'_>,
    update: &SubmissionUpdate,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "UPDATE assessment_answers \
         SET main_option_id = $2, open_option_id = $3, answer_score = $4, \
             is_attention_fail = $5, is_distraction_chosen = $6, sincerity_flag = $7, \
             time_spent_seconds = time_spent_seconds + $8, answer_change_count = $9, \
             status = 'ANSWERED', updated_at = $10 \
         WHERE id = $1",
    )
    .bind(update.answer_id)
    .bind(update.main_option_id)
    .bind(update.open_option_id)
    .bind(update.answer_score)
    .bind(update.is_attention_fail)
    .bind(update.is_distraction_chosen)
    .bind(update.sincerity_flag)
    .bind(update.time_taken_seconds)
    .bind(update.answer_change_count)
    .bind(now)
    .execute(exec)
    .await?;
    Ok(())
}

/// `(total, answered)` slot counts for the attempt. Equality of the two (with
/// a non-zero total) is the finalize trigger.
pub async fn completion_counts(
    exec: impl PgExecutor<'_>,
    attempt_id: i64,
) -> Result<(i64, i64)> {
    let (total, answered): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = $2) \
         FROM assessment_answers WHERE assessment_attempt_id = $1",
    )
    .bind(attempt_id)
    .bind(AnswerStatus::Answered.as_str())
    .fetch_one(exec)
    .await?;
    Ok((total, answered))
}

/// Clear the attempt's slots before re-seeding (materializer idempotency).
pub async fn delete_for_attempt(exec: impl PgExecutor<'_>, attempt_id: i64) -> Result<u64> {
    let n = sqlx::query("DELETE FROM assessment_answers WHERE assessment_attempt_id = $1")
        .bind(attempt_id)
        .execute(exec)
        .await?
        .rows_affected();
    Ok(n)
}

/// Insert one NOT_ANSWERED slot for a selected question.
pub async fn seed_slot(
    exec: impl PgExecutor<'_>,
    attempt: &crate::models::AssessmentAttempt,
    level_id: i64,
    question_id: i64,
    sequence: i32,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO assessment_answers ( \
             assessment_attempt_id, assessment_session_id, user_id, registration_id, \
             program_id, assessment_level_id, main_question_id, question_source, \
             status, question_sequence, created_at, updated_at \
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, 'MAIN', 'NOT_ANSWERED', $8, $9, $9)",
    )
    .bind(attempt.id)
    .bind(attempt.assessment_session_id)
    .bind(attempt.user_id)
    .bind(attempt.registration_id)
    .bind(attempt.program_id)
    .bind(level_id)
    .bind(question_id)
    .bind(sequence)
    .bind(now)
    .execute(exec)
    .await?;
    Ok(())
}

/// DISC aggregation: option score sums grouped by the chosen option's
/// factor. The NULL-factor bucket is included; scoring decides what to do
/// with it.
pub async fn disc_factor_sums(
    exec: impl PgExecutor<'_>,
    attempt_id: i64,
) -> Result<Vec<(Option<String>, f64)>> {
    let rows = sqlx::query_as::<_, (Option<String>, f64)>(
        "SELECT o.disc_factor, SUM(o.score_value) \
         FROM assessment_answers a \
         JOIN assessment_question_options o ON a.main_option_id = o.id \
         WHERE a.assessment_attempt_id = $1 \
         GROUP BY o.disc_factor",
    )
    .bind(attempt_id)
    .fetch_all(exec)
    .await?;
    Ok(rows)
}

/// Agile aggregation: answer score sums grouped by question category.
pub async fn category_score_sums(
    exec: impl PgExecutor<'_>,
    attempt_id: i64,
) -> Result<Vec<(Option<String>, f64)>> {
    let rows = sqlx::query_as::<_, (Option<String>, f64)>(
        "SELECT q.category, SUM(a.answer_score) \
         FROM assessment_answers a \
         JOIN assessment_questions q ON a.main_question_id = q.id \
         WHERE a.assessment_attempt_id = $1 \
         GROUP BY q.category",
    )
    .bind(attempt_id)
    .fetch_all(exec)
    .await?;
    Ok(rows)
}

/// Sincerity inputs for the attempt.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct SincerityCounts {
    pub attention_fails: i64,
    pub distractions_chosen: i64,
    pub total_questions: i64,
}

pub async fn sincerity_counts(
    exec: impl PgExecutor<'_>,
    attempt_id: i64,
) -> Result<SincerityCounts> {
    let counts = sqlx::query_as::<_, SincerityCounts>(
        "SELECT COUNT(*) FILTER (WHERE is_attention_fail) AS attention_fails, \
                COUNT(*) FILTER (WHERE is_distraction_chosen) AS distractions_chosen, \
                COUNT(*) AS total_questions \
         FROM assessment_answers \
         WHERE assessment_attempt_id = $1",
    )
    .bind(attempt_id)
    .fetch_one(exec)
    .await?;
    Ok(counts)
}

/// Load the attempt's answer slots ordered by display sequence, with their
/// full question/option/image projections attached.
pub async fn list_views(pool: &PgPool, attempt_id: i64) -> Result<Vec<AnswerView>> {
    let rows = sqlx::query_as::<_, AssessmentAnswer>(&format!(
        "SELECT {COLUMNS} FROM assessment_answers \
         WHERE assessment_attempt_id = $1 \
         ORDER BY question_sequence ASC"
    ))
    .bind(attempt_id)
    .fetch_all(pool)
    .await?;

    let main_ids: Vec<i64> = rows.iter().filter_map(|r| r.main_question_id).collect();
    let open_ids: Vec<i64> = rows.iter().filter_map(|r| r.open_question_id).collect();

    let mut main_views = super::questions::load_views(pool, &main_ids).await?;
    let mut open_views = super::questions::load_open_views(pool, &open_ids).await?;

    let views = rows
        .into_iter()
        .map(|r| {
            let main_question = r.main_question_id.and_then(|id| take_view(&mut main_views, id));
            let open_question = r.open_question_id.and_then(|id| take_view(&mut open_views, id));
            AnswerView {
                id: r.id,
                assessment_attempt_id: r.assessment_attempt_id,
                question_sequence: r.question_sequence,
                question_source: r.question_source,
                status: r.status,
                main_option_id: r.main_option_id,
                open_option_id: r.open_option_id,
                main_question,
                open_question,
            }
        })
        .collect();
    Ok(views)
}

fn take_view<V>(map: &mut HashMap<i64, V>, id: i64) -> Option<V> {
    map.remove(&id)
}
