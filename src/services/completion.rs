//! Answer submission and the completion rollup.
//!
//! Submitting the last unanswered slot of an attempt triggers finalize:
//! score the attempt, unlock the next level (seeding its questions), or
//! close out the session with a report and a cohort rollup.
//!
//! The submission write commits before finalize begins. If finalize fails,
//! the candidate's answer is preserved and the next submit that re-hits the
//! all-answered threshold retries finalize; duplicate finalizers are
//! absorbed by the row lock plus COMPLETED short-circuit.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{error, info, warn};

use crate::db;
use crate::db::answers::SubmissionUpdate;
use crate::error::{Error, Result};
use crate::models::{
    metadata, AssessmentAttempt, AssessmentSession, AssessmentStatus, QuestionSource,
};
use crate::services::{cohort, flagger, materializer, scorer};
use crate::services::materializer::SelectionConstraints;

/// Answer submission payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAnswerRequest {
    pub attempt_id: i64,
    pub question_id: i64,
    pub selected_option: i64,
    /// Seconds spent on this question since the previous submit.
    #[serde(default)]
    pub time_taken: i64,
    #[serde(default)]
    pub answer_change_count: i32,
    /// "MAIN" or "OPEN"; omitted only by legacy clients.
    #[serde(default)]
    pub question_source: Option<String>,
    /// Primary key of the answer slot, when the client has it. Takes
    /// precedence over the attempt/question match.
    #[serde(default)]
    pub assessment_answer_id: Option<i64>,
}

/// Record one answer and, when it was the last open slot, finalize the
/// attempt.
pub async fn submit_answer(pool: &PgPool, req: &SubmitAnswerRequest) -> Result<()> {
    let record = resolve_answer_record(pool, req).await?.ok_or_else(|| {
        warn!(
            attempt_id = req.attempt_id,
            question_id = req.question_id,
            answer_id = ?req.assessment_answer_id,
            source = ?req.question_source,
            "answer slot not found"
        );
        // Every slot is seeded before the attempt is playable, so a miss
        // here is a broken attempt, not a bad address: surfaced as 500.
        Error::InvariantViolation("question not found for this attempt".into())
    })?;

    let now = Utc::now();

    // Start from the stored values so an unmatched branch leaves them as-is.
    let mut update = SubmissionUpdate {
        answer_id: record.id,
        main_option_id: record.main_option_id,
        open_option_id: record.open_option_id,
        answer_score: record.answer_score,
        is_attention_fail: record.is_attention_fail,
        is_distraction_chosen: record.is_distraction_chosen,
        sincerity_flag: record.sincerity_flag,
        time_taken_seconds: req.time_taken,
        answer_change_count: req.answer_change_count,
    };

    if record.main_question_id == Some(req.question_id) {
        update.main_option_id = Some(req.selected_option);
        if let Some(option) = db::questions::find_option(pool, req.selected_option).await? {
            let category = match db::questions::find(pool, req.question_id).await? {
                Some(question) => question.category,
                None => None,
            };
            let flags = flagger::classify(category.as_deref(), &option);
            update.answer_score = flags.answer_score;
            update.is_attention_fail = flags.is_attention_fail;
            update.is_distraction_chosen = flags.is_distraction_chosen;
            update.sincerity_flag = flags.sincerity_flag;
        }
    } else if record.open_question_id == Some(req.question_id) {
        update.open_option_id = Some(req.selected_option);
        update.sincerity_flag = flagger::SINCERITY_SINCERE;
    }

    // Heal a start-path race: an answer arriving for a still-NOT_STARTED
    // attempt forces attempt and session to IN_PROGRESS. Status-guarded, so
    // a no-op in the common case.
    if db::attempts::mark_in_progress(pool, record.assessment_attempt_id, now).await? {
        db::sessions::mark_in_progress(pool, record.assessment_session_id, now).await?;
    }

    db::answers::record_submission(pool, &update, now).await?;

    let (total, answered) =
        db::answers::completion_counts(pool, record.assessment_attempt_id).await?;
    if total > 0 && answered == total {
        if let Err(e) = finalize(pool, record.assessment_attempt_id).await {
            error!(
                attempt_id = record.assessment_attempt_id,
                error = %e,
                "finalize failed; answer is saved, next submit will retry"
            );
            return Err(e);
        }
    }

    Ok(())
}

/// Locate the answer slot a submission targets.
async fn resolve_answer_record(
    pool: &PgPool,
    req: &SubmitAnswerRequest,
) -> Result<Option<crate::models::AssessmentAnswer>> {
    if let Some(answer_id) = req.assessment_answer_id.filter(|id| *id > 0) {
        return db::answers::find(pool, answer_id).await;
    }

    match req.question_source.as_deref() {
        Some(source) => {
            // Anything that is not explicitly OPEN is treated as MAIN.
            let open = QuestionSource::parse(source) == Some(QuestionSource::Open);
            db::answers::find_by_question(pool, req.attempt_id, req.question_id, open).await
        }
        None => {
            // Legacy clients send neither the slot id nor the source; the
            // either-column match can pick the wrong slot when a MAIN and an
            // OPEN question share an id value.
            warn!(
                attempt_id = req.attempt_id,
                question_id = req.question_id,
                "ambiguous legacy answer lookup; client should send question_source"
            );
            db::answers::find_by_either_question(pool, req.attempt_id, req.question_id).await
        }
    }
}

/// Score the attempt and advance the workflow. Runs entirely inside one
/// transaction; the attempt row lock serializes concurrent finalizers and
/// the COMPLETED check makes re-runs a no-op.
pub async fn finalize(pool: &PgPool, attempt_id: i64) -> Result<()> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();

    let attempt = db::attempts::lock(&mut *tx, attempt_id)
        .await?
        .ok_or_else(|| Error::InvariantViolation(format!("attempt {attempt_id} vanished")))?;

    if attempt.status() == Some(AssessmentStatus::Completed) {
        info!(attempt_id, "attempt already completed, finalize is a no-op");
        tx.commit().await?;
        return Ok(());
    }

    let level_id = attempt.assessment_level_id.ok_or_else(|| {
        Error::InvariantViolation(format!("attempt {attempt_id} has no assessment level"))
    })?;
    let level = db::levels::find(&mut *tx, level_id).await?.ok_or_else(|| {
        Error::InvariantViolation(format!("assessment level {level_id} missing"))
    })?;

    // Level-specific scoring.
    let mut dominant_trait: Option<i64> = None;
    let total_score: f64;
    let scores_key: String;
    let scores_value: Value;

    if level.is_disc() {
        let sums = db::answers::disc_factor_sums(&mut *tx, attempt_id).await?;
        let outcome = scorer::disc_outcome(&sums);
        // A DISC attempt whose options carry no factor tags cannot yield a
        // dominant trait; bail out and roll back so the attempt stays in
        // its prior state.
        let Some(code) = &outcome.dominant_factor else {
            warn!(attempt_id, "no factor-tagged options in DISC score rollup");
            return Err(Error::InvariantViolation(format!(
                "attempt {attempt_id} produced no option factors to score"
            )));
        };
        dominant_trait = db::traits::find_by_code(&mut *tx, code)
            .await?
            .map(|t| t.id);
        total_score = outcome.total;
        scores_key = "disc_scores".into();
        scores_value = outcome.scores;
    } else if level.is_agile() {
        let sums = db::answers::category_score_sums(&mut *tx, attempt_id).await?;
        let outcome = scorer::agile_outcome(&sums);
        total_score = outcome.total;
        scores_key = "agile_scores".into();
        scores_value = serde_json::to_value(&outcome)
            .map_err(|e| Error::InvariantViolation(format!("agile scores not serializable: {e}")))?;
    } else {
        let sums = db::answers::category_score_sums(&mut *tx, attempt_id).await?;
        let (map, total) = scorer::category_map(&sums);
        total_score = total;
        scores_key = format!("level{}_scores", level.level_number);
        scores_value = map;
    }

    let counts = db::answers::sincerity_counts(&mut *tx, attempt_id).await?;
    let sincerity_index =
        scorer::sincerity_index(counts.attention_fails, counts.distractions_chosen);
    let sincerity_class = scorer::sincerity_class(sincerity_index);

    let mut updates = Map::new();
    updates.insert("overall_sincerity".into(), json!(sincerity_index));
    updates.insert(scores_key, scores_value);
    let merged_metadata = metadata::merge(&attempt.metadata, updates);

    db::attempts::complete(
        &mut *tx,
        attempt_id,
        now,
        total_score,
        sincerity_index,
        sincerity_class.as_str(),
        dominant_trait,
        &merged_metadata,
    )
    .await?;

    info!(
        attempt_id,
        level_number = level.level_number,
        total_score,
        sincerity_index,
        "attempt completed"
    );

    // Unlock the next mandatory level if this session has an attempt for it.
    let mut has_next = false;
    if let Some(next_level) = db::levels::next_mandatory(&mut *tx, level.level_number).await? {
        if let Some(next_attempt) = db::attempts::find_by_session_and_level(
            &mut *tx,
            attempt.assessment_session_id,
            next_level.id,
        )
        .await?
        {
            has_next = true;

            let unlock_at = now + Duration::hours(next_level.unlock_after_hours);
            let expires_at = unlock_at + Duration::hours(next_level.start_window_hours());
            db::attempts::set_unlock_window(&mut *tx, next_attempt.id, unlock_at, expires_at)
                .await?;
            info!(
                attempt_id = next_attempt.id,
                level_number = next_level.level_number,
                %unlock_at,
                %expires_at,
                "next level unlocked"
            );

            if next_level.is_agile() {
                if let Some(trait_id) = dominant_trait {
                    seed_next_level(
                        &mut tx,
                        &next_attempt,
                        next_level.id,
                        trait_id,
                        attempt.assessment_session_id,
                        now,
                    )
                    .await?;
                }
            }
        }
    }

    if !has_next {
        finalize_session(&mut tx, attempt.assessment_session_id, now).await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Materialize the Level-2 attempt from the trait just derived, with board
/// and set drawn from session metadata (board falling back to the
/// registration's).
async fn seed_next_level(
    tx: &mut Transaction<'_, Postgres>,
    next_attempt: &AssessmentAttempt,
    level_id: i64,
    trait_id: i64,
    session_id: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    let session = db::sessions::find(&mut **tx, session_id).await?;

    let mut set_number = 1;
    let mut student_board = String::new();
    if let Some(session) = &session {
        set_number = metadata::get_i64(&session.metadata, "setNumber").unwrap_or(1) as i32;
        student_board =
            metadata::get_str(&session.metadata, "studentBoard").unwrap_or_default();
    }
    if student_board.is_empty() {
        if let Some(registration_id) = next_attempt.registration_id {
            if let Some(registration) =
                db::registrations::find(&mut **tx, registration_id).await?
            {
                student_board =
                    metadata::get_str(&registration.metadata, "studentBoard").unwrap_or_default();
            }
        }
    }

    let constraints = SelectionConstraints {
        trait_id,
        student_board,
        set_number,
    };
    materializer::seed_for_attempt(tx, next_attempt, level_id, &constraints, now).await?;
    Ok(())
}

/// No further level: close the session, create its report if missing, and
/// refresh the cohort rollup.
async fn finalize_session(
    tx: &mut Transaction<'_, Postgres>,
    session_id: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    let Some(session) = db::sessions::find(&mut **tx, session_id).await? else {
        return Err(Error::InvariantViolation(format!(
            "session {session_id} missing during finalize"
        )));
    };

    db::sessions::complete(&mut **tx, session.id, now).await?;
    info!(session_id = session.id, "session completed");

    match db::reports::find_for_session(&mut **tx, session.id).await? {
        Some(existing) => info!(
            session_id = session.id,
            report_number = %existing.report_number,
            "report already exists, skipping creation"
        ),
        None => create_report(tx, &session, now).await?,
    }

    if let Some(group_id) = session.group_id {
        refresh_cohort(tx, group_id, session.program_id, now).await?;
    }

    Ok(())
}

/// Build the report-number prefix: `OBI-[G{group}-]{MM/YY}-{program}-`.
pub fn report_prefix(group_id: Option<i64>, program_code: &str, now: DateTime<Utc>) -> String {
    let group = group_id.map(|g| format!("G{g}-")).unwrap_or_default();
    format!("OBI-{}{}-{}-", group, now.format("%m/%y"), program_code)
}

/// Append the 1-indexed sequence number, zero-padded to three digits.
pub fn format_report_number(prefix: &str, sequence: i64) -> String {
    format!("{prefix}{sequence:03}")
}

/// Create the session's report row: number it within its prefix and copy
/// the per-level score snapshots from the session's attempts.
async fn create_report(
    tx: &mut Transaction<'_, Postgres>,
    session: &AssessmentSession,
    now: DateTime<Utc>,
) -> Result<()> {
    let program = db::programs::find(&mut **tx, session.program_id)
        .await?
        .ok_or_else(|| {
            Error::InvariantViolation(format!("program {} missing", session.program_id))
        })?;

    let prefix = report_prefix(session.group_id, &program.code, now);
    let existing = db::reports::count_with_prefix(&mut **tx, &prefix).await?;
    let report_number = format_report_number(&prefix, existing + 1);

    let mut report = db::reports::NewReport {
        assessment_session_id: session.id,
        report_number,
        generated_at: now,
        disc_scores: json!({}),
        agile_scores: json!({}),
        level3_scores: json!({}),
        level4_scores: json!({}),
        overall_sincerity: 0.0,
        dominant_trait_id: None,
    };

    let attempts = db::attempts::list_for_session(&mut **tx, session.id).await?;
    for attempt in &attempts {
        let Some(level_id) = attempt.assessment_level_id else {
            continue;
        };
        let Some(level) = db::levels::find(&mut **tx, level_id).await? else {
            continue;
        };

        if level.is_disc() {
            if let Some(slice) = attempt.metadata.get("disc_scores") {
                report.disc_scores = slice.clone();
            }
            report.overall_sincerity = attempt.sincerity_index;
            report.dominant_trait_id = attempt.dominant_trait_id;
        } else if level.is_agile() {
            if let Some(slice) = attempt.metadata.get("agile_scores") {
                report.agile_scores = slice.clone();
            }
        } else if level.level_number == 3 {
            if let Some(slice) = attempt.metadata.get("level3_scores") {
                report.level3_scores = slice.clone();
            }
        } else if level.level_number == 4 {
            if let Some(slice) = attempt.metadata.get("level4_scores") {
                report.level4_scores = slice.clone();
            }
        }
    }

    let report_id = db::reports::insert(&mut **tx, &report).await?;
    info!(
        session_id = session.id,
        report_id,
        report_number = %report.report_number,
        "assessment report created"
    );
    Ok(())
}

/// Recompute the cohort's derived status from its member sessions.
async fn refresh_cohort(
    tx: &mut Transaction<'_, Postgres>,
    group_id: i64,
    program_id: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    let Some(cohort) = db::cohorts::find_by_group_and_program(&mut **tx, group_id, program_id)
        .await?
    else {
        return Ok(());
    };

    let stats = db::cohorts::session_stats(&mut **tx, group_id, program_id).await?;
    let status = cohort::derive_status(stats, cohort.valid_to, now);
    db::cohorts::set_status(&mut **tx, group_id, program_id, status.as_str()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn report_prefix_with_group() {
        let at = Utc.with_ymd_and_hms(2026, 8, 2, 12, 0, 0).unwrap();
        assert_eq!(report_prefix(Some(12), "OBI9", at), "OBI-G12-08/26-OBI9-");
    }

    #[test]
    fn report_prefix_without_group() {
        let at = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 0).unwrap();
        assert_eq!(report_prefix(None, "AGL", at), "OBI-01/25-AGL-");
    }

    #[test]
    fn report_numbers_are_zero_padded_and_sequential() {
        let prefix = "OBI-06/25-AGL-";
        assert_eq!(format_report_number(prefix, 1), "OBI-06/25-AGL-001");
        assert_eq!(format_report_number(prefix, 2), "OBI-06/25-AGL-002");
        assert_eq!(format_report_number(prefix, 42), "OBI-06/25-AGL-042");
        assert_eq!(format_report_number(prefix, 1000), "OBI-06/25-AGL-1000");
    }

    #[test]
    fn submit_request_accepts_minimal_body() {
        let req: SubmitAnswerRequest = serde_json::from_str(
            r#"{"attempt_id": 7, "question_id": 3, "selected_option": 9}"#,
        )
        .unwrap();
        assert_eq!(req.attempt_id, 7);
        assert_eq!(req.time_taken, 0);
        assert_eq!(req.answer_change_count, 0);
        assert!(req.question_source.is_none());
        assert!(req.assessment_answer_id.is_none());
    }

    #[test]
    fn submit_request_full_body() {
        let req: SubmitAnswerRequest = serde_json::from_str(
            r#"{"attempt_id": 7, "question_id": 3, "selected_option": 9,
                "time_taken": 30, "answer_change_count": 2,
                "question_source": "OPEN", "assessment_answer_id": 55}"#,
        )
        .unwrap();
        assert_eq!(req.question_source.as_deref(), Some("OPEN"));
        assert_eq!(req.assessment_answer_id, Some(55));
    }
}
