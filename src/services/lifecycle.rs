//! Attempt lifecycle: the start path.
//!
//! Starting an attempt moves it (and, on first touch, its parent session
//! and cohort) to IN_PROGRESS, then returns the materialized question list.

use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::db;
use crate::error::{Error, Result};
use crate::models::{AnswerView, AssessmentStatus};

/// Start (or resume) an attempt for a candidate and return its answer
/// slots, questions attached, ordered by display sequence.
///
/// Authorization is by ownership: the attempt must belong to `user_id`.
/// A Level-2 attempt that somehow reached this point with no seeded slots
/// is healed by materializing on the spot.
pub async fn start_attempt(
    pool: &PgPool,
    attempt_id: i64,
    user_id: i64,
) -> Result<Vec<AnswerView>> {
    let attempt = db::attempts::find_for_user(pool, attempt_id, user_id)
        .await?
        .ok_or_else(|| {
            Error::NotFoundOrForbidden("assessment attempt not found or access denied".into())
        })?;

    let now = Utc::now();

    if attempt.status().is_some_and(|s| s.is_startable()) {
        db::attempts::mark_in_progress(pool, attempt.id, now).await?;
        info!(attempt_id = attempt.id, user_id, "attempt moved to IN_PROGRESS");
    }

    // Always re-check the parents so a candidate's first touch propagates
    // upward even when the attempt itself was already started.
    let session = db::sessions::find(pool, attempt.assessment_session_id).await?;
    if let Some(session) = &session {
        if session.status().is_some_and(|s| s.is_startable()) {
            db::sessions::mark_in_progress(pool, session.id, now).await?;
        }

        if let Some(group_id) = session.group_id {
            ensure_cohort_in_progress(pool, group_id, session.program_id).await?;
        }
    }

    let answers = db::answers::list_views(pool, attempt_id).await?;
    if !answers.is_empty() {
        return Ok(answers);
    }

    // Fallback self-heal: a Level-2 attempt with no slots gets its
    // questions generated now.
    let (Some(level_id), Some(session)) = (attempt.assessment_level_id, session) else {
        return Ok(answers);
    };
    let Some(level) = db::levels::find(pool, level_id).await? else {
        return Ok(answers);
    };
    if !level.is_agile() {
        return Ok(answers);
    }

    debug!(attempt_id, "no answer slots found for Level 2 attempt, self-healing");
    let seeded = crate::services::materializer::self_heal(pool, &attempt, &session, level_id).await?;
    if seeded == 0 {
        return Ok(Vec::new());
    }

    db::answers::list_views(pool, attempt_id).await
}

/// Move the cohort row to IN_PROGRESS unless it is already there or in a
/// terminal state.
async fn ensure_cohort_in_progress(pool: &PgPool, group_id: i64, program_id: i64) -> Result<()> {
    let Some(cohort) = db::cohorts::find_by_group_and_program(pool, group_id, program_id).await?
    else {
        return Ok(());
    };

    let advance = match cohort.status() {
        Some(status) => status.may_advance_to(AssessmentStatus::InProgress),
        // Unknown legacy value: leave it alone.
        None => false,
    };

    if advance {
        db::cohorts::set_status(
            pool,
            group_id,
            program_id,
            AssessmentStatus::InProgress.as_str(),
        )
        .await?;
    }
    Ok(())
}
