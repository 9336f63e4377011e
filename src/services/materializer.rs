//! Adaptive question materialization.
//!
//! Selects up to 25 questions for a later-level attempt, conditioned on the
//! candidate's dominant trait from an earlier level plus board and set
//! constraints, and seeds one NOT_ANSWERED answer slot per question.
//!
//! Selection prefers questions tagged with the candidate's board over
//! board-agnostic ones, randomizing within each band. Seeding deletes any
//! existing slots first, so a retry cannot leave duplicates.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, warn};

use crate::db;
use crate::error::Result;
use crate::models::metadata;
use crate::models::{AssessmentAttempt, AssessmentSession, CandidateQuestion};

/// Number of questions an attempt is filled with when the pool allows.
pub const QUESTION_QUOTA: usize = 25;

/// Resolved selection inputs for one attempt.
#[derive(Debug, Clone)]
pub struct SelectionConstraints {
    pub trait_id: i64,
    /// Candidate's board discriminator; empty when unknown.
    pub student_board: String,
    pub set_number: i32,
}

/// Order the candidate pool: board-matching questions first, then
/// board-agnostic ones, shuffled within each band, capped at the quota.
/// Returned ids are in final `question_sequence` order.
pub fn plan_selection(
    candidates: Vec<CandidateQuestion>,
    student_board: &str,
    rng: &mut impl Rng,
) -> Vec<i64> {
    let (mut preferred, mut fallback): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|c| c.board.as_deref() == Some(student_board));

    preferred.shuffle(rng);
    fallback.shuffle(rng);

    preferred
        .into_iter()
        .chain(fallback)
        .take(QUESTION_QUOTA)
        .map(|c| c.id)
        .collect()
}

/// Select questions and seed the attempt's answer slots inside the given
/// transaction. Returns the number of slots seeded.
pub async fn seed_for_attempt(
    tx: &mut Transaction<'_, Postgres>,
    attempt: &AssessmentAttempt,
    level_id: i64,
    constraints: &SelectionConstraints,
    now: DateTime<Utc>,
) -> Result<usize> {
    let candidates = db::questions::candidates(
        &mut **tx,
        level_id,
        constraints.trait_id,
        &constraints.student_board,
        constraints.set_number,
    )
    .await?;

    let selected = plan_selection(candidates, &constraints.student_board, &mut rand::thread_rng());

    db::answers::delete_for_attempt(&mut **tx, attempt.id).await?;

    for (index, question_id) in selected.iter().enumerate() {
        db::answers::seed_slot(&mut **tx, attempt, level_id, *question_id, index as i32 + 1, now)
            .await?;
    }

    info!(
        attempt_id = attempt.id,
        trait_id = constraints.trait_id,
        board = %constraints.student_board,
        set_number = constraints.set_number,
        seeded = selected.len(),
        "materialized attempt questions"
    );

    Ok(selected.len())
}

/// Resolve selection constraints for the self-heal path, where the trait is
/// not handed in by a finishing earlier level.
///
/// Trait resolution order: the attempt's own dominant trait, then the
/// session metadata, then the most recently completed sibling attempt.
/// Board falls back from session metadata to the registration's metadata.
pub async fn resolve_constraints(
    pool: &PgPool,
    attempt: &AssessmentAttempt,
    session: &AssessmentSession,
) -> Result<Option<SelectionConstraints>> {
    let mut trait_id = attempt.dominant_trait_id;
    if trait_id.is_none() {
        trait_id = metadata::get_i64(&session.metadata, "personalityTraitId");
    }
    if trait_id.is_none() {
        trait_id = db::attempts::latest_completed_trait(pool, session.id).await?;
    }

    let Some(trait_id) = trait_id else {
        return Ok(None);
    };

    let set_number = metadata::get_i64(&session.metadata, "setNumber").unwrap_or(1) as i32;

    let mut student_board = metadata::get_str(&session.metadata, "studentBoard").unwrap_or_default();
    if student_board.is_empty() {
        if let Some(registration_id) = attempt.registration_id {
            if let Some(registration) = db::registrations::find(pool, registration_id).await? {
                student_board =
                    metadata::get_str(&registration.metadata, "studentBoard").unwrap_or_default();
            }
        }
    }

    Ok(Some(SelectionConstraints {
        trait_id,
        student_board,
        set_number,
    }))
}

/// Self-heal for attempts that reached the start endpoint with no seeded
/// questions. Resolves constraints and seeds in a fresh transaction; when
/// the trait cannot be resolved, the slot set is left empty.
pub async fn self_heal(
    pool: &PgPool,
    attempt: &AssessmentAttempt,
    session: &AssessmentSession,
    level_id: i64,
) -> Result<usize> {
    let Some(constraints) = resolve_constraints(pool, attempt, session).await? else {
        warn!(
            attempt_id = attempt.id,
            "cannot materialize questions: no dominant trait resolvable"
        );
        return Ok(0);
    };

    let mut tx = pool.begin().await?;
    let seeded = seed_for_attempt(&mut tx, attempt, level_id, &constraints, Utc::now()).await?;
    tx.commit().await?;
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn candidate(id: i64, board: Option<&str>) -> CandidateQuestion {
        CandidateQuestion {
            id,
            board: board.map(String::from),
        }
    }

    fn pool(board_count: i64, null_count: i64) -> Vec<CandidateQuestion> {
        let mut out = Vec::new();
        for id in 0..board_count {
            out.push(candidate(id, Some("CBSE")));
        }
        for id in 0..null_count {
            out.push(candidate(1000 + id, None));
        }
        out
    }

    #[test]
    fn quota_and_sequence_are_respected() {
        let mut rng = StdRng::seed_from_u64(7);
        let selected = plan_selection(pool(20, 20), "CBSE", &mut rng);
        assert_eq!(selected.len(), QUESTION_QUOTA);

        let mut unique = selected.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), QUESTION_QUOTA);
    }

    #[test]
    fn board_matches_come_strictly_first() {
        // 15 board-tagged + 15 board-agnostic, quota 25: the first 15 slots
        // must all be the board-tagged ones, the last 10 board-agnostic.
        let mut rng = StdRng::seed_from_u64(42);
        let selected = plan_selection(pool(15, 15), "CBSE", &mut rng);
        assert_eq!(selected.len(), 25);
        assert!(selected[..15].iter().all(|id| *id < 1000));
        assert!(selected[15..].iter().all(|id| *id >= 1000));
    }

    #[test]
    fn short_pool_takes_everything() {
        let mut rng = StdRng::seed_from_u64(3);
        let selected = plan_selection(pool(4, 6), "CBSE", &mut rng);
        assert_eq!(selected.len(), 10);
    }

    #[test]
    fn empty_board_prefers_nothing() {
        // With no known board, board-tagged rows never enter the pool in the
        // first place; a NULL-board pool passes through shuffled.
        let mut rng = StdRng::seed_from_u64(9);
        let selected = plan_selection(pool(0, 30), "", &mut rng);
        assert_eq!(selected.len(), QUESTION_QUOTA);
    }

    #[test]
    fn shuffles_within_bands() {
        // Same pool, different seeds: at least one ordering differs.
        let a = plan_selection(pool(30, 0), "CBSE", &mut StdRng::seed_from_u64(1));
        let b = plan_selection(pool(30, 0), "CBSE", &mut StdRng::seed_from_u64(2));
        assert_ne!(a, b);
    }
}
