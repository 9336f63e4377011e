//! Question bank access: main questions, options, open questions, and the
//! candidate pool for adaptive selection.

use sqlx::{PgExecutor, PgPool};
use std::collections::HashMap;

use crate::error::Result;
use crate::models::{
    AssessmentQuestion, CandidateQuestion, OpenQuestion, OpenQuestionImage, OpenQuestionOption,
    OpenQuestionView, QuestionOption, QuestionView,
};

pub async fn find(
    exec: impl PgExecutor<'_>,
    question_id: i64,
) -> Result<Option<AssessmentQuestion>> {
    let row = sqlx::query_as::<_, AssessmentQuestion>(
        "SELECT id, assessment_level_id, program_id, set_number, board, \
                personality_trait_id, category, question_text \
         FROM assessment_questions WHERE id = $1",
    )
    .bind(question_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

pub async fn find_option(
    exec: impl PgExecutor<'_>,
    option_id: i64,
) -> Result<Option<QuestionOption>> {
    let row = sqlx::query_as::<_, QuestionOption>(
        "SELECT id, question_id, option_text, display_order, score_value, disc_factor, is_correct \
         FROM assessment_question_options WHERE id = $1",
    )
    .bind(option_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

/// Candidate pool for adaptive materialization: level + trait + set, with the
/// board either matching the student's or unset.
pub async fn candidates(
    exec: impl PgExecutor<'_>,
    level_id: i64,
    trait_id: i64,
    student_board: &str,
    set_number: i32,
) -> Result<Vec<CandidateQuestion>> {
    let rows = sqlx::query_as::<_, CandidateQuestion>(
        "SELECT id, board FROM assessment_questions \
         WHERE assessment_level_id = $1 \
           AND personality_trait_id = $2 \
           AND (board = $3 OR board IS NULL) \
           AND set_number = $4",
    )
    .bind(level_id)
    .bind(trait_id)
    .bind(student_board)
    .bind(set_number)
    .fetch_all(exec)
    .await?;
    Ok(rows)
}

/// Load full question projections, keyed by question id. Options are ordered
/// by display order.
pub async fn load_views(pool: &PgPool, ids: &[i64]) -> Result<HashMap<i64, QuestionView>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let questions = sqlx::query_as::<_, AssessmentQuestion>(
        "SELECT id, assessment_level_id, program_id, set_number, board, \
                personality_trait_id, category, question_text \
         FROM assessment_questions WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    let options = sqlx::query_as::<_, QuestionOption>(
        "SELECT id, question_id, option_text, display_order, score_value, disc_factor, is_correct \
         FROM assessment_question_options \
         WHERE question_id = ANY($1) \
         ORDER BY display_order ASC",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<i64, Vec<QuestionOption>> = HashMap::new();
    for opt in options {
        grouped.entry(opt.question_id).or_default().push(opt);
    }

    let views = questions
        .into_iter()
        .map(|q| {
            let options = grouped
                .remove(&q.id)
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect();
            (
                q.id,
                QuestionView {
                    id: q.id,
                    question_text: q.question_text,
                    category: q.category,
                    options,
                },
            )
        })
        .collect();
    Ok(views)
}

/// Load open question projections with options and images, keyed by id.
pub async fn load_open_views(
    pool: &PgPool,
    ids: &[i64],
) -> Result<HashMap<i64, OpenQuestionView>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let questions = sqlx::query_as::<_, OpenQuestion>(
        "SELECT id, question_text FROM open_questions WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    let options = sqlx::query_as::<_, OpenQuestionOption>(
        "SELECT id, open_question_id, option_text \
         FROM open_question_options WHERE open_question_id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    let images = sqlx::query_as::<_, OpenQuestionImage>(
        "SELECT id, open_question_id, image_url \
         FROM open_question_images WHERE open_question_id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    let mut opt_groups: HashMap<i64, Vec<OpenQuestionOption>> = HashMap::new();
    for opt in options {
        opt_groups.entry(opt.open_question_id).or_default().push(opt);
    }
    let mut img_groups: HashMap<i64, Vec<OpenQuestionImage>> = HashMap::new();
    for img in images {
        img_groups.entry(img.open_question_id).or_default().push(img);
    }

    let views = questions
        .into_iter()
        .map(|q| {
            (
                q.id,
                OpenQuestionView {
                    id: q.id,
                    question_text: q.question_text,
                    options: opt_groups.remove(&q.id).unwrap_or_default(),
                    images: img_groups.remove(&q.id).unwrap_or_default(),
                },
            )
        })
        .collect();
    Ok(views)
}
