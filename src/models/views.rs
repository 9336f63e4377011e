//! Client-facing projections returned by the exam start endpoint.

use serde::Serialize;

use super::entities::{OpenQuestionImage, OpenQuestionOption, QuestionOption};

/// A main question with its options, as delivered to the candidate.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: i64,
    pub question_text: String,
    pub category: Option<String>,
    pub options: Vec<QuestionOptionView>,
}

/// Option projection. Scoring metadata (score, factor, correctness) is
/// withheld from the candidate.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionOptionView {
    pub id: i64,
    pub option_text: String,
    pub display_order: i32,
}

impl From<QuestionOption> for QuestionOptionView {
    fn from(opt: QuestionOption) -> Self {
        Self {
            id: opt.id,
            option_text: opt.option_text,
            display_order: opt.display_order,
        }
    }
}

/// An open (media) question with its options and images.
#[derive(Debug, Clone, Serialize)]
pub struct OpenQuestionView {
    pub id: i64,
    pub question_text: String,
    pub options: Vec<OpenQuestionOption>,
    pub images: Vec<OpenQuestionImage>,
}

/// One answer slot of an attempt, with the question it presents.
///
/// Exactly one of `main_question` / `open_question` is populated, matching
/// `question_source`.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerView {
    pub id: i64,
    pub assessment_attempt_id: i64,
    pub question_sequence: i32,
    pub question_source: String,
    pub status: String,
    pub main_option_id: Option<i64>,
    pub open_option_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_question: Option<OpenQuestionView>,
}
