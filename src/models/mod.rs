//! Data model: status enums, persisted row types, and client-facing views.

pub mod entities;
pub mod metadata;
pub mod status;
pub mod views;

pub use entities::*;
pub use status::{AnswerStatus, AssessmentStatus, QuestionSource, SincerityClass};
pub use views::{AnswerView, OpenQuestionView, QuestionOptionView, QuestionView};
