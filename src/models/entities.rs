//! Persisted row types.
//!
//! One struct per table, mapped with `sqlx::FromRow`. Status columns stay as
//! the raw TEXT value; use the `status()` accessors to get the typed enum
//! (legacy spellings included).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::status::AssessmentStatus;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Program {
    pub id: i64,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssessmentLevel {
    pub id: i64,
    pub name: String,
    pub level_number: i32,
    pub pattern_type: String,
    pub unlock_after_hours: i64,
    pub start_within_hours: i64,
    pub duration_minutes: i64,
    pub is_mandatory: bool,
    pub max_score: f64,
}

impl AssessmentLevel {
    /// Level 1 scores by option DISC factor.
    pub fn is_disc(&self) -> bool {
        self.level_number == 1 || self.pattern_type == "DISC" || self.name == "Level 1"
    }

    /// Level 2 scores by question category across the agile values.
    pub fn is_agile(&self) -> bool {
        self.level_number == 2 || self.name == "Level 2"
    }

    /// Start window in hours, floored at the 72-hour default when unset.
    pub fn start_window_hours(&self) -> i64 {
        if self.start_within_hours > 0 {
            self.start_within_hours
        } else {
            72
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PersonalityTrait {
    pub id: i64,
    pub code: String,
    pub label: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Registration {
    pub id: i64,
    pub user_id: i64,
    pub program_id: Option<i64>,
    pub metadata: Value,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssessmentSession {
    pub id: i64,
    pub user_id: i64,
    pub registration_id: Option<i64>,
    pub program_id: i64,
    pub group_id: Option<i64>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub metadata: Value,
}

impl AssessmentSession {
    pub fn status(&self) -> Option<AssessmentStatus> {
        AssessmentStatus::parse(&self.status)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssessmentAttempt {
    pub id: i64,
    pub assessment_session_id: i64,
    pub user_id: i64,
    pub registration_id: Option<i64>,
    pub program_id: Option<i64>,
    pub assessment_level_id: Option<i64>,
    pub unlock_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: String,
    pub total_score: f64,
    pub sincerity_index: f64,
    pub sincerity_class: Option<String>,
    pub dominant_trait_id: Option<i64>,
    pub metadata: Value,
}

impl AssessmentAttempt {
    pub fn status(&self) -> Option<AssessmentStatus> {
        AssessmentStatus::parse(&self.status)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssessmentAnswer {
    pub id: i64,
    pub assessment_attempt_id: i64,
    pub assessment_session_id: i64,
    pub user_id: i64,
    pub registration_id: Option<i64>,
    pub program_id: Option<i64>,
    pub assessment_level_id: Option<i64>,
    pub main_question_id: Option<i64>,
    pub open_question_id: Option<i64>,
    pub main_option_id: Option<i64>,
    pub open_option_id: Option<i64>,
    pub question_source: String,
    pub question_sequence: i32,
    pub answer_score: f64,
    pub time_spent_seconds: i64,
    pub answer_change_count: i32,
    pub is_attention_fail: bool,
    pub is_distraction_chosen: bool,
    pub sincerity_flag: i32,
    pub status: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssessmentQuestion {
    pub id: i64,
    pub assessment_level_id: i64,
    pub program_id: Option<i64>,
    pub set_number: i32,
    pub board: Option<String>,
    pub personality_trait_id: Option<i64>,
    pub category: Option<String>,
    pub question_text: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct QuestionOption {
    pub id: i64,
    pub question_id: i64,
    pub option_text: String,
    pub display_order: i32,
    pub score_value: f64,
    pub disc_factor: Option<String>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OpenQuestion {
    pub id: i64,
    pub question_text: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OpenQuestionOption {
    pub id: i64,
    pub open_question_id: i64,
    pub option_text: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OpenQuestionImage {
    pub id: i64,
    pub open_question_id: i64,
    pub image_url: String,
}

/// Candidate row for adaptive question selection: just enough to order by
/// board preference.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CandidateQuestion {
    pub id: i64,
    pub board: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssessmentReport {
    pub id: i64,
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

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CohortAssessment {
    pub id: i64,
    pub group_id: i64,
    pub program_id: i64,
    pub status: String,
    pub valid_to: Option<DateTime<Utc>>,
}

impl CohortAssessment {
    pub fn status(&self) -> Option<AssessmentStatus> {
        AssessmentStatus::parse(&self.status)
    }
}

/// `(total, started, completed)` counts over a set of attempts or sessions.
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub struct ProgressStats {
    pub total: i64,
    pub started: i64,
    pub completed: i64,
}
