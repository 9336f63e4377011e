//! Per-answer sincerity and attention classification.
//!
//! Runs at submit time for MAIN questions. Open questions are always
//! treated as sincere and carry no attention or distraction evaluation.

use crate::models::QuestionOption;

/// Question category marking an attention check; the candidate must pick
/// the option flagged correct to pass.
pub const CATEGORY_ATTENTION_CHECK: &str = "ATTENTION_CHECK";

/// Question category marking a distraction trap; any selection counts as
/// having chosen the distraction.
pub const CATEGORY_DISTRACTION: &str = "DISTRACTION";

/// Persisted sincerity flag values.
pub const SINCERITY_NOT_SINCERE: i32 = 1;
pub const SINCERITY_SINCERE: i32 = 2;

/// Classification result for one submitted MAIN answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnswerFlags {
    pub answer_score: f64,
    pub is_attention_fail: bool,
    pub is_distraction_chosen: bool,
    pub sincerity_flag: i32,
}

/// Classify a selected option against its question's category.
pub fn classify(category: Option<&str>, option: &QuestionOption) -> AnswerFlags {
    let mut flags = AnswerFlags {
        answer_score: option.score_value,
        is_attention_fail: false,
        is_distraction_chosen: false,
        sincerity_flag: SINCERITY_SINCERE,
    };

    match category {
        Some(CATEGORY_ATTENTION_CHECK) => {
            if !option.is_correct {
                flags.is_attention_fail = true;
                flags.sincerity_flag = SINCERITY_NOT_SINCERE;
            }
        }
        Some(CATEGORY_DISTRACTION) => {
            flags.is_distraction_chosen = true;
            flags.sincerity_flag = SINCERITY_NOT_SINCERE;
        }
        _ => {}
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(score: f64, is_correct: bool) -> QuestionOption {
        QuestionOption {
            id: 1,
            question_id: 10,
            option_text: String::new(),
            display_order: 1,
            score_value: score,
            disc_factor: None,
            is_correct,
        }
    }

    #[test]
    fn plain_question_is_sincere() {
        let flags = classify(Some("Commitment"), &option(3.0, false));
        assert_eq!(flags.answer_score, 3.0);
        assert!(!flags.is_attention_fail);
        assert!(!flags.is_distraction_chosen);
        assert_eq!(flags.sincerity_flag, SINCERITY_SINCERE);
    }

    #[test]
    fn uncategorized_question_is_sincere() {
        let flags = classify(None, &option(2.0, false));
        assert_eq!(flags.sincerity_flag, SINCERITY_SINCERE);
    }

    #[test]
    fn attention_check_failure() {
        let flags = classify(Some(CATEGORY_ATTENTION_CHECK), &option(0.0, false));
        assert!(flags.is_attention_fail);
        assert_eq!(flags.sincerity_flag, SINCERITY_NOT_SINCERE);
    }

    #[test]
    fn attention_check_pass() {
        let flags = classify(Some(CATEGORY_ATTENTION_CHECK), &option(0.0, true));
        assert!(!flags.is_attention_fail);
        assert_eq!(flags.sincerity_flag, SINCERITY_SINCERE);
    }

    #[test]
    fn distraction_always_flags() {
        // Even a "correct" option on a distraction question counts as chosen.
        let flags = classify(Some(CATEGORY_DISTRACTION), &option(1.0, true));
        assert!(flags.is_distraction_chosen);
        assert_eq!(flags.sincerity_flag, SINCERITY_NOT_SINCERE);
    }
}
