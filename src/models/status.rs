//! Lifecycle status vocabulary shared by attempts, sessions, and cohorts.
//!
//! Statuses are persisted as TEXT. `NOT_YET_STARTED` is a legacy spelling of
//! `NOT_STARTED` still present in seeded rows; it is accepted on read and
//! never written back.

use serde::{Deserialize, Serialize};

/// Progress state of an attempt, session, or cohort assessment.
///
/// Valid forward paths: NOT_STARTED → IN_PROGRESS → COMPLETED, with EXPIRED
/// reachable from NOT_STARTED and PARTIALLY_EXPIRED from IN_PROGRESS.
/// COMPLETED, EXPIRED, PARTIALLY_EXPIRED, and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentStatus {
    NotStarted,
    /// Legacy spelling of NOT_STARTED found in seeded rows.
    NotYetStarted,
    InProgress,
    Completed,
    Expired,
    PartiallyExpired,
    Cancelled,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::NotStarted => "NOT_STARTED",
            AssessmentStatus::NotYetStarted => "NOT_YET_STARTED",
            AssessmentStatus::InProgress => "IN_PROGRESS",
            AssessmentStatus::Completed => "COMPLETED",
            AssessmentStatus::Expired => "EXPIRED",
            AssessmentStatus::PartiallyExpired => "PARTIALLY_EXPIRED",
            AssessmentStatus::Cancelled => "CANCELLED",
        }
    }

    /// Parse a persisted status string. Unknown values map to `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NOT_STARTED" => Some(AssessmentStatus::NotStarted),
            "NOT_YET_STARTED" => Some(AssessmentStatus::NotYetStarted),
            "IN_PROGRESS" => Some(AssessmentStatus::InProgress),
            "COMPLETED" => Some(AssessmentStatus::Completed),
            "EXPIRED" => Some(AssessmentStatus::Expired),
            "PARTIALLY_EXPIRED" => Some(AssessmentStatus::PartiallyExpired),
            "CANCELLED" => Some(AssessmentStatus::Cancelled),
            _ => None,
        }
    }

    /// True for NOT_STARTED and its legacy spelling.
    pub fn is_startable(&self) -> bool {
        matches!(
            self,
            AssessmentStatus::NotStarted | AssessmentStatus::NotYetStarted
        )
    }

    /// Terminal states never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AssessmentStatus::Completed
                | AssessmentStatus::Expired
                | AssessmentStatus::PartiallyExpired
                | AssessmentStatus::Cancelled
        )
    }

    /// Whether a transition from `self` to `next` follows the status lattice.
    pub fn may_advance_to(&self, next: AssessmentStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            AssessmentStatus::InProgress => self.is_startable(),
            AssessmentStatus::Completed => *self == AssessmentStatus::InProgress,
            AssessmentStatus::Expired => self.is_startable(),
            AssessmentStatus::PartiallyExpired => *self == AssessmentStatus::InProgress,
            AssessmentStatus::Cancelled => true,
            AssessmentStatus::NotStarted | AssessmentStatus::NotYetStarted => false,
        }
    }
}

/// Whether an answer slot has been filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnswerStatus {
    NotAnswered,
    Answered,
}

impl AnswerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerStatus::NotAnswered => "NOT_ANSWERED",
            AnswerStatus::Answered => "ANSWERED",
        }
    }
}

/// Which question table an answer slot points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionSource {
    Main,
    Open,
}

impl QuestionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionSource::Main => "MAIN",
            QuestionSource::Open => "OPEN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MAIN" => Some(QuestionSource::Main),
            "OPEN" => Some(QuestionSource::Open),
            _ => None,
        }
    }
}

/// Sincerity classification derived from the sincerity index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SincerityClass {
    Sincere,
    Borderline,
    NotSincere,
}

impl SincerityClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SincerityClass::Sincere => "SINCERE",
            SincerityClass::Borderline => "BORDERLINE",
            SincerityClass::NotSincere => "NOT_SINCERE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_spelling_is_startable() {
        assert!(AssessmentStatus::NotYetStarted.is_startable());
        assert!(AssessmentStatus::NotStarted.is_startable());
        assert!(!AssessmentStatus::InProgress.is_startable());
    }

    #[test]
    fn completed_is_a_sink() {
        let completed = AssessmentStatus::Completed;
        for next in [
            AssessmentStatus::NotStarted,
            AssessmentStatus::InProgress,
            AssessmentStatus::Completed,
            AssessmentStatus::Expired,
            AssessmentStatus::PartiallyExpired,
        ] {
            assert!(!completed.may_advance_to(next));
        }
    }

    #[test]
    fn lattice_paths() {
        assert!(AssessmentStatus::NotStarted.may_advance_to(AssessmentStatus::InProgress));
        assert!(AssessmentStatus::NotYetStarted.may_advance_to(AssessmentStatus::InProgress));
        assert!(AssessmentStatus::InProgress.may_advance_to(AssessmentStatus::Completed));
        assert!(AssessmentStatus::NotStarted.may_advance_to(AssessmentStatus::Expired));
        assert!(AssessmentStatus::InProgress.may_advance_to(AssessmentStatus::PartiallyExpired));

        // No skipping straight to COMPLETED, no regressions.
        assert!(!AssessmentStatus::NotStarted.may_advance_to(AssessmentStatus::Completed));
        assert!(!AssessmentStatus::InProgress.may_advance_to(AssessmentStatus::NotStarted));
        assert!(!AssessmentStatus::InProgress.may_advance_to(AssessmentStatus::Expired));
    }

    #[test]
    fn round_trip_persisted_strings() {
        for status in [
            AssessmentStatus::NotStarted,
            AssessmentStatus::NotYetStarted,
            AssessmentStatus::InProgress,
            AssessmentStatus::Completed,
            AssessmentStatus::Expired,
            AssessmentStatus::PartiallyExpired,
            AssessmentStatus::Cancelled,
        ] {
            assert_eq!(AssessmentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AssessmentStatus::parse("GARBAGE"), None);
    }
}
