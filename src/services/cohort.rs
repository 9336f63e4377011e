//! Cohort status derivation.
//!
//! The cohort status is derived, not stored truth: both the completion
//! rollup and the scheduler recompute it from member sessions through this
//! one helper, so the two writers cannot disagree.

use chrono::{DateTime, Utc};

use crate::models::{AssessmentStatus, ProgressStats};

/// Derive a cohort's status from its member-session counts and deadline.
pub fn derive_status(
    stats: ProgressStats,
    valid_to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> AssessmentStatus {
    if stats.total == 0 {
        return AssessmentStatus::NotStarted;
    }

    if stats.completed == stats.total {
        return AssessmentStatus::Completed;
    }

    let is_expired = valid_to.is_some_and(|deadline| deadline < now);
    if is_expired {
        if stats.started > 0 {
            AssessmentStatus::PartiallyExpired
        } else {
            AssessmentStatus::Expired
        }
    } else if stats.started > 0 {
        AssessmentStatus::InProgress
    } else {
        AssessmentStatus::NotStarted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn stats(total: i64, started: i64, completed: i64) -> ProgressStats {
        ProgressStats {
            total,
            started,
            completed,
        }
    }

    #[test]
    fn empty_cohort_is_not_started() {
        let now = Utc::now();
        assert_eq!(derive_status(stats(0, 0, 0), None, now), AssessmentStatus::NotStarted);
    }

    #[test]
    fn all_completed_wins_even_past_deadline() {
        let now = Utc::now();
        let past = Some(now - Duration::hours(1));
        assert_eq!(derive_status(stats(3, 3, 3), past, now), AssessmentStatus::Completed);
    }

    #[test]
    fn expired_with_partial_progress() {
        let now = Utc::now();
        let past = Some(now - Duration::seconds(1));
        assert_eq!(
            derive_status(stats(4, 2, 1), past, now),
            AssessmentStatus::PartiallyExpired
        );
    }

    #[test]
    fn expired_untouched() {
        let now = Utc::now();
        let past = Some(now - Duration::seconds(1));
        assert_eq!(derive_status(stats(4, 0, 0), past, now), AssessmentStatus::Expired);
    }

    #[test]
    fn live_cohort_tracks_progress() {
        let now = Utc::now();
        let future = Some(now + Duration::hours(1));
        assert_eq!(derive_status(stats(4, 0, 0), future, now), AssessmentStatus::NotStarted);
        assert_eq!(derive_status(stats(4, 1, 0), future, now), AssessmentStatus::InProgress);
        // No deadline at all behaves like a live cohort.
        assert_eq!(derive_status(stats(4, 1, 0), None, now), AssessmentStatus::InProgress);
    }
}
