//! 开考资格判定
//!
//! 纯函数：按顺序检查考试状态、次数上限与活动答卷，第一条不满足的规则决定结果。

use chrono::{DateTime, Utc};

use crate::models::exams::entities::{ExamDefinition, ExamStatus};
use crate::models::exams::responses::EligibilityResult;
use crate::models::submissions::entities::Submission;

pub fn check_eligibility(
    exam: &ExamDefinition,
    history: &[Submission],
    now: DateTime<Utc>,
) -> EligibilityResult {
    let exam_status = exam.current_status(now);
    let attempts_made = i32::try_from(history.len()).unwrap_or(i32::MAX);
    let remaining_attempts =
        (exam.max_attempts > 0).then(|| (exam.max_attempts - attempts_made).max(0));
    let active_submission_id = history
        .iter()
        .find(|s| s.status.is_active())
        .map(|s| s.id);

    let reason = if !matches!(exam_status, ExamStatus::Published | ExamStatus::Ongoing) {
        Some(format!("Exam is not available yet (status: {exam_status})"))
    } else if exam.max_attempts > 0 && attempts_made >= exam.max_attempts {
        Some(format!(
            "Maximum attempts reached ({attempts_made}/{})",
            exam.max_attempts
        ))
    } else {
        active_submission_id.map(|id| format!("An active submission is already in progress ({id})"))
    };

    EligibilityResult {
        eligible: reason.is_none(),
        reason,
        exam_status,
        attempts_made,
        remaining_attempts,
        active_submission_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submissions::entities::SubmissionStatus;
    use crate::test_support::fixtures;
    use chrono::Duration;

    fn attempt(id: i64, status: SubmissionStatus) -> Submission {
        fixtures::submission(id, 1, 5, status)
    }

    #[test]
    fn test_unpublished_exam_is_rejected_first() {
        let mut exam = fixtures::exam(1, vec![]);
        exam.is_published = false;
        exam.max_attempts = 1;
        let result = check_eligibility(
            &exam,
            &[attempt(1, SubmissionStatus::Submitted)],
            fixtures::t0(),
        );
        assert!(!result.eligible);
        assert_eq!(result.exam_status, ExamStatus::Draft);
        assert!(result.reason.unwrap().contains("not available yet"));
    }

    #[test]
    fn test_finished_exam_is_not_available() {
        let mut exam = fixtures::exam(1, vec![]);
        exam.end_time = Some(fixtures::t0() - Duration::hours(1));
        let result = check_eligibility(&exam, &[], fixtures::t0());
        assert!(!result.eligible);
        assert_eq!(result.exam_status, ExamStatus::Completed);
    }

    #[test]
    fn test_max_attempts_reached() {
        let mut exam = fixtures::exam(1, vec![]);
        exam.max_attempts = 2;
        let history = vec![
            attempt(1, SubmissionStatus::Graded),
            attempt(2, SubmissionStatus::Submitted),
        ];
        let result = check_eligibility(&exam, &history, fixtures::t0());
        assert!(!result.eligible);
        assert_eq!(result.attempts_made, 2);
        assert_eq!(result.remaining_attempts, Some(0));
        assert!(result.reason.unwrap().contains("Maximum attempts reached"));
    }

    #[test]
    fn test_active_submission_reported_for_resume() {
        let exam = fixtures::exam(1, vec![]);
        let history = vec![
            attempt(1, SubmissionStatus::Submitted),
            attempt(2, SubmissionStatus::Paused),
        ];
        let result = check_eligibility(&exam, &history, fixtures::t0());
        assert!(!result.eligible);
        assert_eq!(result.active_submission_id, Some(2));
        assert_eq!(result.remaining_attempts, None);
        assert!(result.reason.unwrap().contains("active submission"));
    }

    #[test]
    fn test_eligible_with_remaining_attempts() {
        let mut exam = fixtures::exam(1, vec![]);
        exam.max_attempts = 3;
        let result = check_eligibility(
            &exam,
            &[attempt(1, SubmissionStatus::Graded)],
            fixtures::t0(),
        );
        assert!(result.eligible);
        assert_eq!(result.reason, None);
        assert_eq!(result.remaining_attempts, Some(2));
        assert_eq!(result.exam_status, ExamStatus::Ongoing);
    }
}
