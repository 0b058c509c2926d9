use chrono::{DateTime, Utc};

use super::ExamSessionService;
use crate::config::SessionPolicy;
use crate::errors::{ExamError, Result};
use crate::models::exams::entities::ExamDefinition;
use crate::models::submissions::{entities::Submission, responses::SessionInfo};
use crate::services::access::{load_exam, load_owned_submission};

/// 由答卷与考试推导会话信息
pub fn session_info(
    submission: &Submission,
    exam: &ExamDefinition,
    policy: &SessionPolicy,
    now: DateTime<Utc>,
) -> SessionInfo {
    SessionInfo {
        submission_id: submission.id,
        exam_id: exam.id,
        exam_title: exam.title.clone(),
        attempt_number: submission.attempt_number,
        status: submission.status,
        started_at: submission.started_at,
        must_submit_before: submission.deadline(exam.duration_minutes),
        remaining_seconds: submission.remaining_seconds(exam.duration_minutes, now),
        duration_minutes: exam.duration_minutes,
        total_questions: exam.questions.len(),
        randomize_questions: exam.randomize_questions,
        randomize_options: exam.randomize_options,
        auto_save_interval_seconds: policy.auto_save_interval_seconds,
    }
}

pub async fn get_session(
    service: &ExamSessionService,
    submission_id: i64,
    student_id: i64,
) -> Result<SessionInfo> {
    let submission =
        load_owned_submission(service.ctx.storage.as_ref(), submission_id, student_id).await?;
    if !submission.status.is_active() {
        return Err(ExamError::invalid_state(format!(
            "Submission is no longer active. Current status: {}",
            submission.status
        )));
    }
    let exam = load_exam(service.ctx.catalog.as_ref(), submission.exam_id).await?;
    Ok(session_info(
        &submission,
        &exam,
        &service.policy,
        service.ctx.clock.now(),
    ))
}
