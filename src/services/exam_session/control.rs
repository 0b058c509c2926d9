//! 教师暂停/恢复

use tracing::info;

use super::ExamSessionService;
use crate::errors::{ExamError, Result};
use crate::models::actors::Actor;
use crate::models::submissions::{
    entities::SubmissionStatus,
    requests::{PauseExamRequest, ResumeExamRequest},
    responses::StatusChangeResponse,
};
use crate::services::access::load_managed_submission;
use crate::services::events::{ExamEvent, publish_best_effort};
use crate::utils::keyed_lock::submission_key;

pub async fn pause_exam(
    service: &ExamSessionService,
    submission_id: i64,
    actor: &Actor,
    req: PauseExamRequest,
) -> Result<StatusChangeResponse> {
    let _guard = service.ctx.locks.lock(submission_key(submission_id)).await;
    let (mut submission, exam) = load_managed_submission(
        service.ctx.storage.as_ref(),
        service.ctx.catalog.as_ref(),
        submission_id,
        actor,
    )
    .await?;

    let previous_status = submission.status;
    if previous_status != SubmissionStatus::InProgress {
        return Err(ExamError::invalid_state(format!(
            "Can only pause IN_PROGRESS exams. Current status: {previous_status}"
        )));
    }

    submission.status = SubmissionStatus::Paused;
    let submission = service.ctx.storage.update_submission(&submission).await?;
    let now = service.ctx.clock.now();

    info!(
        "Submission {} paused by {} (reason: {})",
        submission.id,
        actor.id,
        req.reason.as_deref().unwrap_or("-")
    );
    publish_best_effort(
        service.ctx.events.as_ref(),
        ExamEvent::SessionStatus {
            exam_id: exam.id,
            submission_id: submission.id,
            student_id: submission.student_id,
            status: submission.status,
            auto_submitted: false,
            at: now,
        },
    );

    Ok(StatusChangeResponse {
        submission_id: submission.id,
        previous_status,
        status: submission.status,
        must_submit_before: submission.deadline(exam.duration_minutes),
        extra_minutes: submission.extra_minutes,
        changed_by: actor.id,
        changed_at: now,
        reason: req.reason,
    })
}

pub async fn resume_exam(
    service: &ExamSessionService,
    submission_id: i64,
    actor: &Actor,
    req: ResumeExamRequest,
) -> Result<StatusChangeResponse> {
    let _guard = service.ctx.locks.lock(submission_key(submission_id)).await;
    let (mut submission, exam) = load_managed_submission(
        service.ctx.storage.as_ref(),
        service.ctx.catalog.as_ref(),
        submission_id,
        actor,
    )
    .await?;

    let previous_status = submission.status;
    if previous_status != SubmissionStatus::Paused {
        return Err(ExamError::invalid_state(format!(
            "Can only resume PAUSED exams. Current status: {previous_status}"
        )));
    }
    let additional = req.additional_minutes.unwrap_or(0);
    if additional < 0 {
        return Err(ExamError::validation(
            "Additional minutes cannot be negative",
        ));
    }

    // 追加时间顺延截止时间
    submission.extra_minutes = submission.extra_minutes.saturating_add(additional);
    submission.status = SubmissionStatus::InProgress;
    let submission = service.ctx.storage.update_submission(&submission).await?;
    let now = service.ctx.clock.now();

    info!(
        "Submission {} resumed by {} with {} extra minute(s)",
        submission.id, actor.id, additional
    );
    let events = service.ctx.events.as_ref();
    publish_best_effort(
        events,
        ExamEvent::SessionStatus {
            exam_id: exam.id,
            submission_id: submission.id,
            student_id: submission.student_id,
            status: submission.status,
            auto_submitted: false,
            at: now,
        },
    );
    publish_best_effort(
        events,
        ExamEvent::TimerSync {
            exam_id: exam.id,
            submission_id: submission.id,
            remaining_seconds: submission.remaining_seconds(exam.duration_minutes, now),
            must_submit_before: submission.deadline(exam.duration_minutes),
        },
    );

    Ok(StatusChangeResponse {
        submission_id: submission.id,
        previous_status,
        status: submission.status,
        must_submit_before: submission.deadline(exam.duration_minutes),
        extra_minutes: submission.extra_minutes,
        changed_by: actor.id,
        changed_at: now,
        reason: None,
    })
}
