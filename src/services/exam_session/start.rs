use tracing::{debug, info};

use super::{ExamSessionService, session::session_info};
use crate::errors::{ExamError, Result};
use crate::models::exams::responses::EligibilityResult;
use crate::models::submissions::{entities::NewSubmission, responses::SessionInfo};
use crate::services::access::load_exam;
use crate::services::eligibility;
use crate::services::events::{ExamEvent, publish_best_effort};
use crate::utils::keyed_lock::start_key;

pub async fn check_eligibility(
    service: &ExamSessionService,
    exam_id: i64,
    student_id: i64,
) -> Result<EligibilityResult> {
    let exam = load_exam(service.ctx.catalog.as_ref(), exam_id).await?;
    let history = service
        .ctx
        .storage
        .list_submissions_by_student_and_exam(student_id, exam_id)
        .await?;
    Ok(eligibility::check_eligibility(
        &exam,
        &history,
        service.ctx.clock.now(),
    ))
}

pub async fn start_exam(
    service: &ExamSessionService,
    exam_id: i64,
    student_id: i64,
) -> Result<SessionInfo> {
    // 同一学生同一考试的开考请求串行，存储层的唯一约束兜底
    let _guard = service.ctx.locks.lock(start_key(student_id, exam_id)).await;

    let storage = service.ctx.storage.as_ref();
    let exam = load_exam(service.ctx.catalog.as_ref(), exam_id).await?;
    let history = storage
        .list_submissions_by_student_and_exam(student_id, exam_id)
        .await?;
    let now = service.ctx.clock.now();

    let eligibility = eligibility::check_eligibility(&exam, &history, now);
    if let Some(reason) = eligibility.reason {
        debug!(
            "Student {} is not eligible for exam {}: {}",
            student_id, exam_id, reason
        );
        return Err(ExamError::invalid_state(reason));
    }

    let random = service.ctx.random.as_ref();
    let question_seed = exam.randomize_questions.then(|| random.next_seed());
    let option_seed = exam.randomize_options.then(|| random.next_seed());

    let submission = storage
        .create_submission(NewSubmission {
            exam_id,
            student_id,
            attempt_number: eligibility.attempts_made + 1,
            started_at: now,
            question_seed,
            option_seed,
            max_score: exam.total_score,
        })
        .await?;

    info!(
        "Student {} started exam {} (submission {}, attempt {})",
        student_id, exam_id, submission.id, submission.attempt_number
    );

    let events = service.ctx.events.as_ref();
    publish_best_effort(
        events,
        ExamEvent::SessionStatus {
            exam_id,
            submission_id: submission.id,
            student_id,
            status: submission.status,
            auto_submitted: false,
            at: now,
        },
    );
    publish_best_effort(
        events,
        ExamEvent::TimerSync {
            exam_id,
            submission_id: submission.id,
            remaining_seconds: submission.remaining_seconds(exam.duration_minutes, now),
            must_submit_before: submission.deadline(exam.duration_minutes),
        },
    );

    Ok(session_info(&submission, &exam, &service.policy, now))
}
