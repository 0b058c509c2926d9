use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::ExamSessionService;
use crate::errors::{ExamError, Result};
use crate::models::exams::entities::ExamDefinition;
use crate::models::submissions::{
    entities::{Submission, SubmissionStatus},
    responses::SubmitExamResponse,
};
use crate::services::access::{load_exam, load_owned_submission};
use crate::services::events::{ExamEvent, publish_best_effort};
use crate::services::grading::{count_pending_manual, scoring};
use crate::utils::keyed_lock::submission_key;

pub async fn submit_exam(
    service: &ExamSessionService,
    submission_id: i64,
    student_id: i64,
) -> Result<SubmitExamResponse> {
    let _guard = service.ctx.locks.lock(submission_key(submission_id)).await;

    let submission =
        load_owned_submission(service.ctx.storage.as_ref(), submission_id, student_id).await?;
    if !submission.status.is_active() {
        return Err(ExamError::invalid_state(format!(
            "Exam has already been submitted. Current status: {}",
            submission.status
        )));
    }
    let exam = load_exam(service.ctx.catalog.as_ref(), submission.exam_id).await?;

    let now = service.ctx.clock.now();
    // 截止后才交卷按强制提交记录
    let auto = submission.is_expired(exam.duration_minutes, now);
    let (submission, pending) = complete_submission(service, submission, &exam, now, auto).await?;

    Ok(SubmitExamResponse {
        submission_id: submission.id,
        status: submission.status,
        submitted_at: now,
        time_spent_seconds: submission.time_spent_seconds.unwrap_or_default(),
        total_score: submission.total_score,
        max_score: submission.max_score,
        percentage: scoring::percentage(submission.total_score, submission.max_score),
        passed: submission.passed,
        auto_submitted: submission.auto_submitted,
        pending_manual_grading: pending,
    })
}

/// 汇总分数并把答卷置为 SUBMITTED
///
/// 调用方必须已持有该答卷的锁。返回更新后的答卷与待人工阅卷的题数。
pub async fn complete_submission(
    service: &ExamSessionService,
    mut submission: Submission,
    exam: &ExamDefinition,
    now: DateTime<Utc>,
    auto: bool,
) -> Result<(Submission, usize)> {
    let storage = service.ctx.storage.as_ref();
    let answers = storage.list_answers_by_submission(submission.id).await?;

    submission.total_score = scoring::aggregate(&answers);
    submission.passed = scoring::is_passing(submission.total_score, exam);
    submission.status = SubmissionStatus::Submitted;
    submission.submitted_at = Some(now);
    submission.time_spent_seconds = Some((now - submission.started_at).num_seconds().max(0));
    submission.auto_submitted = auto;
    let submission = storage.update_submission(&submission).await?;

    if auto {
        info!(
            "Submission {} of student {} force-submitted after its deadline",
            submission.id, submission.student_id
        );
    } else {
        info!(
            "Submission {} submitted by student {}",
            submission.id, submission.student_id
        );
    }

    publish_best_effort(
        service.ctx.events.as_ref(),
        ExamEvent::SessionStatus {
            exam_id: submission.exam_id,
            submission_id: submission.id,
            student_id: submission.student_id,
            status: submission.status,
            auto_submitted: auto,
            at: now,
        },
    );

    let pending = count_pending_manual(service.ctx.catalog.as_ref(), &answers).await?;
    Ok((submission, pending))
}

pub async fn sweep_expired_submissions(service: &ExamSessionService) -> Result<usize> {
    let storage = service.ctx.storage.as_ref();
    let catalog = service.ctx.catalog.as_ref();
    let candidates = storage
        .list_submissions_by_status(&[SubmissionStatus::InProgress])
        .await?;

    let mut swept = 0;
    for candidate in candidates {
        let Some(exam) = catalog.get_exam(candidate.exam_id).await? else {
            warn!(
                "Submission {} references missing exam {}, not swept",
                candidate.id, candidate.exam_id
            );
            continue;
        };
        let now = service.ctx.clock.now();
        if !candidate.is_expired(exam.duration_minutes, now) {
            continue;
        }

        let _guard = service.ctx.locks.lock(submission_key(candidate.id)).await;
        // 加锁期间学生可能已交卷或被暂停
        let Some(current) = storage.get_submission_by_id(candidate.id).await? else {
            continue;
        };
        if current.status != SubmissionStatus::InProgress
            || !current.is_expired(exam.duration_minutes, now)
        {
            continue;
        }
        complete_submission(service, current, &exam, now, true).await?;
        swept += 1;
    }
    Ok(swept)
}
