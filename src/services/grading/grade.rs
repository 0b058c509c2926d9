use rust_decimal::Decimal;
use tracing::info;

use super::{GradingService, count_pending_manual, points::resolve_max_points, scoring};
use crate::errors::{ExamError, Result};
use crate::models::actors::Actor;
use crate::models::grading::{requests::GradeAnswerRequest, responses::GradedAnswerResponse};
use crate::models::submissions::entities::SubmissionStatus;
use crate::services::access::load_managed_submission;
use crate::utils::decimal::round2;
use crate::utils::keyed_lock::submission_key;

pub async fn grade_answer(
    service: &GradingService,
    answer_id: i64,
    actor: &Actor,
    req: GradeAnswerRequest,
) -> Result<GradedAnswerResponse> {
    let storage = service.ctx.storage.as_ref();
    let not_found = || ExamError::not_found(format!("Answer {answer_id} not found"));

    let submission_id = storage
        .get_answer_by_id(answer_id)
        .await?
        .ok_or_else(not_found)?
        .submission_id;
    let _guard = service.ctx.locks.lock(submission_key(submission_id)).await;

    // 加锁后重新读取
    let mut answer = storage.get_answer_by_id(answer_id).await?.ok_or_else(not_found)?;
    let (mut submission, exam) = load_managed_submission(
        storage,
        service.ctx.catalog.as_ref(),
        submission_id,
        actor,
    )
    .await?;

    match submission.status {
        SubmissionStatus::Graded => {
            return Err(ExamError::invalid_state(
                "Submission is already GRADED and can no longer be changed",
            ));
        }
        status if status.is_active() => {
            return Err(ExamError::invalid_state(format!(
                "Cannot grade a submission that has not been submitted. Current status: {status}"
            )));
        }
        _ => {}
    }

    let score = req
        .score
        .ok_or_else(|| ExamError::validation("Score is required"))?;
    if score < Decimal::ZERO {
        return Err(ExamError::validation("Score cannot be negative"));
    }
    let max_points = resolve_max_points(
        answer.max_points,
        exam.question_ref(answer.question_id).and_then(|q| q.points),
        service.fallback_max_points,
        answer.question_id,
    );
    if score > max_points {
        return Err(ExamError::validation(format!(
            "Score {score} exceeds the maximum of {max_points} points"
        )));
    }

    let now = service.ctx.clock.now();
    let score = round2(score);
    answer.max_points = Some(max_points);
    answer.points_earned = Some(score);
    // 只有满分计为正确
    answer.is_correct = Some(score == max_points);
    answer.teacher_feedback = req.feedback;
    answer.graded_by = Some(actor.id);
    answer.graded_at = Some(now);
    let answer = storage.update_answer(&answer).await?;

    let answers = storage.list_answers_by_submission(submission_id).await?;
    submission.total_score = scoring::aggregate(&answers);
    submission.passed = scoring::is_passing(submission.total_score, &exam);
    let submission = storage.update_submission(&submission).await?;
    let remaining = count_pending_manual(service.ctx.catalog.as_ref(), &answers).await?;

    info!(
        "Answer {} of submission {} graded by {}: {}/{}",
        answer.id, submission.id, actor.id, score, max_points
    );

    Ok(GradedAnswerResponse {
        answer_id: answer.id,
        submission_id: submission.id,
        question_id: answer.question_id,
        points_earned: score,
        max_points,
        is_correct: score == max_points,
        teacher_feedback: answer.teacher_feedback,
        graded_by: actor.id,
        graded_at: now,
        submission_total_score: submission.total_score,
        remaining_manual_grading: remaining,
    })
}
