use tracing::info;

use super::{GradingService, count_pending_manual, scoring};
use crate::errors::{ExamError, Result};
use crate::models::actors::Actor;
use crate::models::grading::responses::FinalizeGradingResponse;
use crate::models::submissions::entities::SubmissionStatus;
use crate::services::access::load_managed_submission;
use crate::utils::keyed_lock::submission_key;

pub async fn finalize_grading(
    service: &GradingService,
    submission_id: i64,
    actor: &Actor,
) -> Result<FinalizeGradingResponse> {
    let _guard = service.ctx.locks.lock(submission_key(submission_id)).await;
    let storage = service.ctx.storage.as_ref();
    let catalog = service.ctx.catalog.as_ref();

    let (mut submission, exam) =
        load_managed_submission(storage, catalog, submission_id, actor).await?;
    if submission.status != SubmissionStatus::Submitted {
        return Err(ExamError::invalid_state(format!(
            "Only SUBMITTED exams can be finalized. Current status: {}",
            submission.status
        )));
    }

    let answers = storage.list_answers_by_submission(submission_id).await?;
    let pending = count_pending_manual(catalog, &answers).await?;
    if pending > 0 {
        return Err(ExamError::invalid_state(format!(
            "Cannot finalize: {pending} answer(s) still need manual grading"
        )));
    }

    submission.total_score = scoring::aggregate(&answers);
    submission.passed = scoring::is_passing(submission.total_score, &exam);
    submission.status = SubmissionStatus::Graded;
    let submission = storage.update_submission(&submission).await?;

    info!(
        "Submission {} finalized by {} with score {}/{}",
        submission.id, actor.id, submission.total_score, submission.max_score
    );

    Ok(FinalizeGradingResponse {
        submission_id: submission.id,
        status: submission.status,
        total_score: submission.total_score,
        max_score: submission.max_score,
        percentage: scoring::percentage(submission.total_score, submission.max_score),
        passing_score: exam.passing_threshold(),
        passed: submission.passed,
        graded_answers: answers.iter().filter(|a| a.is_graded()).count(),
        finalized_by: actor.id,
        finalized_at: service.ctx.clock.now(),
    })
}
