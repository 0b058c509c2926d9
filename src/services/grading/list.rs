use std::collections::HashMap;

use super::GradingService;
use crate::errors::{ExamError, Result};
use crate::models::PaginatedResponse;
use crate::models::actors::Actor;
use crate::models::grading::{
    requests::GradingListQuery,
    responses::{GradingListItem, GradingListResponse},
};
use crate::models::submissions::entities::SubmissionStatus;
use crate::services::access::{ensure_can_manage, load_exam, managed_exam_ids};

pub async fn list_for_grading(
    service: &GradingService,
    actor: &Actor,
    query: GradingListQuery,
) -> Result<GradingListResponse> {
    // 进行中的答卷永远不进入阅卷队列
    let statuses: Vec<SubmissionStatus> = match query.status {
        None => SubmissionStatus::grading_visible().to_vec(),
        Some(status) if status.is_submitted() => vec![status],
        Some(status) => {
            return Err(ExamError::validation(format!(
                "Status filter must be SUBMITTED or GRADED, got {status}"
            )));
        }
    };

    let catalog = service.ctx.catalog.as_ref();
    let exam_ids = match query.exam_id {
        Some(exam_id) => {
            let exam = load_exam(catalog, exam_id).await?;
            ensure_can_manage(&exam, actor)?;
            vec![exam_id]
        }
        None => managed_exam_ids(catalog, actor).await?,
    };

    let mut submissions = service
        .ctx
        .storage
        .list_submissions_by_exams(&exam_ids, &statuses)
        .await?;
    submissions.sort_by(|a, b| {
        b.submitted_at
            .cmp(&a.submitted_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    let mut titles: HashMap<i64, String> = HashMap::new();
    let mut items = Vec::with_capacity(submissions.len());
    for submission in submissions {
        if !titles.contains_key(&submission.exam_id) {
            let title = catalog
                .get_exam(submission.exam_id)
                .await?
                .map(|e| e.title)
                .unwrap_or_default();
            titles.insert(submission.exam_id, title);
        }
        items.push(GradingListItem {
            submission_id: submission.id,
            exam_id: submission.exam_id,
            exam_title: titles
                .get(&submission.exam_id)
                .cloned()
                .unwrap_or_default(),
            student_id: submission.student_id,
            attempt_number: submission.attempt_number,
            status: submission.status,
            submitted_at: submission.submitted_at,
            total_score: submission.total_score,
            max_score: submission.max_score,
            passed: submission.passed,
            auto_submitted: submission.auto_submitted,
        });
    }

    Ok(PaginatedResponse::from_sorted(items, query.page, query.size))
}
