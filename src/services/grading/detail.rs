use rust_decimal::Decimal;

use super::{GradingService, count_pending_manual};
use crate::errors::Result;
use crate::models::actors::Actor;
use crate::models::grading::responses::{GradingAnswerDetail, SubmissionGradingDetail};
use crate::services::access::load_managed_submission;
use crate::utils::decimal::round2;

/// 教师查看答卷：全部作答、题目、标准答案与判分字段
pub async fn get_submission_detail(
    service: &GradingService,
    submission_id: i64,
    actor: &Actor,
) -> Result<SubmissionGradingDetail> {
    let storage = service.ctx.storage.as_ref();
    let catalog = service.ctx.catalog.as_ref();
    let (submission, exam) =
        load_managed_submission(storage, catalog, submission_id, actor).await?;
    let answers = storage.list_answers_by_submission(submission_id).await?;

    let mut details = Vec::with_capacity(answers.len());
    let mut auto_graded_score = Decimal::ZERO;
    for answer in &answers {
        let Some(question) = catalog.get_question(answer.question_id).await? else {
            continue;
        };
        if question.question_type.is_auto_gradable() {
            auto_graded_score += answer.points_earned.unwrap_or_default();
        }
        details.push(GradingAnswerDetail {
            answer_id: answer.id,
            question_id: question.id,
            question_text: question.question_text.clone(),
            question_type: question.question_type,
            options: question.display_options(),
            correct_answer: question.correct_answer.clone(),
            answer: answer.answer_json.clone(),
            answer_text: answer.answer_text.clone(),
            uploaded_file_url: answer.uploaded_file_url.clone(),
            uploaded_file_name: answer.uploaded_file_name.clone(),
            is_correct: answer.is_correct,
            points_earned: answer.points_earned,
            max_points: answer
                .max_points
                .or_else(|| exam.question_ref(question.id).and_then(|q| q.points)),
            teacher_feedback: answer.teacher_feedback.clone(),
            graded_by: answer.graded_by,
            graded_at: answer.graded_at,
            requires_manual_grading: question.question_type.requires_manual_grading(),
        });
    }

    // 按考试中的题目顺序展示
    let order = exam.ordered_questions();
    details.sort_by_key(|d| {
        order
            .iter()
            .position(|q| q.question_id == d.question_id)
            .unwrap_or(usize::MAX)
    });

    Ok(SubmissionGradingDetail {
        submission_id: submission.id,
        exam_id: exam.id,
        exam_title: exam.title.clone(),
        student_id: submission.student_id,
        attempt_number: submission.attempt_number,
        status: submission.status,
        submitted_at: submission.submitted_at,
        total_score: submission.total_score,
        max_score: submission.max_score,
        auto_graded_score: round2(auto_graded_score),
        pending_manual_grading: count_pending_manual(catalog, &answers).await?,
        answers: details,
    })
}
