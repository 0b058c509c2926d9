use tracing::debug;

use super::{ExamSessionService, submit::complete_submission};
use crate::errors::{ExamError, Result};
use crate::models::answers::{
    entities::{AnswerWrite, GradingUpdate},
    requests::SaveAnswerRequest,
    responses::SaveAnswerResponse,
};
use crate::models::submissions::entities::SubmissionStatus;
use crate::services::access::{load_exam, load_owned_submission};
use crate::services::events::{ExamEvent, publish_best_effort};
use crate::services::grading::{autograde, points::resolve_max_points};
use crate::utils::keyed_lock::submission_key;

pub async fn save_answer(
    service: &ExamSessionService,
    submission_id: i64,
    student_id: i64,
    req: SaveAnswerRequest,
) -> Result<SaveAnswerResponse> {
    let _guard = service.ctx.locks.lock(submission_key(submission_id)).await;
    let storage = service.ctx.storage.as_ref();
    let catalog = service.ctx.catalog.as_ref();

    let submission = load_owned_submission(storage, submission_id, student_id).await?;
    if submission.status != SubmissionStatus::InProgress {
        return Err(ExamError::invalid_state(format!(
            "Answers can only be saved while the exam is IN_PROGRESS. Current status: {}",
            submission.status
        )));
    }
    let exam = load_exam(catalog, submission.exam_id).await?;

    let now = service.ctx.clock.now();
    if submission.is_expired(exam.duration_minutes, now) {
        // 客户端计时可能漂移，过期答卷在这里同步强制提交
        complete_submission(service, submission, &exam, now, true).await?;
        return Err(ExamError::expired(
            "Exam time has expired. Your answers were submitted automatically",
        ));
    }

    let question_ref = exam.question_ref(req.question_id).ok_or_else(|| {
        ExamError::not_found(format!(
            "Question {} is not part of exam {}",
            req.question_id, exam.id
        ))
    })?;
    let question = catalog
        .get_question(req.question_id)
        .await?
        .ok_or_else(|| ExamError::not_found(format!("Question {} not found", req.question_id)))?;

    let auto_gradable = question.question_type.is_auto_gradable();
    // 未提交结构化作答时保留原载荷，判分结果也随之保留
    let grading = if auto_gradable && req.answer.is_some() {
        let max_points = resolve_max_points(
            None,
            question_ref.points,
            service.grading_fallback(),
            question.id,
        );
        autograde::grading_update(&question, req.answer.as_ref(), max_points)
    } else {
        GradingUpdate::Keep
    };

    let answer = storage
        .upsert_answer(
            AnswerWrite {
                submission_id,
                question_id: question.id,
                answer_json: req.answer,
                answer_text: req.answer_text,
                uploaded_file_url: req.uploaded_file_url,
                uploaded_file_name: req.uploaded_file_name,
                saved_at: now,
            },
            grading,
        )
        .await?;
    storage.touch_submission(submission_id, now).await?;

    debug!(
        "Answer saved for submission {} question {} (auto: {})",
        submission_id, question.id, req.is_auto_save
    );

    let answered_questions = storage
        .list_answers_by_submission(submission_id)
        .await?
        .iter()
        .filter(|a| a.has_content())
        .count();
    publish_best_effort(
        service.ctx.events.as_ref(),
        ExamEvent::ProgressUpdate {
            exam_id: exam.id,
            submission_id,
            student_id,
            answered_questions,
            total_questions: exam.questions.len(),
            saved_at: now,
        },
    );

    // 主观题在教师阅卷前不透露任何判分信息
    let is_graded = auto_gradable && answer.is_graded();
    Ok(SaveAnswerResponse {
        answer_id: answer.id,
        question_id: answer.question_id,
        saved_at: now,
        saved_count: answer.saved_count,
        is_auto_save: req.is_auto_save,
        is_graded,
        points_earned: if is_graded { answer.points_earned } else { None },
        message: if req.is_auto_save {
            "Answer auto-saved".to_string()
        } else {
            "Answer saved".to_string()
        },
    })
}
