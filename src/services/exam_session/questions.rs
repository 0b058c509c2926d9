//! 试题视图
//!
//! 题序与选项顺序完全由答卷上保存的种子决定，同一答卷反复获取得到相同顺序，
//! 断线续考不会打乱学生的作答位置。

use std::collections::HashMap;
use tracing::warn;

use super::ExamSessionService;
use crate::errors::{ExamError, Result};
use crate::models::answers::{
    entities::Answer,
    responses::{QuestionView, SavedAnswer},
};
use crate::models::exams::entities::{ExamDefinition, ExamQuestionRef, QuestionDefinition};
use crate::models::submissions::entities::{Submission, SubmissionStatus};
use crate::services::access::{load_exam, load_owned_submission};
use crate::utils::java_random::seeded_shuffle;

pub async fn get_exam_questions(
    service: &ExamSessionService,
    submission_id: i64,
    student_id: i64,
) -> Result<Vec<QuestionView>> {
    let storage = service.ctx.storage.as_ref();
    let catalog = service.ctx.catalog.as_ref();

    let submission = load_owned_submission(storage, submission_id, student_id).await?;
    if submission.status != SubmissionStatus::InProgress {
        return Err(ExamError::invalid_state(format!(
            "Questions are only available while the exam is IN_PROGRESS. Current status: {}",
            submission.status
        )));
    }
    let exam = load_exam(catalog, submission.exam_id).await?;

    let mut saved: HashMap<i64, Answer> = storage
        .list_answers_by_submission(submission_id)
        .await?
        .into_iter()
        .map(|a| (a.question_id, a))
        .collect();

    let mut views = Vec::with_capacity(exam.questions.len());
    for question_ref in arrange_questions(&exam, &submission) {
        let Some(question) = catalog.get_question(question_ref.question_id).await? else {
            warn!(
                "Exam {} references missing question {}, skipped",
                exam.id, question_ref.question_id
            );
            continue;
        };
        let answer = saved.remove(&question.id);
        views.push(question_view(
            &question,
            &question_ref,
            views.len() + 1,
            answer,
            option_seed(&exam, &submission),
        ));
    }
    Ok(views)
}

/// 按配置顺序排列，开启随机题序时用题序种子打乱
pub fn arrange_questions(exam: &ExamDefinition, submission: &Submission) -> Vec<ExamQuestionRef> {
    let mut ordered = exam.ordered_questions();
    if exam.randomize_questions
        && let Some(seed) = submission.question_seed
    {
        seeded_shuffle(&mut ordered, seed);
    }
    ordered
}

fn option_seed(exam: &ExamDefinition, submission: &Submission) -> Option<i64> {
    exam.randomize_options
        .then_some(submission.option_seed)
        .flatten()
}

fn question_view(
    question: &QuestionDefinition,
    question_ref: &ExamQuestionRef,
    display_order: usize,
    answer: Option<Answer>,
    option_seed: Option<i64>,
) -> QuestionView {
    let mut options = question.display_options();
    if let Some(seed) = option_seed {
        // 每道题用独立子种子
        seeded_shuffle(&mut options, seed.wrapping_add(question.id));
    }
    let is_answered = answer.as_ref().is_some_and(Answer::has_content);
    QuestionView {
        question_id: question.id,
        display_order,
        question_type: question.question_type,
        question_text: question.question_text.clone(),
        options,
        points: question_ref.points,
        saved_answer: answer.map(|a| SavedAnswer {
            answer: a.answer_json,
            answer_text: a.answer_text,
            uploaded_file_url: a.uploaded_file_url,
            uploaded_file_name: a.uploaded_file_name,
            last_saved_at: a.last_saved_at,
        }),
        is_answered,
    }
}
