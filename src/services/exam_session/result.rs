use std::collections::HashMap;

use super::ExamSessionService;
use crate::errors::{ExamError, Result};
use crate::models::answers::entities::Answer;
use crate::models::submissions::responses::{AnswerReview, ExamResultResponse};
use crate::services::access::{load_exam, load_owned_submission};
use crate::services::grading::{count_pending_manual, scoring};

const PASSED_MESSAGE: &str = "Congratulations! You passed the exam.";
const FAILED_MESSAGE: &str = "You did not pass this time. Keep practicing!";

pub async fn get_result(
    service: &ExamSessionService,
    submission_id: i64,
    student_id: i64,
) -> Result<ExamResultResponse> {
    let storage = service.ctx.storage.as_ref();
    let catalog = service.ctx.catalog.as_ref();

    let submission = load_owned_submission(storage, submission_id, student_id).await?;
    if !submission.status.is_submitted() {
        return Err(ExamError::invalid_state(format!(
            "Results are available after the exam is submitted. Current status: {}",
            submission.status
        )));
    }
    let exam = load_exam(catalog, submission.exam_id).await?;

    let answers = storage.list_answers_by_submission(submission_id).await?;
    let pending = count_pending_manual(catalog, &answers).await?;
    let can_view_detailed = !exam.show_score_only && exam.allow_review_after_submit;
    let show_correct = exam.show_correct_answers;

    let (correct_answers, incorrect_answers) = if show_correct {
        (
            Some(answers.iter().filter(|a| a.is_correct == Some(true)).count()),
            Some(answers.iter().filter(|a| a.is_correct == Some(false)).count()),
        )
    } else {
        (None, None)
    };
    let answered_questions = answers.iter().filter(|a| a.has_content()).count();

    let reviews = if can_view_detailed {
        let mut by_question: HashMap<i64, &Answer> =
            answers.iter().map(|a| (a.question_id, a)).collect();
        let mut reviews = Vec::with_capacity(exam.questions.len());
        for question_ref in exam.ordered_questions() {
            let Some(question) = catalog.get_question(question_ref.question_id).await? else {
                continue;
            };
            let answer = by_question.remove(&question.id);
            reviews.push(AnswerReview {
                question_id: question.id,
                question_text: question.question_text.clone(),
                question_type: question.question_type,
                options: question.display_options(),
                student_answer: answer.and_then(|a| a.answer_json.clone()),
                student_answer_text: answer.and_then(|a| a.answer_text.clone()),
                uploaded_file_url: answer.and_then(|a| a.uploaded_file_url.clone()),
                uploaded_file_name: answer.and_then(|a| a.uploaded_file_name.clone()),
                correct_answer: if show_correct {
                    question.correct_answer.clone()
                } else {
                    None
                },
                is_correct: answer.and_then(|a| a.is_correct),
                points_earned: answer.and_then(|a| a.points_earned),
                max_points: answer
                    .and_then(|a| a.max_points)
                    .or(question_ref.points),
                teacher_feedback: answer.and_then(|a| a.teacher_feedback.clone()),
                is_graded: answer.is_some_and(Answer::is_graded),
                requires_manual_grading: question.question_type.requires_manual_grading(),
            });
        }
        Some(reviews)
    } else {
        None
    };

    Ok(ExamResultResponse {
        submission_id: submission.id,
        exam_id: exam.id,
        exam_title: exam.title.clone(),
        attempt_number: submission.attempt_number,
        status: submission.status,
        started_at: submission.started_at,
        submitted_at: submission.submitted_at,
        time_spent_seconds: submission.time_spent_seconds,
        total_score: submission.total_score,
        max_score: submission.max_score,
        percentage: scoring::percentage(submission.total_score, submission.max_score),
        passing_score: exam.passing_threshold(),
        passed: submission.passed,
        total_questions: exam.questions.len(),
        answered_questions,
        correct_answers,
        incorrect_answers,
        pending_manual_grading: pending,
        can_view_detailed,
        answers: reviews,
        message: if submission.passed {
            PASSED_MESSAGE.to_string()
        } else {
            FAILED_MESSAGE.to_string()
        },
    })
}
