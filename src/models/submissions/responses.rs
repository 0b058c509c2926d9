use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use super::entities::SubmissionStatus;
use crate::models::exams::entities::{QuestionOption, QuestionType};

/// 考试会话信息（开始考试 / 续考）
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub submission_id: i64,
    pub exam_id: i64,
    pub exam_title: String,
    pub attempt_number: i32,
    pub status: SubmissionStatus,
    pub started_at: DateTime<Utc>,
    pub must_submit_before: DateTime<Utc>,
    pub remaining_seconds: i64,
    pub duration_minutes: i32,
    pub total_questions: usize,
    pub randomize_questions: bool,
    pub randomize_options: bool,
    /// 客户端自动保存间隔建议（秒）
    pub auto_save_interval_seconds: u32,
}

/// 交卷结果
#[derive(Debug, Clone, Serialize)]
pub struct SubmitExamResponse {
    pub submission_id: i64,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub time_spent_seconds: i64,
    pub total_score: Decimal,
    pub max_score: Decimal,
    pub percentage: Option<Decimal>,
    pub passed: bool,
    pub auto_submitted: bool,
    /// 仍需教师阅卷的题目数
    pub pending_manual_grading: usize,
}

/// 单题回顾
#[derive(Debug, Clone, Serialize)]
pub struct AnswerReview {
    pub question_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Vec<QuestionOption>,
    pub student_answer: Option<Value>,
    pub student_answer_text: Option<String>,
    pub uploaded_file_url: Option<String>,
    pub uploaded_file_name: Option<String>,
    /// 仅在考试允许显示标准答案时返回
    pub correct_answer: Option<String>,
    pub is_correct: Option<bool>,
    pub points_earned: Option<Decimal>,
    pub max_points: Option<Decimal>,
    pub teacher_feedback: Option<String>,
    pub is_graded: bool,
    pub requires_manual_grading: bool,
}

/// 成绩查看
#[derive(Debug, Clone, Serialize)]
pub struct ExamResultResponse {
    pub submission_id: i64,
    pub exam_id: i64,
    pub exam_title: String,
    pub attempt_number: i32,
    pub status: SubmissionStatus,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub time_spent_seconds: Option<i64>,
    pub total_score: Decimal,
    pub max_score: Decimal,
    pub percentage: Option<Decimal>,
    pub passing_score: Decimal,
    pub passed: bool,
    pub total_questions: usize,
    pub answered_questions: usize,
    pub correct_answers: Option<usize>,
    pub incorrect_answers: Option<usize>,
    pub pending_manual_grading: usize,
    pub can_view_detailed: bool,
    pub answers: Option<Vec<AnswerReview>>,
    pub message: String,
}

/// 教师暂停/恢复操作结果
#[derive(Debug, Clone, Serialize)]
pub struct StatusChangeResponse {
    pub submission_id: i64,
    pub previous_status: SubmissionStatus,
    pub status: SubmissionStatus,
    pub must_submit_before: DateTime<Utc>,
    pub extra_minutes: i32,
    pub changed_by: i64,
    pub changed_at: DateTime<Utc>,
    pub reason: Option<String>,
}
