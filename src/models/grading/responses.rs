use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::models::PaginatedResponse;
use crate::models::exams::entities::{QuestionOption, QuestionType};
use crate::models::submissions::entities::SubmissionStatus;

/// 阅卷列表项
#[derive(Debug, Clone, Serialize)]
pub struct GradingListItem {
    pub submission_id: i64,
    pub exam_id: i64,
    pub exam_title: String,
    pub student_id: i64,
    pub attempt_number: i32,
    pub status: SubmissionStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub total_score: Decimal,
    pub max_score: Decimal,
    pub passed: bool,
    pub auto_submitted: bool,
}

pub type GradingListResponse = PaginatedResponse<GradingListItem>;

/// 单题给分结果
#[derive(Debug, Clone, Serialize)]
pub struct GradedAnswerResponse {
    pub answer_id: i64,
    pub submission_id: i64,
    pub question_id: i64,
    pub points_earned: Decimal,
    pub max_points: Decimal,
    /// 仅满分计为正确
    pub is_correct: bool,
    pub teacher_feedback: Option<String>,
    pub graded_by: i64,
    pub graded_at: DateTime<Utc>,
    pub submission_total_score: Decimal,
    pub remaining_manual_grading: usize,
}

/// 完成阅卷结果
#[derive(Debug, Clone, Serialize)]
pub struct FinalizeGradingResponse {
    pub submission_id: i64,
    pub status: SubmissionStatus,
    pub total_score: Decimal,
    pub max_score: Decimal,
    pub percentage: Option<Decimal>,
    pub passing_score: Decimal,
    pub passed: bool,
    pub graded_answers: usize,
    pub finalized_by: i64,
    pub finalized_at: DateTime<Utc>,
}

/// 分数区间
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRange {
    pub range: String,
    pub count: i64,
}

/// 阅卷统计
#[derive(Debug, Clone, Serialize)]
pub struct GradingStatsResponse {
    pub exam_id: i64,
    pub graded_count: i64,
    /// 已交卷但尚未完成阅卷
    pub awaiting_finalization: i64,
    pub average_score: Decimal,
    pub min_score: Decimal,
    pub max_score: Decimal,
    pub passed_count: i64,
    pub pass_rate: Decimal,
    pub score_distribution: Vec<ScoreRange>,
}

/// 阅卷详情中的单题
#[derive(Debug, Clone, Serialize)]
pub struct GradingAnswerDetail {
    pub answer_id: i64,
    pub question_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Vec<QuestionOption>,
    pub correct_answer: Option<String>,
    pub answer: Option<Value>,
    pub answer_text: Option<String>,
    pub uploaded_file_url: Option<String>,
    pub uploaded_file_name: Option<String>,
    pub is_correct: Option<bool>,
    pub points_earned: Option<Decimal>,
    pub max_points: Option<Decimal>,
    pub teacher_feedback: Option<String>,
    pub graded_by: Option<i64>,
    pub graded_at: Option<DateTime<Utc>>,
    pub requires_manual_grading: bool,
}

/// 阅卷详情
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionGradingDetail {
    pub submission_id: i64,
    pub exam_id: i64,
    pub exam_title: String,
    pub student_id: i64,
    pub attempt_number: i32,
    pub status: SubmissionStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub total_score: Decimal,
    pub max_score: Decimal,
    pub auto_graded_score: Decimal,
    pub pending_manual_grading: usize,
    pub answers: Vec<GradingAnswerDetail>,
}
