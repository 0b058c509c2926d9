use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::models::exams::entities::{QuestionOption, QuestionType};

/// 保存作答结果
#[derive(Debug, Clone, Serialize)]
pub struct SaveAnswerResponse {
    pub answer_id: i64,
    pub question_id: i64,
    pub saved_at: DateTime<Utc>,
    pub saved_count: i32,
    pub is_auto_save: bool,
    /// 主观题在教师阅卷前始终为 false
    pub is_graded: bool,
    pub points_earned: Option<Decimal>,
    pub message: String,
}

/// 学生已保存的作答
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedAnswer {
    pub answer: Option<Value>,
    pub answer_text: Option<String>,
    pub uploaded_file_url: Option<String>,
    pub uploaded_file_name: Option<String>,
    pub last_saved_at: DateTime<Utc>,
}

/// 答题视图中的一道题（不含标准答案）
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub question_id: i64,
    /// 展示序号（从 1 开始）
    pub display_order: usize,
    pub question_type: QuestionType,
    pub question_text: String,
    pub options: Vec<QuestionOption>,
    pub points: Option<Decimal>,
    pub saved_answer: Option<SavedAnswer>,
    pub is_answered: bool,
}
