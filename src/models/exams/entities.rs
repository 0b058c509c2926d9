//! 考试目录实体
//!
//! 考试与题目由外部的题库/考试管理维护，对答题与阅卷流程只读。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::models::actors::Actor;

/// 选项中标记标准答案的键，展示前必须剔除
pub const CANONICAL_ANSWER_KEY: &str = "correctAnswer";

/// 考试的当前状态（由发布标记与起止时间推导）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExamStatus {
    Draft,
    Published,
    Ongoing,
    Completed,
}

impl fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExamStatus::Draft => "DRAFT",
            ExamStatus::Published => "PUBLISHED",
            ExamStatus::Ongoing => "ONGOING",
            ExamStatus::Completed => "COMPLETED",
        };
        write!(f, "{s}")
    }
}

/// 考试中的一道题（题目引用 + 顺序 + 分值）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamQuestionRef {
    pub question_id: i64,
    pub order: i32,
    /// 历史数据可能缺失分值
    pub points: Option<Decimal>,
}

/// 考试定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamDefinition {
    pub id: i64,
    pub title: String,
    pub created_by: i64,
    /// 所属教学班的任课教师
    pub class_teacher_id: Option<i64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_published: bool,
    pub duration_minutes: i32,
    pub total_score: Decimal,
    pub passing_score: Option<Decimal>,
    pub randomize_questions: bool,
    pub randomize_options: bool,
    pub show_score_only: bool,
    pub show_correct_answers: bool,
    pub allow_review_after_submit: bool,
    pub show_results_after_submit: bool,
    /// 0 表示不限次数
    pub max_attempts: i32,
    pub questions: Vec<ExamQuestionRef>,
}

impl ExamDefinition {
    /// 根据当前时间推导考试状态
    pub fn current_status(&self, now: DateTime<Utc>) -> ExamStatus {
        if !self.is_published {
            return ExamStatus::Draft;
        }
        if self.start_time.is_some_and(|start| now < start) {
            return ExamStatus::Published;
        }
        if self.end_time.is_some_and(|end| now > end) {
            return ExamStatus::Completed;
        }
        ExamStatus::Ongoing
    }

    /// 按配置顺序排列的题目
    pub fn ordered_questions(&self) -> Vec<ExamQuestionRef> {
        let mut questions = self.questions.clone();
        questions.sort_by_key(|q| (q.order, q.question_id));
        questions
    }

    pub fn question_ref(&self, question_id: i64) -> Option<&ExamQuestionRef> {
        self.questions.iter().find(|q| q.question_id == question_id)
    }

    /// 及格线，未设置时视为 0
    pub fn passing_threshold(&self) -> Decimal {
        self.passing_score.unwrap_or(Decimal::ZERO)
    }

    /// 管理员/部门主管、出卷人或教学班任课教师可以管理该考试
    pub fn can_be_managed_by(&self, actor: &Actor) -> bool {
        actor.role.is_supervisor()
            || self.created_by == actor.id
            || self.class_teacher_id == Some(actor.id)
    }
}

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    SingleChoice,
    MultiSelect,
    TrueFalse,
    Essay,
    ShortAnswer,
    Coding,
    FillInBlank,
    Matching,
}

impl QuestionType {
    /// 可以在保存时自动判分的题型
    pub fn is_auto_gradable(&self) -> bool {
        matches!(
            self,
            QuestionType::SingleChoice | QuestionType::MultiSelect | QuestionType::TrueFalse
        )
    }

    /// 结束阅卷前必须由教师给分的题型
    pub fn requires_manual_grading(&self) -> bool {
        matches!(
            self,
            QuestionType::Essay | QuestionType::ShortAnswer | QuestionType::Coding
        )
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QuestionType::SingleChoice => "SINGLE_CHOICE",
            QuestionType::MultiSelect => "MULTI_SELECT",
            QuestionType::TrueFalse => "TRUE_FALSE",
            QuestionType::Essay => "ESSAY",
            QuestionType::ShortAnswer => "SHORT_ANSWER",
            QuestionType::Coding => "CODING",
            QuestionType::FillInBlank => "FILL_IN_BLANK",
            QuestionType::Matching => "MATCHING",
        };
        write!(f, "{s}")
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SINGLE_CHOICE" | "MULTIPLE_CHOICE" => Ok(QuestionType::SingleChoice),
            "MULTI_SELECT" | "MULTIPLE_SELECT" => Ok(QuestionType::MultiSelect),
            "TRUE_FALSE" => Ok(QuestionType::TrueFalse),
            "ESSAY" => Ok(QuestionType::Essay),
            "SHORT_ANSWER" => Ok(QuestionType::ShortAnswer),
            "CODING" => Ok(QuestionType::Coding),
            "FILL_IN_BLANK" => Ok(QuestionType::FillInBlank),
            "MATCHING" => Ok(QuestionType::Matching),
            other => Err(format!("Unknown question type: {other}")),
        }
    }
}

/// 客观题答案（标准答案与学生作答共用同一编码）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnswerKey {
    SingleChoice(String),
    MultiSelect(BTreeSet<String>),
    TrueFalse(bool),
}

impl AnswerKey {
    /// 按题型解析作答载荷，格式不符返回 None
    pub fn decode(question_type: QuestionType, value: &Value) -> Option<Self> {
        match question_type {
            QuestionType::SingleChoice => scalar_key(value).map(AnswerKey::SingleChoice),
            QuestionType::MultiSelect => match value {
                Value::Array(items) => items
                    .iter()
                    .map(scalar_key)
                    .collect::<Option<BTreeSet<_>>>()
                    .map(AnswerKey::MultiSelect),
                _ => None,
            },
            QuestionType::TrueFalse => match value {
                Value::Bool(b) => Some(AnswerKey::TrueFalse(*b)),
                Value::String(s) if s.eq_ignore_ascii_case("true") => {
                    Some(AnswerKey::TrueFalse(true))
                }
                Value::String(s) if s.eq_ignore_ascii_case("false") => {
                    Some(AnswerKey::TrueFalse(false))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// 解析题库中以文本保存的标准答案
    ///
    /// 优先按 JSON 解析；非 JSON 文本视为单个选项键，多选题按逗号拆分。
    pub fn parse_canonical(question_type: QuestionType, raw: &str) -> Option<Self> {
        let key = match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::decode(question_type, &value),
            Err(_) if question_type == QuestionType::MultiSelect => {
                let keys: BTreeSet<String> = raw
                    .split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect();
                Some(AnswerKey::MultiSelect(keys))
            }
            Err(_) => Self::decode(question_type, &Value::String(raw.trim().to_string())),
        };
        // 空的多选答案无法判分
        key.filter(|k| !matches!(k, AnswerKey::MultiSelect(keys) if keys.is_empty()))
    }
}

fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub key: String,
    pub text: Value,
}

/// 题目定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    pub id: i64,
    pub question_type: QuestionType,
    pub question_text: String,
    /// 选项原始 JSON（对象：选项键 -> 文本）
    pub options: Option<Value>,
    /// 标准答案原始文本
    pub correct_answer: Option<String>,
}

impl QuestionDefinition {
    /// 去掉标准答案标记并按选项键排序后的选项
    pub fn display_options(&self) -> Vec<QuestionOption> {
        let mut options: Vec<QuestionOption> = match &self.options {
            Some(Value::Object(map)) => map
                .iter()
                .filter(|(key, _)| key.as_str() != CANONICAL_ANSWER_KEY)
                .map(|(key, text)| QuestionOption {
                    key: key.clone(),
                    text: text.clone(),
                })
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(idx, text)| QuestionOption {
                    key: idx.to_string(),
                    text: text.clone(),
                })
                .collect(),
            _ => Vec::new(),
        };
        options.sort_by(|a, b| a.key.cmp(&b.key));
        options
    }

    /// 标准答案（仅客观题）
    pub fn answer_key(&self) -> Option<AnswerKey> {
        if !self.question_type.is_auto_gradable() {
            return None;
        }
        self.correct_answer
            .as_deref()
            .and_then(|raw| AnswerKey::parse_canonical(self.question_type, raw))
    }
}
