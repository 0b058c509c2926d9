use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 学生作答（每份答卷每道题唯一）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub submission_id: i64,
    pub question_id: i64,
    /// 结构化作答（客观题、匹配题等）
    pub answer_json: Option<Value>,
    /// 文本作答（问答、简答）
    pub answer_text: Option<String>,
    pub uploaded_file_url: Option<String>,
    pub uploaded_file_name: Option<String>,
    /// None 表示尚未判分
    pub is_correct: Option<bool>,
    pub points_earned: Option<Decimal>,
    pub max_points: Option<Decimal>,
    pub teacher_feedback: Option<String>,
    pub graded_by: Option<i64>,
    pub graded_at: Option<DateTime<Utc>>,
    pub saved_count: i32,
    pub first_saved_at: DateTime<Utc>,
    pub last_saved_at: DateTime<Utc>,
}

impl Answer {
    /// 是否有实际作答内容
    pub fn has_content(&self) -> bool {
        self.answer_json.as_ref().is_some_and(|v| !v.is_null())
            || self
                .answer_text
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty())
            || self.uploaded_file_url.is_some()
    }

    pub fn is_graded(&self) -> bool {
        self.points_earned.is_some()
    }
}

/// 保存作答时对判分字段的处理
#[derive(Debug, Clone, PartialEq)]
pub enum GradingUpdate {
    /// 主观题：保持教师给分不变
    Keep,
    /// 客观题作答无法解析：回到未判分
    Clear,
    /// 客观题自动判分结果
    Set {
        is_correct: bool,
        points_earned: Decimal,
        max_points: Decimal,
    },
}

/// 一次保存作答的写入内容（按 (答卷, 题目) 查找或创建）
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerWrite {
    pub submission_id: i64,
    pub question_id: i64,
    /// None 时保留已保存的结构化作答
    pub answer_json: Option<Value>,
    pub answer_text: Option<String>,
    pub uploaded_file_url: Option<String>,
    pub uploaded_file_name: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl AnswerWrite {
    /// 把本次写入合并到已有作答（后写覆盖）
    pub fn apply_to(&self, answer: &mut Answer) {
        if let Some(json) = &self.answer_json {
            answer.answer_json = Some(json.clone());
        }
        answer.answer_text = self.answer_text.clone();
        answer.uploaded_file_url = self.uploaded_file_url.clone();
        answer.uploaded_file_name = self.uploaded_file_name.clone();
        answer.saved_count = answer.saved_count.saturating_add(1);
        answer.last_saved_at = self.saved_at;
    }

    /// 首次保存时创建的作答
    pub fn to_new_answer(&self, id: i64) -> Answer {
        Answer {
            id,
            submission_id: self.submission_id,
            question_id: self.question_id,
            answer_json: self.answer_json.clone(),
            answer_text: self.answer_text.clone(),
            uploaded_file_url: self.uploaded_file_url.clone(),
            uploaded_file_name: self.uploaded_file_name.clone(),
            is_correct: None,
            points_earned: None,
            max_points: None,
            teacher_feedback: None,
            graded_by: None,
            graded_at: None,
            saved_count: 1,
            first_saved_at: self.saved_at,
            last_saved_at: self.saved_at,
        }
    }
}

impl GradingUpdate {
    pub fn apply_to(&self, answer: &mut Answer) {
        match self {
            GradingUpdate::Keep => {}
            GradingUpdate::Clear => {
                answer.is_correct = None;
                answer.points_earned = None;
            }
            GradingUpdate::Set {
                is_correct,
                points_earned,
                max_points,
            } => {
                answer.is_correct = Some(*is_correct);
                answer.points_earned = Some(*points_earned);
                answer.max_points = Some(*max_points);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn write(json: Option<Value>, text: Option<&str>) -> AnswerWrite {
        AnswerWrite {
            submission_id: 1,
            question_id: 2,
            answer_json: json,
            answer_text: text.map(str::to_string),
            uploaded_file_url: None,
            uploaded_file_name: None,
            saved_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 5, 0).unwrap(),
        }
    }

    #[test]
    fn test_missing_structured_payload_keeps_previous() {
        let mut answer = write(Some(json!("B")), None).to_new_answer(10);
        write(None, Some("note")).apply_to(&mut answer);
        assert_eq!(answer.answer_json, Some(json!("B")));
        assert_eq!(answer.answer_text.as_deref(), Some("note"));
        assert_eq!(answer.saved_count, 2);
    }

    #[test]
    fn test_grading_update_clear_keeps_max_points() {
        let mut answer = write(Some(json!("B")), None).to_new_answer(10);
        GradingUpdate::Set {
            is_correct: true,
            points_earned: Decimal::from(5),
            max_points: Decimal::from(5),
        }
        .apply_to(&mut answer);
        GradingUpdate::Clear.apply_to(&mut answer);
        assert_eq!(answer.is_correct, None);
        assert_eq!(answer.points_earned, None);
        assert_eq!(answer.max_points, Some(Decimal::from(5)));
    }

    #[test]
    fn test_has_content() {
        assert!(!write(None, Some("   ")).to_new_answer(1).has_content());
        assert!(write(None, Some("essay")).to_new_answer(1).has_content());
        assert!(!write(Some(Value::Null), None).to_new_answer(1).has_content());
    }
}
