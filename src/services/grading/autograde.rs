//! 客观题自动判分
//!
//! 全对得满分，否则 0 分，不设部分分。作答或标准答案无法解析时视为“未判分”，
//! 不会因为客户端的临时问题直接判错。

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;

use crate::models::answers::entities::GradingUpdate;
use crate::models::exams::entities::{AnswerKey, QuestionDefinition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoGrade {
    pub is_correct: bool,
    pub points_earned: Decimal,
}

/// 判分；非客观题或无法解析时返回 None
pub fn grade(
    question: &QuestionDefinition,
    payload: Option<&Value>,
    max_points: Decimal,
) -> Option<AutoGrade> {
    if !question.question_type.is_auto_gradable() {
        return None;
    }
    let Some(expected) = question.answer_key() else {
        warn!(
            "Question {} has no decodable canonical answer, left ungraded",
            question.id
        );
        return None;
    };
    let submitted = AnswerKey::decode(question.question_type, payload?)?;
    let is_correct = submitted == expected;
    Some(AutoGrade {
        is_correct,
        points_earned: if is_correct { max_points } else { Decimal::ZERO },
    })
}

/// 保存作答时应写入的判分字段
pub fn grading_update(
    question: &QuestionDefinition,
    payload: Option<&Value>,
    max_points: Decimal,
) -> GradingUpdate {
    if !question.question_type.is_auto_gradable() {
        return GradingUpdate::Keep;
    }
    match grade(question, payload, max_points) {
        Some(result) => GradingUpdate::Set {
            is_correct: result.is_correct,
            points_earned: result.points_earned,
            max_points,
        },
        None => GradingUpdate::Clear,
    }
}
