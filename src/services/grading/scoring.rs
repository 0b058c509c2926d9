//! 分数汇总

use rust_decimal::Decimal;

use crate::models::answers::entities::Answer;
use crate::models::exams::entities::ExamDefinition;
use crate::utils::decimal::round2;

pub use crate::utils::decimal::percentage;

/// 各题得分之和，未判分按 0 计
pub fn aggregate(answers: &[Answer]) -> Decimal {
    round2(
        answers
            .iter()
            .filter_map(|a| a.points_earned)
            .sum::<Decimal>(),
    )
}

/// 未设置及格线时按 0 处理
pub fn is_passing(total: Decimal, exam: &ExamDefinition) -> bool {
    total >= exam.passing_threshold()
}
