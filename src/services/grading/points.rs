//! 单题满分解析
//!
//! 三级顺序：作答上已记录的值 → 考试题目配置 → 兜底默认值。
//! 走到兜底说明历史数据缺失分值，必须记录告警。

use rust_decimal::Decimal;
use tracing::warn;

pub fn resolve_max_points(
    stored: Option<Decimal>,
    configured: Option<Decimal>,
    fallback: Decimal,
    question_id: i64,
) -> Decimal {
    if let Some(points) = stored {
        return points;
    }
    if let Some(points) = configured {
        return points;
    }
    warn!(
        "No point value configured for question {}, falling back to {}",
        question_id, fallback
    );
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_order() {
        let fallback = Decimal::ONE;
        assert_eq!(
            resolve_max_points(Some(Decimal::from(4)), Some(Decimal::from(9)), fallback, 1),
            Decimal::from(4)
        );
        assert_eq!(
            resolve_max_points(None, Some(Decimal::from(9)), fallback, 1),
            Decimal::from(9)
        );
        assert_eq!(resolve_max_points(None, None, fallback, 1), Decimal::ONE);
    }
}
