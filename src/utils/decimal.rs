//! 分数计算工具
//!
//! 所有对外的分数与百分比统一保留两位小数，四舍五入（远离零）。

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// 保留两位小数
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// 百分比：先按四位小数求比值，再乘 100 保留两位；满分为 0 时返回 None
pub fn percentage(score: Decimal, max: Decimal) -> Option<Decimal> {
    if max.is_zero() {
        return None;
    }
    let ratio = (score / max).round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    Some(round2(ratio * Decimal::ONE_HUNDRED))
}

/// 数据库双精度 -> Decimal
pub fn from_f64(value: f64) -> Decimal {
    Decimal::from_f64(value).map(round2).unwrap_or_default()
}

/// Decimal -> 数据库双精度
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(
            percentage(Decimal::from(5), Decimal::from(10)),
            Some(Decimal::from_str("50.00").unwrap())
        );
        // 2/3 -> 0.6667 -> 66.67
        assert_eq!(
            percentage(Decimal::from(2), Decimal::from(3)),
            Some(Decimal::from_str("66.67").unwrap())
        );
        assert_eq!(percentage(Decimal::from(5), Decimal::ZERO), None);
    }

    #[test]
    fn test_round2_midpoint_away_from_zero() {
        assert_eq!(
            round2(Decimal::from_str("2.345").unwrap()),
            Decimal::from_str("2.35").unwrap()
        );
        assert_eq!(
            round2(Decimal::from_str("-2.345").unwrap()),
            Decimal::from_str("-2.35").unwrap()
        );
    }

    #[test]
    fn test_f64_conversion() {
        assert_eq!(from_f64(12.5), Decimal::from_str("12.5").unwrap());
        assert_eq!(from_f64(f64::NAN), Decimal::ZERO);
        assert_eq!(to_f64(Decimal::from_str("7.25").unwrap()), 7.25);
    }
}
