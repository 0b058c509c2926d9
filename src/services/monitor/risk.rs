//! 风险等级
//!
//! 规则按 CRITICAL → HIGH → MEDIUM 顺序匹配，第一条命中即为结果。

use crate::config::RiskPolicy;
use crate::models::monitor::{
    requests::{AlertSeverity, RiskSignals},
    responses::{RiskAssessment, RiskLevel},
};

pub fn assess_risk(signals: &RiskSignals, policy: &RiskPolicy) -> RiskAssessment {
    RiskAssessment {
        submission_id: signals.submission_id,
        level: risk_level(signals, policy),
        description: describe(signals, policy),
    }
}

fn risk_level(signals: &RiskSignals, policy: &RiskPolicy) -> RiskLevel {
    let has = |severity: AlertSeverity| signals.alert_severities.contains(&severity);

    if has(AlertSeverity::Critical) || signals.window_switches > policy.critical_window_switches {
        RiskLevel::Critical
    } else if has(AlertSeverity::High) || signals.unreviewed_alerts > policy.high_unreviewed_alerts
    {
        RiskLevel::High
    } else if has(AlertSeverity::Medium) || signals.window_switches > policy.medium_window_switches
    {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn describe(signals: &RiskSignals, policy: &RiskPolicy) -> String {
    let mut parts = Vec::new();
    if signals.window_switches > policy.notable_window_switches {
        parts.push(format!(
            "Detected {} window switches.",
            signals.window_switches
        ));
    }
    if signals.unreviewed_alerts > 0 {
        parts.push(format!(
            "{} alert(s) have not been reviewed.",
            signals.unreviewed_alerts
        ));
    }
    if parts.is_empty() {
        "No suspicious behavior detected.".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(window_switches: u32, unreviewed: u32, severities: Vec<AlertSeverity>) -> RiskSignals {
        RiskSignals {
            submission_id: Some(1),
            window_switches,
            unreviewed_alerts: unreviewed,
            alert_severities: severities,
        }
    }

    #[test]
    fn test_levels_first_match_wins() {
        let policy = RiskPolicy::default();
        assert_eq!(
            assess_risk(&signals(0, 0, vec![AlertSeverity::Critical]), &policy).level,
            RiskLevel::Critical
        );
        assert_eq!(
            assess_risk(&signals(21, 0, vec![]), &policy).level,
            RiskLevel::Critical
        );
        assert_eq!(
            assess_risk(&signals(20, 6, vec![]), &policy).level,
            RiskLevel::High
        );
        assert_eq!(
            assess_risk(&signals(6, 5, vec![AlertSeverity::Low]), &policy).level,
            RiskLevel::Medium
        );
        assert_eq!(
            assess_risk(&signals(5, 5, vec![AlertSeverity::Low]), &policy).level,
            RiskLevel::Low
        );
    }

    #[test]
    fn test_description_lists_signals() {
        let policy = RiskPolicy::default();
        let quiet = assess_risk(&signals(3, 0, vec![]), &policy);
        assert_eq!(quiet.description, "No suspicious behavior detected.");

        let noisy = assess_risk(&signals(12, 2, vec![]), &policy);
        assert!(noisy.description.contains("12 window switches"));
        assert!(noisy.description.contains("2 alert(s)"));
        assert_eq!(noisy.level, RiskLevel::Medium);
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let policy = RiskPolicy {
            critical_window_switches: 3,
            ..RiskPolicy::default()
        };
        assert_eq!(
            assess_risk(&signals(4, 0, vec![]), &policy).level,
            RiskLevel::Critical
        );
    }
}
