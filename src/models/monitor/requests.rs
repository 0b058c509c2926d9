use serde::{Deserialize, Serialize};

/// 监考告警严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// 风险评估输入（来自监考端的行为信号汇总）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskSignals {
    pub submission_id: Option<i64>,
    #[serde(default)]
    pub window_switches: u32,
    #[serde(default)]
    pub unreviewed_alerts: u32,
    #[serde(default)]
    pub alert_severities: Vec<AlertSeverity>,
}
