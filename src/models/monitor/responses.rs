use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// 单个进行中答卷的实时状态
#[derive(Debug, Clone, Serialize)]
pub struct LiveSessionView {
    pub submission_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub answered_questions: usize,
    pub total_questions: usize,
    pub progress_percent: Decimal,
    pub elapsed_minutes: i64,
    /// 考试时长加追加时间
    pub effective_duration_minutes: i64,
    pub remaining_minutes: i64,
    pub minutes_since_activity: i64,
    pub inactive: bool,
}

/// 汇总统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveStats {
    pub active_count: usize,
    pub average_progress: Decimal,
    pub average_remaining_minutes: Decimal,
    pub low_progress_count: usize,
    pub inactive_count: usize,
}

/// 告警类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiveAlertKind {
    Inactive,
    TimeRunningOut,
    Struggling,
}

/// 看板告警
#[derive(Debug, Clone, Serialize)]
pub struct LiveAlert {
    pub kind: LiveAlertKind,
    pub message: String,
    pub submission_ids: Vec<i64>,
}

/// 实时监考快照
#[derive(Debug, Clone, Serialize)]
pub struct LiveExamSnapshot {
    pub exam_id: i64,
    pub exam_title: String,
    pub duration_minutes: i32,
    pub generated_at: DateTime<Utc>,
    pub sessions: Vec<LiveSessionView>,
    pub stats: LiveStats,
    pub alerts: Vec<LiveAlert>,
}

/// 进行中答卷列表项
#[derive(Debug, Clone, Serialize)]
pub struct ActiveSessionItem {
    pub submission_id: i64,
    pub exam_id: i64,
    pub exam_title: String,
    pub student_id: i64,
    pub attempt_number: i32,
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub remaining_seconds: i64,
}

/// 风险等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// 风险评估结果
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub submission_id: Option<i64>,
    pub level: RiskLevel,
    pub description: String,
}
