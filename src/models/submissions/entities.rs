use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 答卷状态
///
/// `IN_PROGRESS ⇄ PAUSED → SUBMITTED → GRADED`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    InProgress,
    Paused,
    Submitted,
    Graded,
}

impl SubmissionStatus {
    /// 进行中或暂停，占用 (学生, 考试) 的唯一活动名额
    pub fn is_active(&self) -> bool {
        matches!(self, SubmissionStatus::InProgress | SubmissionStatus::Paused)
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmissionStatus::Submitted | SubmissionStatus::Graded)
    }

    /// 阅卷队列可见的状态
    pub fn grading_visible() -> &'static [SubmissionStatus] {
        &[SubmissionStatus::Submitted, SubmissionStatus::Graded]
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionStatus::InProgress => "IN_PROGRESS",
            SubmissionStatus::Paused => "PAUSED",
            SubmissionStatus::Submitted => "SUBMITTED",
            SubmissionStatus::Graded => "GRADED",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IN_PROGRESS" => Ok(SubmissionStatus::InProgress),
            "PAUSED" => Ok(SubmissionStatus::Paused),
            "SUBMITTED" => Ok(SubmissionStatus::Submitted),
            "GRADED" => Ok(SubmissionStatus::Graded),
            other => Err(format!("Unknown submission status: {other}")),
        }
    }
}

/// 一次考试作答（答卷）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub exam_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    pub status: SubmissionStatus,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub auto_save_count: i32,
    pub question_seed: Option<i64>,
    pub option_seed: Option<i64>,
    pub total_score: Decimal,
    pub max_score: Decimal,
    pub passed: bool,
    pub time_spent_seconds: Option<i64>,
    /// 教师恢复考试时追加的分钟数
    pub extra_minutes: i32,
    /// 是否因超时被系统强制提交
    pub auto_submitted: bool,
}

impl Submission {
    /// 最晚提交时间 = 开始时间 + 考试时长 + 追加时长
    pub fn deadline(&self, duration_minutes: i32) -> DateTime<Utc> {
        self.started_at + Duration::minutes(i64::from(duration_minutes + self.extra_minutes))
    }

    pub fn is_expired(&self, duration_minutes: i32, now: DateTime<Utc>) -> bool {
        now > self.deadline(duration_minutes)
    }

    /// 剩余秒数，不小于 0
    pub fn remaining_seconds(&self, duration_minutes: i32, now: DateTime<Utc>) -> i64 {
        (self.deadline(duration_minutes) - now).num_seconds().max(0)
    }

    /// 最近一次活动时间（最后保存，否则开始时间）
    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_saved_at.unwrap_or(self.started_at)
    }
}

/// 新建答卷所需字段
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub exam_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    pub started_at: DateTime<Utc>,
    pub question_seed: Option<i64>,
    pub option_seed: Option<i64>,
    pub max_score: Decimal,
}
