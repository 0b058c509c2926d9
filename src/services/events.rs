//! 考试事件
//!
//! 事件推送是尽力而为的：发布失败只记录日志，不影响主流程。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::Result;
use crate::models::submissions::entities::SubmissionStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExamEvent {
    /// 计时同步（开考、恢复）
    TimerSync {
        exam_id: i64,
        submission_id: i64,
        remaining_seconds: i64,
        must_submit_before: DateTime<Utc>,
    },
    /// 作答进度（每次保存）
    ProgressUpdate {
        exam_id: i64,
        submission_id: i64,
        student_id: i64,
        answered_questions: usize,
        total_questions: usize,
        saved_at: DateTime<Utc>,
    },
    /// 答卷状态变化
    SessionStatus {
        exam_id: i64,
        submission_id: i64,
        student_id: i64,
        status: SubmissionStatus,
        auto_submitted: bool,
        at: DateTime<Utc>,
    },
}

impl ExamEvent {
    pub fn exam_id(&self) -> i64 {
        match self {
            ExamEvent::TimerSync { exam_id, .. }
            | ExamEvent::ProgressUpdate { exam_id, .. }
            | ExamEvent::SessionStatus { exam_id, .. } => *exam_id,
        }
    }

    pub fn submission_id(&self) -> i64 {
        match self {
            ExamEvent::TimerSync { submission_id, .. }
            | ExamEvent::ProgressUpdate { submission_id, .. }
            | ExamEvent::SessionStatus { submission_id, .. } => *submission_id,
        }
    }

    /// 学生端只接收计时与状态事件
    pub fn is_student_visible(&self) -> bool {
        !matches!(self, ExamEvent::ProgressUpdate { .. })
    }
}

pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: ExamEvent) -> Result<()>;
}

/// 丢弃所有事件
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, _event: ExamEvent) -> Result<()> {
        Ok(())
    }
}

/// 发布事件，失败时仅记录告警
pub fn publish_best_effort(publisher: &dyn EventPublisher, event: ExamEvent) {
    let submission_id = event.submission_id();
    if let Err(e) = publisher.publish(event) {
        warn!(
            "Failed to publish exam event for submission {}: {}",
            submission_id, e
        );
    }
}
