use serde::{Deserialize, Serialize};

use super::entities::ExamStatus;

/// 资格检查结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub eligible: bool,
    pub reason: Option<String>,
    pub exam_status: ExamStatus,
    pub attempts_made: i32,
    /// 不限次数时为 None
    pub remaining_attempts: Option<i32>,
    /// 存在进行中/暂停的答卷时返回其 ID，便于客户端续考
    pub active_submission_id: Option<i64>,
}
