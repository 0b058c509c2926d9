use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::submissions::entities::SubmissionStatus;

/// 阅卷列表查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradingListQuery {
    /// 仅允许 SUBMITTED / GRADED，缺省时两者都返回
    pub status: Option<SubmissionStatus>,
    pub exam_id: Option<i64>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// 教师给分请求
#[derive(Debug, Clone, Deserialize)]
pub struct GradeAnswerRequest {
    pub score: Option<Decimal>,
    pub feedback: Option<String>,
}
