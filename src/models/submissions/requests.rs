use serde::Deserialize;

/// 暂停考试请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PauseExamRequest {
    pub reason: Option<String>,
}

/// 恢复考试请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeExamRequest {
    /// 追加的考试时间（分钟），会顺延最晚提交时间
    pub additional_minutes: Option<i32>,
}
