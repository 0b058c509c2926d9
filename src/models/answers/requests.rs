use serde::Deserialize;
use serde_json::Value;

/// 保存作答请求
#[derive(Debug, Clone, Deserialize)]
pub struct SaveAnswerRequest {
    pub question_id: i64,
    /// 结构化作答：单选为选项键，多选为选项键数组，判断为布尔值
    pub answer: Option<Value>,
    pub answer_text: Option<String>,
    pub uploaded_file_url: Option<String>,
    pub uploaded_file_name: Option<String>,
    #[serde(default)]
    pub is_auto_save: bool,
}
