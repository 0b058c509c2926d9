pub mod actors;
pub mod answers;
pub mod common;
pub mod exams;
pub mod grading;
pub mod monitor;
pub mod submissions;

pub use common::{ApiResponse, ErrorCode, PaginatedResponse, PaginationInfo};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
