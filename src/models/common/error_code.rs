use serde::{Deserialize, Serialize};

use crate::errors::ExamError;

/// API 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1xxx
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    ValidationFailed = 1022,

    // 考试会话 2xxx
    SubmissionInvalidState = 2011,
    SubmissionExpired = 2012,

    InternalServerError = 5000,
    DatabaseError = 5001,
}

impl ErrorCode {
    /// 从核心错误映射到对外错误码
    pub fn from_error(err: &ExamError) -> Self {
        match err {
            ExamError::Validation(_) => ErrorCode::ValidationFailed,
            ExamError::NotFound(_) => ErrorCode::NotFound,
            ExamError::Forbidden(_) => ErrorCode::Forbidden,
            ExamError::InvalidState(_) => ErrorCode::SubmissionInvalidState,
            ExamError::Expired(_) => ErrorCode::SubmissionExpired,
            ExamError::Authentication(_) => ErrorCode::Unauthorized,
            ExamError::DatabaseConfig(_)
            | ExamError::DatabaseConnection(_)
            | ExamError::DatabaseOperation(_) => ErrorCode::DatabaseError,
            ExamError::Serialization(_) => ErrorCode::InternalServerError,
        }
    }
}
