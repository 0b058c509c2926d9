use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::ExamError;
use crate::models::ErrorCode;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error(code: ErrorCode, data: T, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// 核心错误对应的 HTTP 状态码
pub fn status_for(err: &ExamError) -> StatusCode {
    match err {
        ExamError::Validation(_) => StatusCode::BAD_REQUEST,
        ExamError::NotFound(_) => StatusCode::NOT_FOUND,
        ExamError::Forbidden(_) => StatusCode::FORBIDDEN,
        ExamError::InvalidState(_) => StatusCode::CONFLICT,
        ExamError::Expired(_) => StatusCode::GONE,
        ExamError::Authentication(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 将核心错误转换为统一响应
pub fn error_response(err: &ExamError) -> HttpResponse {
    let status = status_for(err);
    if err.is_client_error() {
        info!("Request rejected ({}): {}", err.code(), err.message());
    } else {
        error!("Request failed ({}): {}", err.code(), err.message());
    }
    HttpResponse::build(status).json(ApiResponse::<()>::error_empty(
        ErrorCode::from_error(err),
        err.message(),
    ))
}

/// 将服务结果转换为统一响应
pub fn respond<T: Serialize>(
    result: crate::errors::Result<T>,
    message: impl Into<String>,
) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(ApiResponse::success(data, message)),
        Err(err) => error_response(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ExamError::invalid_state("x")),
            StatusCode::CONFLICT
        );
        assert_eq!(status_for(&ExamError::expired("x")), StatusCode::GONE);
        assert_eq!(
            status_for(&ExamError::database_operation("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_envelope_keeps_kind_and_message_apart() {
        let err = ExamError::forbidden("This submission does not belong to you");
        let body = ApiResponse::<()>::error_empty(ErrorCode::from_error(&err), err.message());
        assert_eq!(body.code, ErrorCode::Forbidden as i32);
        assert_eq!(body.message, "This submission does not belong to you");
        assert!(body.data.is_none());
    }
}
