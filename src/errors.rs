//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_exam_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum ExamError {
            $($variant(String),)*
        }

        impl ExamError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(ExamError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(ExamError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(ExamError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl ExamError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        ExamError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_exam_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    Serialization("E004", "Serialization Error"),
    Validation("E005", "Validation Error"),
    NotFound("E006", "Resource Not Found"),
    Forbidden("E007", "Forbidden"),
    InvalidState("E008", "Invalid State"),
    Expired("E009", "Submission Expired"),
    Authentication("E010", "Authentication Error"),
}

impl ExamError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否属于调用方可处理的业务错误（区别于基础设施故障）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExamError::Validation(_)
                | ExamError::NotFound(_)
                | ExamError::Forbidden(_)
                | ExamError::InvalidState(_)
                | ExamError::Expired(_)
                | ExamError::Authentication(_)
        )
    }
}

impl fmt::Display for ExamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ExamError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ExamError {
    fn from(err: sea_orm::DbErr) -> Self {
        ExamError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ExamError {
    fn from(err: serde_json::Error) -> Self {
        ExamError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ExamError::database_config("test").code(), "E001");
        assert_eq!(ExamError::validation("test").code(), "E005");
        assert_eq!(ExamError::not_found("test").code(), "E006");
        assert_eq!(ExamError::invalid_state("test").code(), "E008");
        assert_eq!(ExamError::expired("test").code(), "E009");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            ExamError::forbidden("test").error_type(),
            "Forbidden"
        );
        assert_eq!(
            ExamError::expired("test").error_type(),
            "Submission Expired"
        );
    }

    #[test]
    fn test_error_message() {
        let err = ExamError::invalid_state("Can only pause IN_PROGRESS exams. Current status: PAUSED");
        assert_eq!(
            err.message(),
            "Can only pause IN_PROGRESS exams. Current status: PAUSED"
        );
    }

    #[test]
    fn test_format_simple() {
        let err = ExamError::validation("Score cannot be negative");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("Score cannot be negative"));
    }

    #[test]
    fn test_client_error_split() {
        assert!(ExamError::expired("x").is_client_error());
        assert!(!ExamError::database_operation("x").is_client_error());
    }

    #[test]
    fn test_from_serde_error() {
        let err: ExamError = serde_json::from_str::<i32>("nope").unwrap_err().into();
        assert_eq!(err.code(), "E004");
    }
}
