//! 对外错误码定义
//!
//! 路径枚举引擎向查询层暴露的错误码，格式为 XXYY：
//! - XX: 错误类别 (00=成功, 02=执行, 03=验证, 05=资源, 09=系统)
//! - YY: 具体错误

use serde::{Deserialize, Serialize};

/// 对外错误码 - 由查询层透传给客户端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    Success = 0,

    /// 通用执行错误
    ExecutionError = 200,
    /// 内存配额耗尽
    ResourceExhausted = 202,

    /// 通用验证错误
    ValidationError = 300,
    /// 无效输入（如结构损坏的边文档）
    InvalidInput = 302,

    /// 数据源不可用（获取失败）
    ResourceUnavailable = 502,

    /// 内部错误
    InternalError = 900,
    Unknown = 999,
}

impl ErrorCode {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(ErrorCode::Success),
            200 => Some(ErrorCode::ExecutionError),
            202 => Some(ErrorCode::ResourceExhausted),
            300 => Some(ErrorCode::ValidationError),
            302 => Some(ErrorCode::InvalidInput),
            502 => Some(ErrorCode::ResourceUnavailable),
            900 => Some(ErrorCode::InternalError),
            999 => Some(ErrorCode::Unknown),
            _ => None,
        }
    }

    /// 获取默认的错误消息
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "成功",
            ErrorCode::ExecutionError => "执行错误",
            ErrorCode::ResourceExhausted => "资源不足",
            ErrorCode::ValidationError => "验证错误",
            ErrorCode::InvalidInput => "无效输入",
            ErrorCode::ResourceUnavailable => "资源不可用",
            ErrorCode::InternalError => "内部服务器错误",
            ErrorCode::Unknown => "未知错误",
        }
    }

    /// 获取失败后是否值得由调用方重试
    ///
    /// 获取失败的松散端仍保持未获取状态，再次调用即可重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::ResourceUnavailable)
    }
}

impl Default for ErrorCode {
    fn default() -> Self {
        ErrorCode::Success
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.as_i32(), self.default_message())
    }
}

/// 对外错误信息 - 用于序列化到响应中
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicError {
    pub code: ErrorCode,
    pub message: String,
}

impl PublicError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn with_default_message(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
        }
    }
}

/// 内部错误到对外错误的转换 trait
pub trait ToPublicError {
    fn to_public_error(&self) -> PublicError;

    fn to_error_code(&self) -> ErrorCode;

    /// 获取对外错误消息（过滤内部细节）
    fn to_public_message(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_round_trip_values() {
        assert_eq!(ErrorCode::ResourceExhausted.as_i32(), 202);
        assert_eq!(ErrorCode::from_i32(502), Some(ErrorCode::ResourceUnavailable));
        assert_eq!(ErrorCode::from_i32(12345), None);
    }

    #[test]
    fn test_error_code_is_retryable() {
        assert!(ErrorCode::ResourceUnavailable.is_retryable());
        assert!(!ErrorCode::ResourceExhausted.is_retryable());
        assert!(!ErrorCode::InternalError.is_retryable());
    }

    #[test]
    fn test_public_error_default_message() {
        let err = PublicError::with_default_message(ErrorCode::InvalidInput);
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(err.message, "无效输入");
    }
}
