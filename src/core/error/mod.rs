//! 路径枚举引擎的错误处理
//!
//! 只有资源与 I/O 类失败会作为错误传播；校验器的过滤/剪枝结果属于正常控制流，
//! 不在此处建模。前置条件违例（越界访问、展开未获取的步骤）属于编程错误，直接断言失败。

use thiserror::Error;

pub mod codes;

pub use codes::{ErrorCode, PublicError, ToPublicError};

/// 路径枚举错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraversalError {
    /// 追加步骤超出内存配额，当前查询必须中止
    #[error("内存配额耗尽: {0}")]
    ResourceExhausted(String),

    /// Provider 获取数据失败，松散端保持未获取状态，可重试
    #[error("数据获取失败: {0}")]
    FetchFailed(String),

    /// 边文档结构损坏，仅影响对应的展开分支
    #[error("无效边: {0}")]
    InvalidEdge(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一的结果类型
pub type TraversalResult<T> = Result<T, TraversalError>;

impl ToPublicError for TraversalError {
    fn to_public_error(&self) -> PublicError {
        PublicError::new(self.to_error_code(), self.to_public_message())
    }

    fn to_error_code(&self) -> ErrorCode {
        match self {
            TraversalError::ResourceExhausted(_) => ErrorCode::ResourceExhausted,
            TraversalError::FetchFailed(_) => ErrorCode::ResourceUnavailable,
            TraversalError::InvalidEdge(_) => ErrorCode::InvalidInput,
            TraversalError::Config(_) => ErrorCode::ValidationError,
            TraversalError::Internal(_) => ErrorCode::InternalError,
        }
    }

    fn to_public_message(&self) -> String {
        match self {
            // 内部错误不暴露细节
            TraversalError::Internal(_) => ErrorCode::InternalError.default_message().to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<serde_json::Error> for TraversalError {
    fn from(err: serde_json::Error) -> Self {
        TraversalError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for TraversalError {
    fn from(err: toml::de::Error) -> Self {
        TraversalError::Config(err.to_string())
    }
}
