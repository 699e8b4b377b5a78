// ==========================================
// 奶牛繁育管理系统 - API 层错误类型
// ==========================================
// 职责: 将仓储/引擎错误归一化为对外错误
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("记录未找到: {entity} (id={id})")]
    NotFound { entity: String, id: String },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("数据库操作失败: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 仓储错误归一化
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ApiError::NotFound { entity, id },
            RepositoryError::DatabaseConnectionError(msg) => {
                ApiError::DatabaseConnectionError(msg)
            }
            RepositoryError::LockError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::ValidationError(format!("field={}: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(e) => ApiError::Other(e),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

// 引擎错误归一化
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound { entity, id } => ApiError::NotFound { entity, id },
            EngineError::PrimaryWriteFailed(msg) => ApiError::DatabaseError(msg),
            EngineError::Config(msg) => ApiError::ConfigError(msg),
            EngineError::Repository(e) => e.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
