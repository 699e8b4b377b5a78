// ==========================================
// 奶牛繁育管理系统 - 引擎层错误类型
// ==========================================
// 错误分级（与错误处理策略对齐）:
// - NotFound: 引用的动物/配种记录/妊娠记录不存在或不属于期望牧场 → 立即中止
// - PrimaryWriteFailed: 权威写入失败 → 中止并上抛
// - Repository/Config: 底层错误透传
// （镜像写入失败不产生错误，只记 warn 日志）
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("记录未找到: {entity} (id={id})")]
    NotFound { entity: String, id: String },

    #[error("主记录写入失败: {0}")]
    PrimaryWriteFailed(String),

    #[error("配置读取失败: {0}")]
    Config(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
