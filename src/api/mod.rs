// ==========================================
// 奶牛繁育管理系统 - API 层
// ==========================================
// 职责: 对外业务接口（输入校验、引擎编排、错误归一化）
// 红线: API 层不直接写库，所有写入经由引擎层
// ==========================================

pub mod breeding_api;
pub mod error;

pub use breeding_api::{BreedingApi, LactationSummary};
pub use error::{ApiError, ApiResult};
