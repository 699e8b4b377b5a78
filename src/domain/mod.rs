// ==========================================
// 奶牛繁育管理系统 - 领域层
// ==========================================
// 职责: 定义实体与类型，不包含数据访问与业务流程
// ==========================================

pub mod animal;
pub mod breeding;
pub mod types;

// 重导出领域实体
pub use animal::Animal;
pub use breeding::{BreedingEvent, BreedingRecord, EventDetails, PregnancyRecord};
