// ==========================================
// 奶牛繁育管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 繁育生命周期同步引擎
// 职责: 保持动物生产状态、繁育时间线、妊娠跟踪记录三者一致
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 状态机与业务规则
pub mod engine;

// 配置层 - 牧场繁育参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AnimalGender, AnimalStatus, BreedingEventType, BreedingMethod, CalvingOutcome,
    PregnancyCheckResult, PregnancyStatus, ProductionStatus, RecordPregnancyStatus,
};

// 领域实体
pub use domain::{Animal, BreedingEvent, BreedingRecord, EventDetails, PregnancyRecord};

// 引擎
pub use engine::{
    BreedingRecordOrchestrator, CalvingHandler, InseminationHandler, PregnancyCheckHandler,
    ReconciliationJob, ReconciliationReport,
};

// 配置
pub use config::{BreedingConfigReader, FarmBreedingSettings, SettingsManager};

// API
pub use api::BreedingApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "奶牛繁育管理系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";
