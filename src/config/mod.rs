// ==========================================
// 奶牛繁育管理系统 - 配置层
// ==========================================
// 职责: 牧场繁育参数的读取（本引擎视角只读）
// ==========================================

pub mod breeding_config_trait;
pub mod settings_manager;

pub use breeding_config_trait::BreedingConfigReader;
pub use settings_manager::{
    FarmBreedingSettings, SettingsManager, DEFAULT_DRYOFF_THRESHOLD_DAYS, DEFAULT_GESTATION_DAYS,
};
