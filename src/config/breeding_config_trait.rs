// ==========================================
// 奶牛繁育管理系统 - 繁育配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// BreedingConfigReader Trait
// ==========================================
// 用途: 状态转换处理器 / 编排器 / 干奶判定所需的配置读取接口
// 实现者: SettingsManager（从 farm_breeding_settings 表读取）
#[async_trait]
pub trait BreedingConfigReader: Send + Sync {
    /// 获取牧场妊娠期天数
    ///
    /// # 参数
    /// - farm_id: 牧场标识
    ///
    /// # 默认值
    /// - 280（牧场未配置时代入，不视为错误）
    async fn get_gestation_days(&self, farm_id: &str) -> Result<i32, Box<dyn Error>>;

    /// 获取干奶阈值（怀孕天数）
    ///
    /// # 参数
    /// - farm_id: 牧场标识
    ///
    /// # 默认值
    /// - 220（牧场未配置时代入，不视为错误）
    ///
    /// # 用途
    /// - 干奶判定: days_pregnant >= 阈值 时建议干奶
    async fn get_dryoff_threshold_days(&self, farm_id: &str) -> Result<i32, Box<dyn Error>>;
}
