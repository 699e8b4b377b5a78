// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use dairy_breeding::config::BreedingConfigReader;
use std::error::Error;

/// Mock 繁育配置
#[derive(Debug, Clone)]
pub struct MockBreedingConfig {
    pub gestation_days: i32,
    pub dryoff_threshold_days: i32,
    pub fail_reads: bool, // true 时模拟配置读取失败
}

impl MockBreedingConfig {
    /// 默认配置（妊娠期 280 天，干奶阈值 220 天）
    pub fn default() -> Self {
        Self {
            gestation_days: 280,
            dryoff_threshold_days: 220,
            fail_reads: false,
        }
    }

    /// 读取总是失败的配置（测试默认值回落）
    pub fn failing() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl BreedingConfigReader for MockBreedingConfig {
    async fn get_gestation_days(&self, _farm_id: &str) -> Result<i32, Box<dyn Error>> {
        if self.fail_reads {
            return Err("模拟配置读取失败".into());
        }
        Ok(self.gestation_days)
    }

    async fn get_dryoff_threshold_days(&self, _farm_id: &str) -> Result<i32, Box<dyn Error>> {
        if self.fail_reads {
            return Err("模拟配置读取失败".into());
        }
        Ok(self.dryoff_threshold_days)
    }
}
