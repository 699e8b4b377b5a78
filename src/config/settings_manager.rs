// ==========================================
// 奶牛繁育管理系统 - 牧场繁育参数管理器
// ==========================================
// 职责: 牧场繁育参数的加载与默认值代入
// 存储: farm_breeding_settings 表（每牧场一行）
// 红线: 缺失配置不是错误，代入文档化默认值
// ==========================================

use crate::config::breeding_config_trait::BreedingConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 默认妊娠期（天）
pub const DEFAULT_GESTATION_DAYS: i32 = 280;

/// 默认干奶阈值（怀孕天数）
pub const DEFAULT_DRYOFF_THRESHOLD_DAYS: i32 = 220;

// ==========================================
// FarmBreedingSettings - 牧场繁育参数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmBreedingSettings {
    pub farm_id: String,
    pub default_gestation_days: i32,   // 妊娠期（天）
    pub days_pregnant_at_dryoff: i32,  // 干奶阈值（怀孕天数）
}

impl FarmBreedingSettings {
    /// 牧场未配置时的默认参数
    pub fn defaults(farm_id: &str) -> Self {
        Self {
            farm_id: farm_id.to_string(),
            default_gestation_days: DEFAULT_GESTATION_DAYS,
            days_pregnant_at_dryoff: DEFAULT_DRYOFF_THRESHOLD_DAYS,
        }
    }
}

// ==========================================
// SettingsManager - 参数管理器
// ==========================================
pub struct SettingsManager {
    conn: Arc<Mutex<Connection>>,
}

impl SettingsManager {
    /// 创建新的 SettingsManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 SettingsManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }
        Ok(Self { conn })
    }

    /// 读取牧场繁育参数（缺行时返回默认值，不视为错误）
    ///
    /// # 参数
    /// - farm_id: 牧场标识
    ///
    /// # 返回
    /// - FarmBreedingSettings: 配置行存在返回库中值，否则返回默认值
    pub fn get_settings(&self, farm_id: &str) -> Result<FarmBreedingSettings, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let row = conn
            .query_row(
                r#"
                SELECT default_gestation_days, days_pregnant_at_dryoff
                FROM farm_breeding_settings
                WHERE farm_id = ?1
                "#,
                params![farm_id],
                |row| {
                    Ok((
                        row.get::<_, i32>(0)?,
                        row.get::<_, i32>(1)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((gestation, dryoff)) => Ok(FarmBreedingSettings {
                farm_id: farm_id.to_string(),
                default_gestation_days: gestation,
                days_pregnant_at_dryoff: dryoff,
            }),
            None => {
                tracing::debug!(farm_id = %farm_id, "牧场繁育参数未配置，使用默认值");
                Ok(FarmBreedingSettings::defaults(farm_id))
            }
        }
    }

    /// 写入/覆盖牧场繁育参数（供管理界面与测试使用）
    pub fn upsert_settings(&self, settings: &FarmBreedingSettings) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO farm_breeding_settings (farm_id, default_gestation_days, days_pregnant_at_dryoff, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(farm_id) DO UPDATE SET
                default_gestation_days = excluded.default_gestation_days,
                days_pregnant_at_dryoff = excluded.days_pregnant_at_dryoff,
                updated_at = excluded.updated_at
            "#,
            params![
                settings.farm_id,
                settings.default_gestation_days,
                settings.days_pregnant_at_dryoff,
            ],
        )?;
        Ok(())
    }
}

// ==========================================
// BreedingConfigReader 实现
// ==========================================
#[async_trait]
impl BreedingConfigReader for SettingsManager {
    async fn get_gestation_days(&self, farm_id: &str) -> Result<i32, Box<dyn Error>> {
        Ok(self.get_settings(farm_id)?.default_gestation_days)
    }

    async fn get_dryoff_threshold_days(&self, farm_id: &str) -> Result<i32, Box<dyn Error>> {
        Ok(self.get_settings(farm_id)?.days_pregnant_at_dryoff)
    }
}
