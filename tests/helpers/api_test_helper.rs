// ==========================================
// API 集成测试辅助工具
// ==========================================
// 职责: 提供 API 层集成测试的通用环境装配
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tempfile::NamedTempFile;

use dairy_breeding::api::BreedingApi;
use dairy_breeding::repository::animal_repo::AnimalRepository;
use dairy_breeding::repository::breeding_event_repo::BreedingEventRepository;
use dairy_breeding::repository::breeding_record_repo::BreedingRecordRepository;
use dairy_breeding::repository::pregnancy_repo::PregnancyRecordRepository;

use super::mock_config::MockBreedingConfig;

// ==========================================
// API 测试环境
// ==========================================

/// API 测试环境
///
/// 包含 API 实例与用于测试数据准备/断言的仓储
pub struct ApiTestEnv {
    pub db_path: String,
    pub api: BreedingApi<MockBreedingConfig>,

    // Repository 层（测试数据准备与结果断言）
    pub animal_repo: Arc<AnimalRepository>,
    pub record_repo: Arc<BreedingRecordRepository>,
    pub event_repo: Arc<BreedingEventRepository>,
    pub pregnancy_repo: Arc<PregnancyRecordRepository>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建新的 API 测试环境（默认 Mock 配置: 妊娠期 280 / 干奶阈值 220）
    pub fn new() -> Result<Self, String> {
        Self::with_config(MockBreedingConfig::default())
    }

    /// 使用指定 Mock 配置创建测试环境
    pub fn with_config(config: MockBreedingConfig) -> Result<Self, String> {
        let (temp_file, db_path) =
            test_helpers::create_test_db().map_err(|e| format!("创建测试数据库失败: {}", e))?;

        let conn = test_helpers::open_test_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;

        let animal_repo = Arc::new(AnimalRepository::from_connection(conn.clone()));
        let record_repo = Arc::new(BreedingRecordRepository::from_connection(conn.clone()));
        let event_repo = Arc::new(BreedingEventRepository::from_connection(conn.clone()));
        let pregnancy_repo = Arc::new(PregnancyRecordRepository::from_connection(conn.clone()));

        let api = BreedingApi::from_connection(conn, Arc::new(config));

        Ok(Self {
            db_path,
            api,
            animal_repo,
            record_repo,
            event_repo,
            pregnancy_repo,
            _temp_file: temp_file,
        })
    }

    /// 通过独立连接执行原始 SQL（制造故障场景，如 DROP TABLE）
    pub fn exec_sql(&self, sql: &str) -> Result<(), String> {
        let conn = Connection::open(&self.db_path).map_err(|e| e.to_string())?;
        conn.execute_batch(sql).map_err(|e| e.to_string())
    }

    /// 获取一条独立裸连接（直接断言表内容用）
    pub fn raw_connection(&self) -> Result<Arc<Mutex<Connection>>, String> {
        test_helpers::open_test_connection(&self.db_path).map_err(|e| e.to_string())
    }
}
