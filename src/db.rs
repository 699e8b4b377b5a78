// ==========================================
// 奶牛繁育管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供统一建表入口（引擎涉及的五张表 + schema_version）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// 说明：
/// - 版本号用于**提示/告警**（不做自动迁移），避免静默在旧库上运行导致隐性错误。
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化引擎涉及的全部表结构（幂等）
///
/// 表清单:
/// - animal: 动物聚合（本引擎只写繁育相关字段 + 产犊建档）
/// - breeding_record: 配种记录（权威事实，创建后本引擎不再修改）
/// - breeding_event: 繁育时间线（追加式，不可变）
/// - pregnancy_record: 妊娠跟踪记录
/// - farm_breeding_settings: 牧场繁育参数
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS farm_breeding_settings (
            farm_id TEXT PRIMARY KEY,
            default_gestation_days INTEGER NOT NULL DEFAULT 280,
            days_pregnant_at_dryoff INTEGER NOT NULL DEFAULT 220,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS animal (
            animal_id TEXT PRIMARY KEY,
            farm_id TEXT NOT NULL,
            tag_number TEXT,
            name TEXT,
            gender TEXT NOT NULL DEFAULT 'FEMALE',
            birth_date TEXT,
            birth_weight_kg REAL,
            production_status TEXT NOT NULL,
            service_date TEXT,
            expected_calving_date TEXT,
            days_in_milk INTEGER,
            lactation_number INTEGER NOT NULL DEFAULT 0,
            current_daily_production_l REAL,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            source TEXT,
            dam_id TEXT,
            notes TEXT,
            created_by TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS breeding_record (
            record_id TEXT PRIMARY KEY,
            animal_id TEXT NOT NULL,
            farm_id TEXT NOT NULL,
            method TEXT NOT NULL,
            breeding_date TEXT NOT NULL,
            sire_code TEXT,
            technician TEXT,
            cost REAL,
            notes TEXT,
            pregnancy_status TEXT NOT NULL DEFAULT 'PENDING',
            auto_generated INTEGER NOT NULL DEFAULT 0,
            created_by TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS breeding_event (
            event_id TEXT PRIMARY KEY,
            animal_id TEXT NOT NULL,
            farm_id TEXT NOT NULL,
            event_type TEXT NOT NULL,
            event_date TEXT NOT NULL,
            details_json TEXT,
            notes TEXT,
            created_by TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS pregnancy_record (
            pregnancy_id TEXT PRIMARY KEY,
            breeding_record_id TEXT NOT NULL,
            animal_id TEXT NOT NULL,
            farm_id TEXT NOT NULL,
            status TEXT NOT NULL,
            expected_calving_date TEXT,
            actual_calving_date TEXT,
            gestation_length_days INTEGER,
            confirmed_date TEXT,
            exam_method TEXT,
            examiner TEXT,
            created_by TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_animal_farm
            ON animal(farm_id);
        CREATE INDEX IF NOT EXISTS idx_breeding_record_animal_date
            ON breeding_record(animal_id, breeding_date);
        CREATE INDEX IF NOT EXISTS idx_breeding_event_animal_type
            ON breeding_event(animal_id, event_type, event_date);
        CREATE INDEX IF NOT EXISTS idx_breeding_event_farm_type
            ON breeding_event(farm_id, event_type);
        CREATE INDEX IF NOT EXISTS idx_pregnancy_record_breeding
            ON pregnancy_record(breeding_record_id);
        CREATE INDEX IF NOT EXISTS idx_pregnancy_record_animal_status
            ON pregnancy_record(animal_id, status);

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        "#,
    )?;
    Ok(())
}
