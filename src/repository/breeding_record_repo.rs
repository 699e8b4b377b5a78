// ==========================================
// BreedingRecordRepository - 配种记录仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 红线: 配种记录创建后不可变（本引擎无 UPDATE 路径）
// ==========================================

use crate::domain::breeding::BreedingRecord;
use crate::domain::types::{BreedingMethod, RecordPregnancyStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_date, fmt_datetime, parse_date, parse_datetime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

pub struct BreedingRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BreedingRecordRepository {
    /// 创建新的配种记录仓储
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 枚举类型转换辅助方法
    // ==========================================

    fn method_to_str(method: &BreedingMethod) -> &'static str {
        match method {
            BreedingMethod::Natural => "NATURAL",
            BreedingMethod::ArtificialInsemination => "ARTIFICIAL_INSEMINATION",
        }
    }

    fn str_to_method(s: &str) -> RepositoryResult<BreedingMethod> {
        match s {
            "NATURAL" => Ok(BreedingMethod::Natural),
            "ARTIFICIAL_INSEMINATION" => Ok(BreedingMethod::ArtificialInsemination),
            other => Err(RepositoryError::FieldValueError {
                field: "method".to_string(),
                message: format!("未知配种方式: {}", other),
            }),
        }
    }

    fn pregnancy_status_to_str(status: &RecordPregnancyStatus) -> &'static str {
        match status {
            RecordPregnancyStatus::Pending => "PENDING",
            RecordPregnancyStatus::Confirmed => "CONFIRMED",
            RecordPregnancyStatus::Failed => "FAILED",
        }
    }

    fn str_to_pregnancy_status(s: &str) -> RecordPregnancyStatus {
        match s {
            "CONFIRMED" => RecordPregnancyStatus::Confirmed,
            "FAILED" => RecordPregnancyStatus::Failed,
            _ => RecordPregnancyStatus::Pending,
        }
    }

    // ==========================================
    // 行映射
    // ==========================================

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RawRecordRow> {
        Ok(RawRecordRow {
            record_id: row.get(0)?,
            animal_id: row.get(1)?,
            farm_id: row.get(2)?,
            method: row.get(3)?,
            breeding_date: row.get(4)?,
            sire_code: row.get(5)?,
            technician: row.get(6)?,
            cost: row.get(7)?,
            notes: row.get(8)?,
            pregnancy_status: row.get(9)?,
            auto_generated: row.get(10)?,
            created_by: row.get(11)?,
            created_at: row.get(12)?,
        })
    }

    fn into_record(raw: RawRecordRow) -> RepositoryResult<BreedingRecord> {
        Ok(BreedingRecord {
            record_id: raw.record_id,
            animal_id: raw.animal_id,
            farm_id: raw.farm_id,
            method: Self::str_to_method(&raw.method)?,
            breeding_date: parse_date(&raw.breeding_date)?,
            sire_code: raw.sire_code,
            technician: raw.technician,
            cost: raw.cost,
            notes: raw.notes,
            pregnancy_status: Self::str_to_pregnancy_status(&raw.pregnancy_status),
            auto_generated: raw.auto_generated,
            created_by: raw.created_by,
            created_at: parse_datetime(&raw.created_at)?,
        })
    }

    const SELECT_COLUMNS: &'static str = r#"
        record_id, animal_id, farm_id, method, breeding_date, sire_code,
        technician, cost, notes, pregnancy_status, auto_generated,
        created_by, created_at
    "#;

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入配种记录
    ///
    /// # 返回
    /// - Ok(record_id): 成功插入
    pub fn insert(&self, record: &BreedingRecord) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO breeding_record (
                record_id, animal_id, farm_id, method, breeding_date, sire_code,
                technician, cost, notes, pregnancy_status, auto_generated,
                created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                record.record_id,
                record.animal_id,
                record.farm_id,
                Self::method_to_str(&record.method),
                fmt_date(record.breeding_date),
                record.sire_code,
                record.technician,
                record.cost,
                record.notes,
                Self::pregnancy_status_to_str(&record.pregnancy_status),
                record.auto_generated,
                record.created_by,
                fmt_datetime(record.created_at),
            ],
        )?;

        Ok(record.record_id.clone())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按主键查询配种记录
    pub fn find_by_id(&self, record_id: &str) -> RepositoryResult<Option<BreedingRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM breeding_record WHERE record_id = ?1",
            Self::SELECT_COLUMNS
        );
        let raw = conn
            .query_row(&sql, params![record_id], Self::map_row)
            .optional()?;

        raw.map(Self::into_record).transpose()
    }

    /// 按主键查询配种记录并校验牧场归属
    pub fn find_in_farm(
        &self,
        record_id: &str,
        farm_id: &str,
    ) -> RepositoryResult<Option<BreedingRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM breeding_record WHERE record_id = ?1 AND farm_id = ?2",
            Self::SELECT_COLUMNS
        );
        let raw = conn
            .query_row(&sql, params![record_id, farm_id], Self::map_row)
            .optional()?;

        raw.map(Self::into_record).transpose()
    }

    /// 判断指定动物在指定日期是否已有配种记录
    ///
    /// 用途: 对账作业的去重守卫（按 动物 + 精确日期 匹配）
    pub fn exists_for_animal_on_date(
        &self,
        animal_id: &str,
        breeding_date: chrono::NaiveDate,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found: Option<i64> = conn
            .query_row(
                r#"
                SELECT 1 FROM breeding_record
                WHERE animal_id = ?1 AND breeding_date = ?2
                LIMIT 1
                "#,
                params![animal_id, fmt_date(breeding_date)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

// 行读出中间结构
struct RawRecordRow {
    record_id: String,
    animal_id: String,
    farm_id: String,
    method: String,
    breeding_date: String,
    sire_code: Option<String>,
    technician: Option<String>,
    cost: Option<f64>,
    notes: Option<String>,
    pregnancy_status: String,
    auto_generated: bool,
    created_by: Option<String>,
    created_at: String,
}
