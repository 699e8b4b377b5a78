// ==========================================
// PregnancyRecordRepository - 妊娠跟踪记录仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 状态列取值: SUSPECTED / CONFIRMED / FALSE / ABORTED / COMPLETED
// ==========================================

use crate::domain::breeding::PregnancyRecord;
use crate::domain::types::PregnancyStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_date, fmt_datetime, parse_date_opt, parse_datetime};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

pub struct PregnancyRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PregnancyRecordRepository {
    /// 创建新的妊娠记录仓储
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

    fn status_to_str(status: &PregnancyStatus) -> &'static str {
        match status {
            PregnancyStatus::Suspected => "SUSPECTED",
            PregnancyStatus::Confirmed => "CONFIRMED",
            PregnancyStatus::NotPregnant => "FALSE",
            PregnancyStatus::Aborted => "ABORTED",
            PregnancyStatus::Completed => "COMPLETED",
        }
    }

    fn str_to_status(s: &str) -> RepositoryResult<PregnancyStatus> {
        match s {
            "SUSPECTED" => Ok(PregnancyStatus::Suspected),
            "CONFIRMED" => Ok(PregnancyStatus::Confirmed),
            "FALSE" => Ok(PregnancyStatus::NotPregnant),
            "ABORTED" => Ok(PregnancyStatus::Aborted),
            "COMPLETED" => Ok(PregnancyStatus::Completed),
            other => Err(RepositoryError::FieldValueError {
                field: "status".to_string(),
                message: format!("未知妊娠状态: {}", other),
            }),
        }
    }

    // ==========================================
    // 行映射
    // ==========================================

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RawPregnancyRow> {
        Ok(RawPregnancyRow {
            pregnancy_id: row.get(0)?,
            breeding_record_id: row.get(1)?,
            animal_id: row.get(2)?,
            farm_id: row.get(3)?,
            status: row.get(4)?,
            expected_calving_date: row.get(5)?,
            actual_calving_date: row.get(6)?,
            gestation_length_days: row.get(7)?,
            confirmed_date: row.get(8)?,
            exam_method: row.get(9)?,
            examiner: row.get(10)?,
            created_by: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }

    fn into_record(raw: RawPregnancyRow) -> RepositoryResult<PregnancyRecord> {
        Ok(PregnancyRecord {
            pregnancy_id: raw.pregnancy_id,
            breeding_record_id: raw.breeding_record_id,
            animal_id: raw.animal_id,
            farm_id: raw.farm_id,
            status: Self::str_to_status(&raw.status)?,
            expected_calving_date: parse_date_opt(raw.expected_calving_date)?,
            actual_calving_date: parse_date_opt(raw.actual_calving_date)?,
            gestation_length_days: raw.gestation_length_days,
            confirmed_date: parse_date_opt(raw.confirmed_date)?,
            exam_method: raw.exam_method,
            examiner: raw.examiner,
            created_by: raw.created_by,
            created_at: parse_datetime(&raw.created_at)?,
            updated_at: parse_datetime(&raw.updated_at)?,
        })
    }

    const SELECT_COLUMNS: &'static str = r#"
        pregnancy_id, breeding_record_id, animal_id, farm_id, status,
        expected_calving_date, actual_calving_date, gestation_length_days,
        confirmed_date, exam_method, examiner, created_by, created_at, updated_at
    "#;

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入妊娠跟踪记录
    pub fn insert(&self, record: &PregnancyRecord) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO pregnancy_record (
                pregnancy_id, breeding_record_id, animal_id, farm_id, status,
                expected_calving_date, actual_calving_date, gestation_length_days,
                confirmed_date, exam_method, examiner, created_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                record.pregnancy_id,
                record.breeding_record_id,
                record.animal_id,
                record.farm_id,
                Self::status_to_str(&record.status),
                record.expected_calving_date.map(fmt_date),
                record.actual_calving_date.map(fmt_date),
                record.gestation_length_days,
                record.confirmed_date.map(fmt_date),
                record.exam_method,
                record.examiner,
                record.created_by,
                fmt_datetime(record.created_at),
                fmt_datetime(record.updated_at),
            ],
        )?;

        Ok(record.pregnancy_id.clone())
    }

    /// 妊检确认: 状态置为 CONFIRMED 并写入确认信息
    ///
    /// # 返回
    /// - Ok(rows): 受影响行数（0 = 记录不存在）
    pub fn confirm(
        &self,
        pregnancy_id: &str,
        confirmed_date: NaiveDate,
        exam_method: Option<&str>,
        examiner: Option<&str>,
        expected_calving_date: Option<NaiveDate>,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE pregnancy_record
            SET status = 'CONFIRMED',
                confirmed_date = ?2,
                exam_method = ?3,
                examiner = ?4,
                expected_calving_date = COALESCE(?5, expected_calving_date),
                updated_at = ?6
            WHERE pregnancy_id = ?1
            "#,
            params![
                pregnancy_id,
                fmt_date(confirmed_date),
                exam_method,
                examiner,
                expected_calving_date.map(fmt_date),
                fmt_datetime(Utc::now()),
            ],
        )?;
        Ok(rows)
    }

    /// 妊检阴性: 状态置为 FALSE（条件更新，仅非终态记录生效）
    pub fn mark_false(&self, pregnancy_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE pregnancy_record
            SET status = 'FALSE',
                updated_at = ?2
            WHERE pregnancy_id = ?1
              AND status IN ('SUSPECTED', 'CONFIRMED')
            "#,
            params![pregnancy_id, fmt_datetime(Utc::now())],
        )?;
        Ok(rows)
    }

    /// 产犊完成: 状态置为 COMPLETED 并写入实际产犊信息（条件更新，仅非终态记录生效）
    ///
    /// # 返回
    /// - Ok(rows): 受影响行数（0 = 记录不存在或已收口，重放守卫）
    pub fn complete(
        &self,
        pregnancy_id: &str,
        actual_calving_date: NaiveDate,
        gestation_length_days: Option<i32>,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE pregnancy_record
            SET status = 'COMPLETED',
                actual_calving_date = ?2,
                gestation_length_days = ?3,
                updated_at = ?4
            WHERE pregnancy_id = ?1
              AND status IN ('SUSPECTED', 'CONFIRMED')
            "#,
            params![
                pregnancy_id,
                fmt_date(actual_calving_date),
                gestation_length_days,
                fmt_datetime(Utc::now()),
            ],
        )?;
        Ok(rows)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按配种记录查询妊娠记录（一一对应）
    pub fn find_by_breeding_record(
        &self,
        breeding_record_id: &str,
    ) -> RepositoryResult<Option<PregnancyRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM pregnancy_record WHERE breeding_record_id = ?1",
            Self::SELECT_COLUMNS
        );
        let raw = conn
            .query_row(&sql, params![breeding_record_id], Self::map_row)
            .optional()?;

        raw.map(Self::into_record).transpose()
    }

    /// 查询动物当前打开（非终态）的妊娠记录
    ///
    /// 说明: 不变式要求同一动物最多一条，但写入时不做原子强制，
    /// 因此返回 Vec 供调用方检测/告警
    pub fn find_open_by_animal(&self, animal_id: &str) -> RepositoryResult<Vec<PregnancyRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM pregnancy_record
            WHERE animal_id = ?1 AND status IN ('SUSPECTED', 'CONFIRMED')
            ORDER BY created_at DESC
            "#,
            Self::SELECT_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![animal_id], Self::map_row)?;

        let mut records = Vec::new();
        for raw in rows {
            records.push(Self::into_record(raw?)?);
        }
        Ok(records)
    }
}

// 行读出中间结构
struct RawPregnancyRow {
    pregnancy_id: String,
    breeding_record_id: String,
    animal_id: String,
    farm_id: String,
    status: String,
    expected_calving_date: Option<String>,
    actual_calving_date: Option<String>,
    gestation_length_days: Option<i32>,
    confirmed_date: Option<String>,
    exam_method: Option<String>,
    examiner: Option<String>,
    created_by: Option<String>,
    created_at: String,
    updated_at: String,
}
