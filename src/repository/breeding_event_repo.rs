// ==========================================
// BreedingEventRepository - 繁育时间线仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 红线: 时间线为追加式，事件写入后不可变（无 UPDATE/DELETE 路径）
// ==========================================

use crate::domain::breeding::{BreedingEvent, EventDetails};
use crate::domain::types::BreedingEventType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_date, fmt_datetime, parse_date, parse_datetime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

pub struct BreedingEventRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BreedingEventRepository {
    /// 创建新的时间线仓储
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

    fn event_type_to_str(event_type: &BreedingEventType) -> &'static str {
        match event_type {
            BreedingEventType::HeatDetection => "HEAT_DETECTION",
            BreedingEventType::Insemination => "INSEMINATION",
            BreedingEventType::PregnancyCheck => "PREGNANCY_CHECK",
            BreedingEventType::Calving => "CALVING",
        }
    }

    fn str_to_event_type(s: &str) -> RepositoryResult<BreedingEventType> {
        match s {
            "HEAT_DETECTION" => Ok(BreedingEventType::HeatDetection),
            "INSEMINATION" => Ok(BreedingEventType::Insemination),
            "PREGNANCY_CHECK" => Ok(BreedingEventType::PregnancyCheck),
            "CALVING" => Ok(BreedingEventType::Calving),
            other => Err(RepositoryError::FieldValueError {
                field: "event_type".to_string(),
                message: format!("未知事件类型: {}", other),
            }),
        }
    }

    // ==========================================
    // 行映射
    // ==========================================

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RawEventRow> {
        Ok(RawEventRow {
            event_id: row.get(0)?,
            animal_id: row.get(1)?,
            farm_id: row.get(2)?,
            event_type: row.get(3)?,
            event_date: row.get(4)?,
            details_json: row.get(5)?,
            notes: row.get(6)?,
            created_by: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn into_event(raw: RawEventRow) -> RepositoryResult<BreedingEvent> {
        let details: Option<EventDetails> = match raw.details_json {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };

        Ok(BreedingEvent {
            event_id: raw.event_id,
            animal_id: raw.animal_id,
            farm_id: raw.farm_id,
            event_type: Self::str_to_event_type(&raw.event_type)?,
            event_date: parse_date(&raw.event_date)?,
            details,
            notes: raw.notes,
            created_by: raw.created_by,
            created_at: parse_datetime(&raw.created_at)?,
        })
    }

    const SELECT_COLUMNS: &'static str = r#"
        event_id, animal_id, farm_id, event_type, event_date,
        details_json, notes, created_by, created_at
    "#;

    // ==========================================
    // 写入操作
    // ==========================================

    /// 追加时间线事件
    ///
    /// # 返回
    /// - Ok(event_id): 成功插入
    pub fn insert(&self, event: &BreedingEvent) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let details_json = event
            .details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            r#"
            INSERT INTO breeding_event (
                event_id, animal_id, farm_id, event_type, event_date,
                details_json, notes, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                event.event_id,
                event.animal_id,
                event.farm_id,
                Self::event_type_to_str(&event.event_type),
                fmt_date(event.event_date),
                details_json,
                event.notes,
                event.created_by,
                fmt_datetime(event.created_at),
            ],
        )?;

        Ok(event.event_id.clone())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询动物最近一次指定类型的事件（按事件日期倒序）
    ///
    /// 用途: 泌乳天数重算时定位最近一次产犊事件
    pub fn find_latest_by_type(
        &self,
        animal_id: &str,
        event_type: BreedingEventType,
    ) -> RepositoryResult<Option<BreedingEvent>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM breeding_event
            WHERE animal_id = ?1 AND event_type = ?2
            ORDER BY event_date DESC, created_at DESC
            LIMIT 1
            "#,
            Self::SELECT_COLUMNS
        );
        let raw = conn
            .query_row(
                &sql,
                params![animal_id, Self::event_type_to_str(&event_type)],
                Self::map_row,
            )
            .optional()?;

        raw.map(Self::into_event).transpose()
    }

    /// 查询牧场内指定类型的全部事件（按事件日期升序）
    ///
    /// 用途: 对账作业扫描缺失配种记录的配种事件
    pub fn list_by_farm_and_type(
        &self,
        farm_id: &str,
        event_type: BreedingEventType,
    ) -> RepositoryResult<Vec<BreedingEvent>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM breeding_event
            WHERE farm_id = ?1 AND event_type = ?2
            ORDER BY event_date ASC, created_at ASC
            "#,
            Self::SELECT_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![farm_id, Self::event_type_to_str(&event_type)],
            Self::map_row,
        )?;

        let mut events = Vec::new();
        for raw in rows {
            events.push(Self::into_event(raw?)?);
        }
        Ok(events)
    }

    /// 查询动物的全部时间线事件（按事件日期升序，繁育史展示用）
    pub fn list_by_animal(&self, animal_id: &str) -> RepositoryResult<Vec<BreedingEvent>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM breeding_event
            WHERE animal_id = ?1
            ORDER BY event_date ASC, created_at ASC
            "#,
            Self::SELECT_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![animal_id], Self::map_row)?;

        let mut events = Vec::new();
        for raw in rows {
            events.push(Self::into_event(raw?)?);
        }
        Ok(events)
    }
}

// 行读出中间结构
struct RawEventRow {
    event_id: String,
    animal_id: String,
    farm_id: String,
    event_type: String,
    event_date: String,
    details_json: Option<String>,
    notes: Option<String>,
    created_by: Option<String>,
    created_at: String,
}
