// ==========================================
// AnimalRepository - 动物聚合仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 红线: 状态转换使用条件更新（UPDATE ... WHERE production_status = X），
// 使"读-判-写"收敛为一次原子条件写，避免并发下的重复转换
// 红线: 胎次自增使用库侧原子自增，不做读-改-写
// ==========================================

use crate::domain::animal::Animal;
use crate::domain::types::{AnimalGender, AnimalStatus, ProductionStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_date, fmt_datetime, parse_date_opt, parse_datetime};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

pub struct AnimalRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AnimalRepository {
    /// 创建新的动物仓储
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

    /// ProductionStatus 转字符串
    fn production_status_to_str(status: &ProductionStatus) -> &'static str {
        match status {
            ProductionStatus::Calf => "CALF",
            ProductionStatus::Heifer => "HEIFER",
            ProductionStatus::Served => "SERVED",
            ProductionStatus::Lactating => "LACTATING",
            ProductionStatus::Dry => "DRY",
        }
    }

    /// 字符串转 ProductionStatus
    fn str_to_production_status(s: &str) -> RepositoryResult<ProductionStatus> {
        match s {
            "CALF" => Ok(ProductionStatus::Calf),
            "HEIFER" => Ok(ProductionStatus::Heifer),
            "SERVED" => Ok(ProductionStatus::Served),
            "LACTATING" => Ok(ProductionStatus::Lactating),
            "DRY" => Ok(ProductionStatus::Dry),
            other => Err(RepositoryError::FieldValueError {
                field: "production_status".to_string(),
                message: format!("未知生产状态: {}", other),
            }),
        }
    }

    /// AnimalGender 转字符串
    fn gender_to_str(gender: &AnimalGender) -> &'static str {
        match gender {
            AnimalGender::Female => "FEMALE",
            AnimalGender::Male => "MALE",
        }
    }

    /// 字符串转 AnimalGender
    fn str_to_gender(s: &str) -> AnimalGender {
        match s {
            "MALE" => AnimalGender::Male,
            _ => AnimalGender::Female, // 默认母
        }
    }

    /// AnimalStatus 转字符串
    fn status_to_str(status: &AnimalStatus) -> &'static str {
        match status {
            AnimalStatus::Active => "ACTIVE",
            AnimalStatus::Sold => "SOLD",
            AnimalStatus::Deceased => "DECEASED",
        }
    }

    /// 字符串转 AnimalStatus
    fn str_to_status(s: &str) -> AnimalStatus {
        match s {
            "SOLD" => AnimalStatus::Sold,
            "DECEASED" => AnimalStatus::Deceased,
            _ => AnimalStatus::Active,
        }
    }

    // ==========================================
    // 行映射
    // ==========================================

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RawAnimalRow> {
        Ok(RawAnimalRow {
            animal_id: row.get(0)?,
            farm_id: row.get(1)?,
            tag_number: row.get(2)?,
            name: row.get(3)?,
            gender: row.get(4)?,
            birth_date: row.get(5)?,
            birth_weight_kg: row.get(6)?,
            production_status: row.get(7)?,
            service_date: row.get(8)?,
            expected_calving_date: row.get(9)?,
            days_in_milk: row.get(10)?,
            lactation_number: row.get(11)?,
            current_daily_production_l: row.get(12)?,
            status: row.get(13)?,
            source: row.get(14)?,
            dam_id: row.get(15)?,
            notes: row.get(16)?,
            created_by: row.get(17)?,
            created_at: row.get(18)?,
            updated_at: row.get(19)?,
        })
    }

    fn into_animal(raw: RawAnimalRow) -> RepositoryResult<Animal> {
        Ok(Animal {
            animal_id: raw.animal_id,
            farm_id: raw.farm_id,
            tag_number: raw.tag_number,
            name: raw.name,
            gender: Self::str_to_gender(&raw.gender),
            birth_date: parse_date_opt(raw.birth_date)?,
            birth_weight_kg: raw.birth_weight_kg,
            production_status: Self::str_to_production_status(&raw.production_status)?,
            service_date: parse_date_opt(raw.service_date)?,
            expected_calving_date: parse_date_opt(raw.expected_calving_date)?,
            days_in_milk: raw.days_in_milk,
            lactation_number: raw.lactation_number,
            current_daily_production_l: raw.current_daily_production_l,
            status: Self::str_to_status(&raw.status),
            source: raw.source,
            dam_id: raw.dam_id,
            notes: raw.notes,
            created_by: raw.created_by,
            created_at: parse_datetime(&raw.created_at)?,
            updated_at: parse_datetime(&raw.updated_at)?,
        })
    }

    const SELECT_COLUMNS: &'static str = r#"
        animal_id, farm_id, tag_number, name, gender, birth_date, birth_weight_kg,
        production_status, service_date, expected_calving_date, days_in_milk,
        lactation_number, current_daily_production_l, status, source, dam_id,
        notes, created_by, created_at, updated_at
    "#;

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按主键查询动物
    pub fn find_by_id(&self, animal_id: &str) -> RepositoryResult<Option<Animal>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM animal WHERE animal_id = ?1",
            Self::SELECT_COLUMNS
        );
        let raw = conn
            .query_row(&sql, params![animal_id], Self::map_row)
            .optional()?;

        raw.map(Self::into_animal).transpose()
    }

    /// 按主键查询动物并校验牧场归属
    ///
    /// # 返回
    /// - Ok(Some(animal)): 动物存在且属于该牧场
    /// - Ok(None): 不存在或不属于该牧场
    pub fn find_in_farm(&self, animal_id: &str, farm_id: &str) -> RepositoryResult<Option<Animal>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM animal WHERE animal_id = ?1 AND farm_id = ?2",
            Self::SELECT_COLUMNS
        );
        let raw = conn
            .query_row(&sql, params![animal_id, farm_id], Self::map_row)
            .optional()?;

        raw.map(Self::into_animal).transpose()
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入动物（本引擎唯一的插入路径: 产犊建档）
    pub fn insert(&self, animal: &Animal) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO animal (
                animal_id, farm_id, tag_number, name, gender, birth_date, birth_weight_kg,
                production_status, service_date, expected_calving_date, days_in_milk,
                lactation_number, current_daily_production_l, status, source, dam_id,
                notes, created_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            "#,
            params![
                animal.animal_id,
                animal.farm_id,
                animal.tag_number,
                animal.name,
                Self::gender_to_str(&animal.gender),
                animal.birth_date.map(fmt_date),
                animal.birth_weight_kg,
                Self::production_status_to_str(&animal.production_status),
                animal.service_date.map(fmt_date),
                animal.expected_calving_date.map(fmt_date),
                animal.days_in_milk,
                animal.lactation_number,
                animal.current_daily_production_l,
                Self::status_to_str(&animal.status),
                animal.source,
                animal.dam_id,
                animal.notes,
                animal.created_by,
                fmt_datetime(animal.created_at),
                fmt_datetime(animal.updated_at),
            ],
        )?;

        Ok(animal.animal_id.clone())
    }

    /// 标记为已配种（条件更新: 当前不处于 SERVED 才生效）
    ///
    /// 写入内容: production_status=SERVED, service_date, expected_calving_date,
    /// days_in_milk 清空
    ///
    /// # 返回
    /// - Ok(rows): 受影响行数（0 = 已是 SERVED，幂等跳过）
    pub fn mark_served(
        &self,
        animal_id: &str,
        service_date: NaiveDate,
        expected_calving_date: NaiveDate,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE animal
            SET production_status = 'SERVED',
                service_date = ?2,
                expected_calving_date = ?3,
                days_in_milk = NULL,
                updated_at = ?4
            WHERE animal_id = ?1 AND production_status != 'SERVED'
            "#,
            params![
                animal_id,
                fmt_date(service_date),
                fmt_date(expected_calving_date),
                fmt_datetime(Utc::now()),
            ],
        )?;
        Ok(rows)
    }

    /// 妊检阴性回退（条件更新: 当前处于 SERVED 才生效）
    ///
    /// 写入内容: production_status=LACTATING, service_date 与
    /// expected_calving_date 清空（动物重新进入配种池）
    ///
    /// # 返回
    /// - Ok(rows): 受影响行数（0 = 不处于 SERVED，幂等跳过）
    pub fn revert_to_lactating(&self, animal_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE animal
            SET production_status = 'LACTATING',
                service_date = NULL,
                expected_calving_date = NULL,
                updated_at = ?2
            WHERE animal_id = ?1 AND production_status = 'SERVED'
            "#,
            params![animal_id, fmt_datetime(Utc::now())],
        )?;
        Ok(rows)
    }

    /// 产犊后刷新母牛状态
    ///
    /// 写入内容: production_status=LACTATING, 胎次库侧原子 +1,
    /// 预产期清空, days_in_milk 归零, service_date 清空
    ///
    /// # 返回
    /// - Ok(rows): 受影响行数（0 = 动物不存在）
    pub fn apply_calving_reset(&self, animal_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE animal
            SET production_status = 'LACTATING',
                lactation_number = lactation_number + 1,
                expected_calving_date = NULL,
                days_in_milk = 0,
                service_date = NULL,
                updated_at = ?2
            WHERE animal_id = ?1
            "#,
            params![animal_id, fmt_datetime(Utc::now())],
        )?;
        Ok(rows)
    }
}

// 行读出中间结构（字符串列在映射后再做类型转换）
struct RawAnimalRow {
    animal_id: String,
    farm_id: String,
    tag_number: Option<String>,
    name: Option<String>,
    gender: String,
    birth_date: Option<String>,
    birth_weight_kg: Option<f64>,
    production_status: String,
    service_date: Option<String>,
    expected_calving_date: Option<String>,
    days_in_milk: Option<i32>,
    lactation_number: i32,
    current_daily_production_l: Option<f64>,
    status: String,
    source: Option<String>,
    dam_id: Option<String>,
    notes: Option<String>,
    created_by: Option<String>,
    created_at: String,
    updated_at: String,
}
