// ==========================================
// 奶牛繁育管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 红线: 每次表写入是一次独立调用，跨表写入不包事务
// （部分失败是显式处理的结果，不做回滚模拟）
// ==========================================

pub mod animal_repo;
pub mod breeding_event_repo;
pub mod breeding_record_repo;
pub mod error;
pub mod pregnancy_repo;

pub use animal_repo::AnimalRepository;
pub use breeding_event_repo::BreedingEventRepository;
pub use breeding_record_repo::BreedingRecordRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use pregnancy_repo::PregnancyRecordRepository;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

// ==========================================
// 日期/时间字符串映射辅助（仓储层内部统一口径）
// ==========================================
// 存储格式: DATE = "%Y-%m-%d", DATETIME = "%Y-%m-%d %H:%M:%S"

/// DATE 列写入格式化
pub(crate) fn fmt_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// DATETIME 列写入格式化
pub(crate) fn fmt_datetime(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// DATE 列读出解析
pub(crate) fn parse_date(s: &str) -> RepositoryResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| RepositoryError::FieldValueError {
        field: "date".to_string(),
        message: format!("日期解析失败 '{}': {}", s, e),
    })
}

/// 可空 DATE 列读出解析
pub(crate) fn parse_date_opt(s: Option<String>) -> RepositoryResult<Option<NaiveDate>> {
    match s {
        Some(v) => Ok(Some(parse_date(&v)?)),
        None => Ok(None),
    }
}

/// DATETIME 列读出解析
pub(crate) fn parse_datetime(s: &str) -> RepositoryResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| RepositoryError::FieldValueError {
            field: "datetime".to_string(),
            message: format!("时间解析失败 '{}': {}", s, e),
        })
}
