// ==========================================
// 奶牛繁育管理系统 - 动物领域模型
// ==========================================
// 红线: 动物聚合由独立的动物管理模块拥有，本引擎只更新
// 繁育相关字段（production_status / service_date /
// expected_calving_date / days_in_milk / lactation_number），
// 唯一的插入路径是产犊时的犊牛建档
// ==========================================

use crate::domain::types::{AnimalGender, AnimalStatus, ProductionStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Animal - 动物聚合
// ==========================================
// 对齐: animal 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    // ===== 主键与归属 =====
    pub animal_id: String,            // 动物唯一标识（UUID）
    pub farm_id: String,              // 所属牧场

    // ===== 基础信息 =====
    pub tag_number: Option<String>,   // 耳标号
    pub name: Option<String>,         // 名字
    pub gender: AnimalGender,         // 性别
    pub birth_date: Option<NaiveDate>, // 出生日期
    pub birth_weight_kg: Option<f64>, // 出生体重（kg）

    // ===== 繁育状态（本引擎拥有的字段）=====
    pub production_status: ProductionStatus, // 生产状态
    pub service_date: Option<NaiveDate>,     // 配种日期（仅 SERVED 时存在）
    pub expected_calving_date: Option<NaiveDate>, // 预产期（service_date + 妊娠期）
    pub days_in_milk: Option<i32>,           // 泌乳天数（缓存列，产犊时归零，SERVED 时清空）
    pub lactation_number: i32,               // 胎次（每次产犊 +1，库侧原子自增）

    // ===== 生产数据（本引擎只读）=====
    pub current_daily_production_l: Option<f64>, // 当前日产奶量（升）

    // ===== 在场信息 =====
    pub status: AnimalStatus,         // 在场状态
    pub source: Option<String>,       // 来源（产犊建档为 "BORN"）
    pub dam_id: Option<String>,       // 母亲（犊牛建档时指向母牛）
    pub notes: Option<String>,        // 备注

    // ===== 审计字段 =====
    pub created_by: Option<String>,   // 创建人
    pub created_at: DateTime<Utc>,    // 记录创建时间
    pub updated_at: DateTime<Utc>,    // 记录更新时间
}
