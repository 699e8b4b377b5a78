// ==========================================
// 奶牛繁育管理系统 - 繁育领域模型
// ==========================================
// 三类实体:
// - BreedingRecord: 配种记录（权威事实，创建后本引擎不再修改）
// - BreedingEvent: 繁育时间线（追加式，不可变）
// - PregnancyRecord: 妊娠跟踪记录（随妊检/产犊演进）
// ==========================================

use crate::domain::types::{
    BreedingEventType, BreedingMethod, CalvingOutcome, AnimalGender, PregnancyCheckResult,
    PregnancyStatus, RecordPregnancyStatus,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// BreedingRecord - 配种记录
// ==========================================
// 红线: 一次配种行为只创建一条记录，创建后不可变；
// 妊娠结果的事实层在 pregnancy_record
// 对齐: breeding_record 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingRecord {
    // ===== 主键与归属 =====
    pub record_id: String,              // 记录唯一标识（UUID）
    pub animal_id: String,              // 被配种动物
    pub farm_id: String,                // 所属牧场

    // ===== 配种信息 =====
    pub method: BreedingMethod,         // 配种方式
    pub breeding_date: NaiveDate,       // 配种日期
    pub sire_code: Option<String>,      // 公牛/冻精编号
    pub technician: Option<String>,     // 配种员
    pub cost: Option<f64>,              // 费用
    pub notes: Option<String>,          // 备注

    // ===== 冗余提示列 =====
    pub pregnancy_status: RecordPregnancyStatus, // 创建时 PENDING，本引擎不再修改

    // ===== 来源标记 =====
    pub auto_generated: bool,           // true = 对账作业回填，false = 用户直接录入

    // ===== 审计字段 =====
    pub created_by: Option<String>,     // 操作人
    pub created_at: DateTime<Utc>,      // 记录创建时间
}

// ==========================================
// EventDetails - 事件类型专属属性
// ==========================================
// 存储: breeding_event.details_json（serde 标签式序列化）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventDetails {
    /// 发情鉴定
    HeatDetection {
        detected_by: Option<String>, // 鉴定人
    },
    /// 配种
    Insemination {
        method: BreedingMethod,        // 配种方式
        sire_code: Option<String>,     // 公牛/冻精编号
        technician: Option<String>,    // 配种员
    },
    /// 妊娠检查
    PregnancyCheck {
        result: PregnancyCheckResult,  // 检查结果
        exam_method: Option<String>,   // 检查方法（直检/B超等）
        examiner: Option<String>,      // 检查人
    },
    /// 产犊
    Calving {
        outcome: CalvingOutcome,          // 产犊结局
        calf_tag: Option<String>,         // 犊牛耳标号
        calf_gender: Option<AnimalGender>, // 犊牛性别
        calf_weight_kg: Option<f64>,      // 犊牛出生体重（kg）
    },
}

// ==========================================
// BreedingEvent - 繁育时间线事件
// ==========================================
// 红线: 追加式，写入后不可变；动物繁育史 = 事件的并集
// 对齐: breeding_event 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingEvent {
    // ===== 主键与归属 =====
    pub event_id: String,               // 事件唯一标识（UUID）
    pub animal_id: String,              // 关联动物
    pub farm_id: String,                // 所属牧场

    // ===== 事件内容 =====
    pub event_type: BreedingEventType,  // 事件类型
    pub event_date: NaiveDate,          // 事件日期
    pub details: Option<EventDetails>,  // 类型专属属性
    pub notes: Option<String>,          // 备注

    // ===== 审计字段 =====
    pub created_by: Option<String>,     // 记录人（审计归属）
    pub created_at: DateTime<Utc>,      // 记录创建时间
}

// ==========================================
// PregnancyRecord - 妊娠跟踪记录
// ==========================================
// 创建时与 BreedingRecord 一一对应，状态随时间演进
// 不变式: 同一动物同时最多一条非终态记录（写入时不做原子
// 强制，编排器在发现第二条打开记录时记 warn 日志）
// 对齐: pregnancy_record 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PregnancyRecord {
    // ===== 主键与关联 =====
    pub pregnancy_id: String,           // 记录唯一标识（UUID）
    pub breeding_record_id: String,     // 关联配种记录（FK 语义）
    pub animal_id: String,              // 关联动物
    pub farm_id: String,                // 所属牧场

    // ===== 妊娠状态 =====
    pub status: PregnancyStatus,        // SUSPECTED → CONFIRMED|FALSE|ABORTED → COMPLETED
    pub expected_calving_date: Option<NaiveDate>, // 预产期
    pub actual_calving_date: Option<NaiveDate>,   // 实际产犊日期
    pub gestation_length_days: Option<i32>,       // 实际妊娠期（产犊日 - 配种日）

    // ===== 妊检信息 =====
    pub confirmed_date: Option<NaiveDate>, // 确认日期
    pub exam_method: Option<String>,       // 检查方法
    pub examiner: Option<String>,          // 检查人

    // ===== 审计字段 =====
    pub created_by: Option<String>,     // 操作人
    pub created_at: DateTime<Utc>,      // 记录创建时间
    pub updated_at: DateTime<Utc>,      // 记录更新时间
}
