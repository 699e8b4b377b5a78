// ==========================================
// 奶牛繁育管理系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 生产状态 (Production Status)
// ==========================================
// 红线: SERVED ↔ LACTATING 之间的转换只能由本引擎的
// 配种/妊检/产犊处理器触发，其余转换属于外部模块
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionStatus {
    Calf,      // 犊牛
    Heifer,    // 育成牛（未产）
    Served,    // 已配种（妊娠结果未知）
    Lactating, // 泌乳
    Dry,       // 干奶
}

impl fmt::Display for ProductionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductionStatus::Calf => write!(f, "CALF"),
            ProductionStatus::Heifer => write!(f, "HEIFER"),
            ProductionStatus::Served => write!(f, "SERVED"),
            ProductionStatus::Lactating => write!(f, "LACTATING"),
            ProductionStatus::Dry => write!(f, "DRY"),
        }
    }
}

// ==========================================
// 配种方式 (Breeding Method)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreedingMethod {
    Natural,                // 自然交配
    ArtificialInsemination, // 人工授精
}

impl fmt::Display for BreedingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreedingMethod::Natural => write!(f, "NATURAL"),
            BreedingMethod::ArtificialInsemination => write!(f, "ARTIFICIAL_INSEMINATION"),
        }
    }
}

// ==========================================
// 繁育事件类型 (Breeding Event Type)
// ==========================================
// 时间线为追加式，事件一旦写入不可变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreedingEventType {
    HeatDetection,  // 发情鉴定
    Insemination,   // 配种
    PregnancyCheck, // 妊娠检查
    Calving,        // 产犊
}

impl fmt::Display for BreedingEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreedingEventType::HeatDetection => write!(f, "HEAT_DETECTION"),
            BreedingEventType::Insemination => write!(f, "INSEMINATION"),
            BreedingEventType::PregnancyCheck => write!(f, "PREGNANCY_CHECK"),
            BreedingEventType::Calving => write!(f, "CALVING"),
        }
    }
}

// ==========================================
// 妊娠记录状态 (Pregnancy Status)
// ==========================================
// 状态机: SUSPECTED → CONFIRMED | FALSE | ABORTED，最终 COMPLETED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PregnancyStatus {
    Suspected, // 疑似妊娠（配种后初始状态）
    Confirmed, // 妊检确认
    #[serde(rename = "FALSE")]
    NotPregnant, // 妊检阴性
    Aborted,   // 流产
    Completed, // 已产犊
}

impl PregnancyStatus {
    /// 是否为终态（终态记录不再视为"进行中的妊娠"）
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PregnancyStatus::NotPregnant | PregnancyStatus::Aborted | PregnancyStatus::Completed
        )
    }
}

impl fmt::Display for PregnancyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PregnancyStatus::Suspected => write!(f, "SUSPECTED"),
            PregnancyStatus::Confirmed => write!(f, "CONFIRMED"),
            PregnancyStatus::NotPregnant => write!(f, "FALSE"),
            PregnancyStatus::Aborted => write!(f, "ABORTED"),
            PregnancyStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

// ==========================================
// 妊检结果 (Pregnancy Check Result)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PregnancyCheckResult {
    Confirmed, // 阳性（妊娠确认）
    Negative,  // 阴性（未妊娠）
    Pending,   // 待定（仅记录）
}

impl fmt::Display for PregnancyCheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PregnancyCheckResult::Confirmed => write!(f, "CONFIRMED"),
            PregnancyCheckResult::Negative => write!(f, "NEGATIVE"),
            PregnancyCheckResult::Pending => write!(f, "PENDING"),
        }
    }
}

// ==========================================
// 产犊结局 (Calving Outcome)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalvingOutcome {
    Normal,    // 顺产
    Assisted,  // 助产
    Difficult, // 难产
    Stillborn, // 死胎
}

impl fmt::Display for CalvingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalvingOutcome::Normal => write!(f, "NORMAL"),
            CalvingOutcome::Assisted => write!(f, "ASSISTED"),
            CalvingOutcome::Difficult => write!(f, "DIFFICULT"),
            CalvingOutcome::Stillborn => write!(f, "STILLBORN"),
        }
    }
}

// ==========================================
// 配种记录妊娠状态列 (Record Pregnancy Status)
// ==========================================
// 冗余提示列: 创建时为 PENDING，本引擎创建后不再修改
// （妊娠结果的事实层在 pregnancy_record 表）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordPregnancyStatus {
    Pending,   // 结果未知
    Confirmed, // 已确认（外部模块维护）
    Failed,    // 已失败（外部模块维护）
}

impl fmt::Display for RecordPregnancyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordPregnancyStatus::Pending => write!(f, "PENDING"),
            RecordPregnancyStatus::Confirmed => write!(f, "CONFIRMED"),
            RecordPregnancyStatus::Failed => write!(f, "FAILED"),
        }
    }
}

// ==========================================
// 动物性别 (Animal Gender)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnimalGender {
    Female, // 母
    Male,   // 公
}

impl fmt::Display for AnimalGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimalGender::Female => write!(f, "FEMALE"),
            AnimalGender::Male => write!(f, "MALE"),
        }
    }
}

// ==========================================
// 动物在场状态 (Animal Status)
// ==========================================
// 本引擎只在产犊建档时写入 ACTIVE，其余转换属于外部模块
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnimalStatus {
    Active,   // 在场
    Sold,     // 已售
    Deceased, // 死亡
}

impl fmt::Display for AnimalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimalStatus::Active => write!(f, "ACTIVE"),
            AnimalStatus::Sold => write!(f, "SOLD"),
            AnimalStatus::Deceased => write!(f, "DECEASED"),
        }
    }
}
