// ==========================================
// 奶牛繁育管理系统 - 派生计算（泌乳/干奶）
// ==========================================
// 职责: 纯函数计算，只读不写
// 口径: 存储的 days_in_milk 是缓存列（产犊归零 / SERVED 清空），
// 非零缓存优先；缓存缺失或为零且处于泌乳期时，从最近一次
// 产犊事件重算
// 红线: 干奶判定不改 production_status，执行干奶由外部模块负责
// ==========================================

use crate::domain::animal::Animal;
use crate::domain::types::ProductionStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// DryOffStatus - 干奶判定结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DryOffStatus {
    pub should_dry_off: bool,    // 是否到达干奶阈值
    pub days_until_dry_off: i32, // 距离干奶还有几天（到达后为 0）
    pub threshold_days: i32,     // 本次判定使用的阈值（怀孕天数）
    pub days_pregnant: i32,      // 当前怀孕天数（非 SERVED 时为 0）
}

/// 计算泌乳天数
///
/// # 参数
/// - animal: 动物聚合
/// - latest_calving_date: 最近一次产犊事件日期（时间线查得，可缺失）
/// - today: 判定基准日
///
/// # 口径
/// 1. 存储缓存非零 → 直接返回缓存
/// 2. 处于 LACTATING 且有产犊事件 → today - 产犊日（整数天，下限 0）
/// 3. 其余情况 → 0
pub fn compute_days_in_milk(
    animal: &Animal,
    latest_calving_date: Option<NaiveDate>,
    today: NaiveDate,
) -> i32 {
    if let Some(stored) = animal.days_in_milk {
        if stored > 0 {
            return stored;
        }
    }

    if animal.production_status == ProductionStatus::Lactating {
        if let Some(calving_date) = latest_calving_date {
            let days = (today - calving_date).num_days();
            return days.max(0) as i32;
        }
    }

    0
}

/// 计算干奶判定
///
/// # 参数
/// - animal: 动物聚合
/// - threshold_days: 干奶阈值（怀孕天数，牧场配置，默认 220）
/// - today: 判定基准日
///
/// # 口径
/// - 仅在 production_status=SERVED 且 service_date 存在时有意义:
///   days_pregnant = today - service_date
///   should_dry_off = days_pregnant >= threshold
///   days_until_dry_off = max(0, threshold - days_pregnant)
/// - 其余情况返回 should_dry_off=false、days_pregnant=0、
///   days_until_dry_off=threshold
pub fn compute_dry_off_status(
    animal: &Animal,
    threshold_days: i32,
    today: NaiveDate,
) -> DryOffStatus {
    let service_date = match (animal.production_status, animal.service_date) {
        (ProductionStatus::Served, Some(d)) => d,
        _ => {
            return DryOffStatus {
                should_dry_off: false,
                days_until_dry_off: threshold_days,
                threshold_days,
                days_pregnant: 0,
            };
        }
    };

    let days_pregnant = (today - service_date).num_days().max(0) as i32;

    DryOffStatus {
        should_dry_off: days_pregnant >= threshold_days,
        days_until_dry_off: (threshold_days - days_pregnant).max(0),
        threshold_days,
        days_pregnant,
    }
}
