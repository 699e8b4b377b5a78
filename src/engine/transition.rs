// ==========================================
// 奶牛繁育管理系统 - 生产状态转换表
// ==========================================
// 职责: 以显式转换表集中定义 (当前状态, 触发事件) → 决策，
// 替代散落在各处理器里的 if 判断，使幂等守卫与异常转换
// 可以被穷举测试
// 红线: 本表只做决策，不做写入；跳过必须输出 reason
// ==========================================

use crate::domain::types::{PregnancyCheckResult, ProductionStatus};

// ==========================================
// LifecycleEvent - 触发状态转换的生命周期事件
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// 配种事件
    Insemination,
    /// 妊娠检查（携带检查结果）
    PregnancyCheck(PregnancyCheckResult),
    /// 产犊事件
    Calving,
}

// ==========================================
// TransitionAction - 转换动作（写入集合）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    /// 置为 SERVED: 写 service_date / expected_calving_date，清 days_in_milk
    MarkServed,
    /// 回退为 LACTATING: 清 service_date / expected_calving_date
    RevertToLactating,
    /// 产犊刷新: 置 LACTATING、胎次 +1、清预产期/service_date、days_in_milk 归零
    CompleteCalving,
}

// ==========================================
// TransitionDecision - 转换决策
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDecision {
    /// 执行转换
    Apply(TransitionAction),
    /// 跳过（幂等守卫或无状态影响的事件），携带原因
    Skip(&'static str),
}

impl TransitionDecision {
    pub fn is_apply(&self) -> bool {
        matches!(self, TransitionDecision::Apply(_))
    }
}

/// 解析状态转换
///
/// 规则表:
/// - 配种: 已是 SERVED → 跳过（防重复事件）; 其余状态 → MarkServed
/// - 妊检阳性: 状态不变（SERVED 维持，妊娠事实写在 pregnancy_record）
/// - 妊检阴性: SERVED → RevertToLactating; 其余状态 → 跳过（防重放）
/// - 妊检待定: 仅审计记录，不转换
/// - 产犊: 任何状态 → CompleteCalving（常规路径是 SERVED，
///   其他状态属于数据异常，由处理器记 warn 后照常刷新）
pub fn resolve_transition(
    current: ProductionStatus,
    event: &LifecycleEvent,
) -> TransitionDecision {
    match (current, event) {
        // ===== 配种 =====
        (ProductionStatus::Served, LifecycleEvent::Insemination) => {
            TransitionDecision::Skip("动物已处于 SERVED 状态，重复配种事件跳过")
        }
        (_, LifecycleEvent::Insemination) => {
            TransitionDecision::Apply(TransitionAction::MarkServed)
        }

        // ===== 妊娠检查 =====
        (_, LifecycleEvent::PregnancyCheck(PregnancyCheckResult::Confirmed)) => {
            TransitionDecision::Skip("妊检阳性不改变生产状态（维持 SERVED）")
        }
        (ProductionStatus::Served, LifecycleEvent::PregnancyCheck(PregnancyCheckResult::Negative)) => {
            TransitionDecision::Apply(TransitionAction::RevertToLactating)
        }
        (_, LifecycleEvent::PregnancyCheck(PregnancyCheckResult::Negative)) => {
            TransitionDecision::Skip("动物不处于 SERVED 状态，阴性妊检重放跳过")
        }
        (_, LifecycleEvent::PregnancyCheck(PregnancyCheckResult::Pending)) => {
            TransitionDecision::Skip("妊检待定仅作审计记录，不转换状态")
        }

        // ===== 产犊 =====
        (_, LifecycleEvent::Calving) => {
            TransitionDecision::Apply(TransitionAction::CompleteCalving)
        }
    }
}

/// 产犊是否为常规转换（非 SERVED 状态产犊属于数据异常，需要告警）
pub fn is_regular_calving(current: ProductionStatus) -> bool {
    current == ProductionStatus::Served
}
