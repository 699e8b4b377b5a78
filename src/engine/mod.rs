// ==========================================
// 奶牛繁育管理系统 - 引擎层
// ==========================================
// 职责: 状态机、状态转换处理器、派生计算、编排与对账
// 红线: 所有跳过/拒绝的转换必须输出 reason（可解释性）
// 红线: 主写入失败中止操作；镜像/派生写入失败记日志后继续
// （"主记录优先，镜像尽力而为"策略，见各处理器注释）
// ==========================================

pub mod calving;
pub mod error;
pub mod insemination;
pub mod lactation;
pub mod orchestrator;
pub mod pregnancy_check;
pub mod reconciliation;
pub mod transition;

// 重导出核心引擎
pub use calving::{CalvingHandler, CalvingInput, CalvingOutcomeSummary};
pub use error::{EngineError, EngineResult};
pub use insemination::{InseminationHandler, InseminationOutcome};
pub use lactation::{compute_days_in_milk, compute_dry_off_status, DryOffStatus};
pub use orchestrator::{BreedingRecordOrchestrator, CreateBreedingRecordInput};
pub use pregnancy_check::{PregnancyCheckHandler, PregnancyCheckInput, PregnancyCheckOutcome};
pub use reconciliation::{ReconciliationJob, ReconciliationReport};
pub use transition::{resolve_transition, LifecycleEvent, TransitionAction, TransitionDecision};
