// ==========================================
// 奶牛繁育管理系统 - 配种事件处理器
// ==========================================
// 职责: 处理 INSEMINATION 事件对动物状态的影响
// 规则: 非 SERVED → SERVED（写 service_date / 预产期，清 days_in_milk）；
// 已是 SERVED → 幂等跳过
// 红线: 并发重复事件由仓储条件更新兜底（rows=0 视为跳过），
// 本处理器的转换表判定只是第一道守卫
// ==========================================

use crate::config::BreedingConfigReader;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::transition::{resolve_transition, LifecycleEvent, TransitionDecision};
use crate::repository::animal_repo::AnimalRepository;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// InseminationOutcome - 处理结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct InseminationOutcome {
    pub applied: bool,                             // 本次是否实际发生状态转换
    pub expected_calving_date: Option<NaiveDate>,  // 写入的预产期（applied=true 时有值）
}

pub struct InseminationHandler<C: BreedingConfigReader> {
    animal_repo: Arc<AnimalRepository>,
    config: Arc<C>,
}

impl<C: BreedingConfigReader> InseminationHandler<C> {
    pub fn new(animal_repo: Arc<AnimalRepository>, config: Arc<C>) -> Self {
        Self {
            animal_repo,
            config,
        }
    }

    /// 处理配种事件
    ///
    /// # 参数
    /// - animal_id: 被配种动物
    /// - farm_id: 牧场标识（归属校验）
    /// - service_date: 配种日期
    /// - created_by: 操作人（审计日志归属）
    ///
    /// # 说明
    /// 预产期 = 配种日 + 牧场妊娠期天数（默认 280）
    #[instrument(skip(self), fields(animal_id = %animal_id, farm_id = %farm_id))]
    pub async fn handle(
        &self,
        animal_id: &str,
        farm_id: &str,
        service_date: NaiveDate,
        created_by: Option<&str>,
    ) -> EngineResult<InseminationOutcome> {
        let animal = self
            .animal_repo
            .find_in_farm(animal_id, farm_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "动物".to_string(),
                id: animal_id.to_string(),
            })?;

        let decision = resolve_transition(animal.production_status, &LifecycleEvent::Insemination);
        if let TransitionDecision::Skip(reason) = decision {
            info!(animal_id = %animal_id, reason = %reason, "配种事件跳过状态转换");
            return Ok(InseminationOutcome {
                applied: false,
                expected_calving_date: None,
            });
        }

        let gestation_days = self
            .config
            .get_gestation_days(farm_id)
            .await
            .map_err(|e| EngineError::Config(e.to_string()))?;
        let expected_calving_date = service_date + Duration::days(gestation_days as i64);

        // 条件更新: 并发下另一事件先行转换时 rows=0
        let rows = self
            .animal_repo
            .mark_served(animal_id, service_date, expected_calving_date)?;
        if rows == 0 {
            info!(animal_id = %animal_id, "动物已被并发事件置为 SERVED，跳过");
            return Ok(InseminationOutcome {
                applied: false,
                expected_calving_date: None,
            });
        }

        info!(
            animal_id = %animal_id,
            service_date = %service_date,
            expected_calving_date = %expected_calving_date,
            created_by = created_by.unwrap_or("-"),
            "动物转入 SERVED 状态"
        );

        Ok(InseminationOutcome {
            applied: true,
            expected_calving_date: Some(expected_calving_date),
        })
    }
}
