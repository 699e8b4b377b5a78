// ==========================================
// 奶牛繁育管理系统 - 妊娠检查事件处理器
// ==========================================
// 职责: 处理 PREGNANCY_CHECK 事件的三种结果
// - CONFIRMED: 动物状态不变，重算预产期，确认打开的妊娠记录，追加时间线
// - NEGATIVE: SERVED → LACTATING 回退（条件更新），妊娠记录置 FALSE，追加时间线
// - PENDING: 仅追加时间线（审计）
// 红线: 时间线追加与妊娠记录更新是镜像写入，失败记 warn 后继续；
// 动物状态回退是主写入
// ==========================================

use crate::config::BreedingConfigReader;
use crate::domain::breeding::{BreedingEvent, EventDetails};
use crate::domain::types::{BreedingEventType, PregnancyCheckResult};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::transition::{resolve_transition, LifecycleEvent, TransitionDecision};
use crate::repository::animal_repo::AnimalRepository;
use crate::repository::breeding_event_repo::BreedingEventRepository;
use crate::repository::pregnancy_repo::PregnancyRecordRepository;
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// PregnancyCheckInput - 妊检输入
// ==========================================
#[derive(Debug, Clone)]
pub struct PregnancyCheckInput {
    pub animal_id: String,
    pub farm_id: String,
    pub check_date: NaiveDate,
    pub result: PregnancyCheckResult,
    pub exam_method: Option<String>, // 直检 / B超等
    pub examiner: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

// ==========================================
// PregnancyCheckOutcome - 妊检处理结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct PregnancyCheckOutcome {
    pub result: PregnancyCheckResult,
    pub status_changed: bool,                     // 动物生产状态是否发生转换
    pub expected_calving_date: Option<NaiveDate>, // 阳性时重算后的预产期
}

pub struct PregnancyCheckHandler<C: BreedingConfigReader> {
    animal_repo: Arc<AnimalRepository>,
    event_repo: Arc<BreedingEventRepository>,
    pregnancy_repo: Arc<PregnancyRecordRepository>,
    config: Arc<C>,
}

impl<C: BreedingConfigReader> PregnancyCheckHandler<C> {
    pub fn new(
        animal_repo: Arc<AnimalRepository>,
        event_repo: Arc<BreedingEventRepository>,
        pregnancy_repo: Arc<PregnancyRecordRepository>,
        config: Arc<C>,
    ) -> Self {
        Self {
            animal_repo,
            event_repo,
            pregnancy_repo,
            config,
        }
    }

    /// 处理妊娠检查事件
    #[instrument(skip(self, input), fields(animal_id = %input.animal_id, result = %input.result))]
    pub async fn handle(&self, input: PregnancyCheckInput) -> EngineResult<PregnancyCheckOutcome> {
        let animal = self
            .animal_repo
            .find_in_farm(&input.animal_id, &input.farm_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "动物".to_string(),
                id: input.animal_id.clone(),
            })?;

        let decision = resolve_transition(
            animal.production_status,
            &LifecycleEvent::PregnancyCheck(input.result),
        );

        let outcome = match input.result {
            PregnancyCheckResult::Confirmed => {
                // 预产期以妊检确认口径重算: service_date + 妊娠期
                let expected = match animal.service_date {
                    Some(service_date) => {
                        let gestation_days = self
                            .config
                            .get_gestation_days(&input.farm_id)
                            .await
                            .map_err(|e| EngineError::Config(e.to_string()))?;
                        Some(service_date + Duration::days(gestation_days as i64))
                    }
                    None => {
                        warn!(
                            animal_id = %input.animal_id,
                            "妊检阳性但动物无 service_date，无法重算预产期"
                        );
                        None
                    }
                };

                self.confirm_open_pregnancy(&input, expected);

                PregnancyCheckOutcome {
                    result: input.result,
                    status_changed: false,
                    expected_calving_date: expected,
                }
            }

            PregnancyCheckResult::Negative => {
                let status_changed = match decision {
                    TransitionDecision::Apply(_) => {
                        // 条件更新: 并发回放时 rows=0
                        let rows = self.animal_repo.revert_to_lactating(&input.animal_id)?;
                        if rows > 0 {
                            info!(
                                animal_id = %input.animal_id,
                                "妊检阴性，动物回退为 LACTATING"
                            );
                        }
                        rows > 0
                    }
                    TransitionDecision::Skip(reason) => {
                        info!(animal_id = %input.animal_id, reason = %reason, "妊检阴性跳过回退");
                        false
                    }
                };

                self.mark_open_pregnancy_false(&input);

                PregnancyCheckOutcome {
                    result: input.result,
                    status_changed,
                    expected_calving_date: None,
                }
            }

            PregnancyCheckResult::Pending => PregnancyCheckOutcome {
                result: input.result,
                status_changed: false,
                expected_calving_date: None,
            },
        };

        // 三种结果都追加时间线（镜像写入，尽力而为）
        self.append_check_event(&input);

        Ok(outcome)
    }

    /// 确认动物当前打开的妊娠记录（镜像写入）
    fn confirm_open_pregnancy(&self, input: &PregnancyCheckInput, expected: Option<NaiveDate>) {
        match self.pregnancy_repo.find_open_by_animal(&input.animal_id) {
            Ok(open) => {
                if open.is_empty() {
                    warn!(
                        animal_id = %input.animal_id,
                        "妊检阳性但无打开的妊娠记录可确认"
                    );
                    return;
                }
                if open.len() > 1 {
                    warn!(
                        animal_id = %input.animal_id,
                        count = open.len(),
                        "同一动物存在多条打开的妊娠记录，仅确认最新一条"
                    );
                }
                // find_open_by_animal 按 created_at 倒序，首条即最新
                let target = &open[0];
                if let Err(e) = self.pregnancy_repo.confirm(
                    &target.pregnancy_id,
                    input.check_date,
                    input.exam_method.as_deref(),
                    input.examiner.as_deref(),
                    expected,
                ) {
                    warn!(
                        animal_id = %input.animal_id,
                        pregnancy_id = %target.pregnancy_id,
                        error = %e,
                        "妊娠记录确认失败，继续处理"
                    );
                }
            }
            Err(e) => {
                warn!(animal_id = %input.animal_id, error = %e, "查询打开妊娠记录失败，继续处理");
            }
        }
    }

    /// 将动物当前打开的妊娠记录置为 FALSE（镜像写入）
    fn mark_open_pregnancy_false(&self, input: &PregnancyCheckInput) {
        match self.pregnancy_repo.find_open_by_animal(&input.animal_id) {
            Ok(open) => {
                for record in &open {
                    if let Err(e) = self.pregnancy_repo.mark_false(&record.pregnancy_id) {
                        warn!(
                            animal_id = %input.animal_id,
                            pregnancy_id = %record.pregnancy_id,
                            error = %e,
                            "妊娠记录置 FALSE 失败，继续处理"
                        );
                    }
                }
            }
            Err(e) => {
                warn!(animal_id = %input.animal_id, error = %e, "查询打开妊娠记录失败，继续处理");
            }
        }
    }

    /// 追加妊检时间线事件（镜像写入）
    fn append_check_event(&self, input: &PregnancyCheckInput) {
        let event = BreedingEvent {
            event_id: Uuid::new_v4().to_string(),
            animal_id: input.animal_id.clone(),
            farm_id: input.farm_id.clone(),
            event_type: BreedingEventType::PregnancyCheck,
            event_date: input.check_date,
            details: Some(EventDetails::PregnancyCheck {
                result: input.result,
                exam_method: input.exam_method.clone(),
                examiner: input.examiner.clone(),
            }),
            notes: input.notes.clone(),
            created_by: input.created_by.clone(),
            created_at: Utc::now(),
        };

        if let Err(e) = self.event_repo.insert(&event) {
            warn!(
                animal_id = %input.animal_id,
                error = %e,
                "妊检时间线事件写入失败，继续处理"
            );
        }
    }
}
