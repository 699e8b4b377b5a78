// ==========================================
// 奶牛繁育管理系统 - 产犊事件处理器
// ==========================================
// 职责: 处理 CALVING 事件，收口一次妊娠周期
// 写入顺序:
// 1. 妊娠记录置 COMPLETED（主写入，失败中止）
// 2. 追加 CALVING 时间线事件（镜像，失败记 warn 继续）
// 3. 可选犊牛建档（镜像，失败记 warn 继续）
// 4. 母牛状态刷新: LACTATING、胎次 +1、days_in_milk 归零（镜像，
//    失败记 warn 继续，后续对账可修复）
// 红线: 非 SERVED 状态产犊属于数据异常，记 warn 后照常刷新
// ==========================================

use crate::domain::animal::Animal;
use crate::domain::breeding::{BreedingEvent, BreedingRecord, EventDetails};
use crate::domain::types::{
    AnimalGender, AnimalStatus, BreedingEventType, CalvingOutcome, ProductionStatus,
};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::transition::is_regular_calving;
use crate::repository::animal_repo::AnimalRepository;
use crate::repository::breeding_event_repo::BreedingEventRepository;
use crate::repository::breeding_record_repo::BreedingRecordRepository;
use crate::repository::pregnancy_repo::PregnancyRecordRepository;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// CalvingInput - 产犊输入
// ==========================================
#[derive(Debug, Clone)]
pub struct CalvingInput {
    pub breeding_record_id: String, // 收口的配种记录
    pub farm_id: String,
    pub calving_date: NaiveDate,
    pub outcome: CalvingOutcome,
    pub create_calf: bool,              // 是否同时为犊牛建档
    pub calf_tag: Option<String>,       // 犊牛耳标号（建档必填）
    pub calf_gender: Option<AnimalGender>,
    pub calf_weight_kg: Option<f64>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

// ==========================================
// CalvingOutcomeSummary - 产犊处理结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct CalvingOutcomeSummary {
    pub applied: bool,                // 本次是否实际收口（false = 重放跳过）
    pub pregnancy_id: String,
    pub gestation_length_days: i32,   // 实际妊娠期（产犊日 - 配种日）
    pub calf_animal_id: Option<String>, // 建档成功的犊牛标识
    pub dam_lactation_number: i32,    // 母牛当前胎次（刷新生效时为 +1 后的值）
}

pub struct CalvingHandler {
    animal_repo: Arc<AnimalRepository>,
    record_repo: Arc<BreedingRecordRepository>,
    event_repo: Arc<BreedingEventRepository>,
    pregnancy_repo: Arc<PregnancyRecordRepository>,
}

impl CalvingHandler {
    pub fn new(
        animal_repo: Arc<AnimalRepository>,
        record_repo: Arc<BreedingRecordRepository>,
        event_repo: Arc<BreedingEventRepository>,
        pregnancy_repo: Arc<PregnancyRecordRepository>,
    ) -> Self {
        Self {
            animal_repo,
            record_repo,
            event_repo,
            pregnancy_repo,
        }
    }

    /// 处理产犊事件
    #[instrument(skip(self, input), fields(breeding_record_id = %input.breeding_record_id))]
    pub async fn handle(&self, input: CalvingInput) -> EngineResult<CalvingOutcomeSummary> {
        // ===== 前置校验: 配种记录、母牛、妊娠记录必须存在 =====
        let record = self
            .record_repo
            .find_in_farm(&input.breeding_record_id, &input.farm_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "配种记录".to_string(),
                id: input.breeding_record_id.clone(),
            })?;

        let dam = self
            .animal_repo
            .find_in_farm(&record.animal_id, &input.farm_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "动物".to_string(),
                id: record.animal_id.clone(),
            })?;

        let pregnancy = self
            .pregnancy_repo
            .find_by_breeding_record(&input.breeding_record_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "妊娠记录".to_string(),
                id: input.breeding_record_id.clone(),
            })?;

        // ===== 主写入: 妊娠记录收口（条件更新，重放时 rows=0） =====
        let gestation_length_days =
            (input.calving_date - record.breeding_date).num_days() as i32;
        let rows = self.pregnancy_repo.complete(
            &pregnancy.pregnancy_id,
            input.calving_date,
            Some(gestation_length_days),
        )?;
        if rows == 0 {
            info!(
                pregnancy_id = %pregnancy.pregnancy_id,
                status = %pregnancy.status,
                "妊娠记录已处于终态，重复产犊事件跳过"
            );
            return Ok(CalvingOutcomeSummary {
                applied: false,
                pregnancy_id: pregnancy.pregnancy_id,
                gestation_length_days: pregnancy
                    .gestation_length_days
                    .unwrap_or(gestation_length_days),
                calf_animal_id: None,
                dam_lactation_number: dam.lactation_number,
            });
        }

        info!(
            pregnancy_id = %pregnancy.pregnancy_id,
            gestation_length_days = gestation_length_days,
            "妊娠记录置为 COMPLETED"
        );

        // ===== 镜像写入 1: CALVING 时间线事件 =====
        self.append_calving_event(&record, &input);

        // ===== 镜像写入 2: 犊牛建档（可选） =====
        let calf_animal_id = if input.create_calf {
            self.create_calf(&dam, &input)
        } else {
            None
        };

        // ===== 镜像写入 3: 母牛状态刷新 =====
        if !is_regular_calving(dam.production_status) {
            warn!(
                animal_id = %dam.animal_id,
                production_status = %dam.production_status,
                "非 SERVED 状态产犊（数据异常），照常刷新母牛状态"
            );
        }
        let reset_applied = match self.animal_repo.apply_calving_reset(&dam.animal_id) {
            Ok(rows) => {
                if rows > 0 {
                    info!(
                        animal_id = %dam.animal_id,
                        lactation_number = dam.lactation_number + 1,
                        "母牛产犊刷新: LACTATING，胎次 +1"
                    );
                }
                rows > 0
            }
            Err(e) => {
                warn!(
                    animal_id = %dam.animal_id,
                    error = %e,
                    "母牛产犊刷新失败，待对账修复"
                );
                false
            }
        };

        Ok(CalvingOutcomeSummary {
            applied: true,
            pregnancy_id: pregnancy.pregnancy_id,
            gestation_length_days,
            calf_animal_id,
            // 刷新未生效时报告原胎次，不虚报 +1
            dam_lactation_number: if reset_applied {
                dam.lactation_number + 1
            } else {
                dam.lactation_number
            },
        })
    }

    /// 追加 CALVING 时间线事件（镜像写入）
    fn append_calving_event(&self, record: &BreedingRecord, input: &CalvingInput) {
        let event = BreedingEvent {
            event_id: Uuid::new_v4().to_string(),
            animal_id: record.animal_id.clone(),
            farm_id: input.farm_id.clone(),
            event_type: BreedingEventType::Calving,
            event_date: input.calving_date,
            details: Some(EventDetails::Calving {
                outcome: input.outcome,
                calf_tag: input.calf_tag.clone(),
                calf_gender: input.calf_gender,
                calf_weight_kg: input.calf_weight_kg,
            }),
            notes: input.notes.clone(),
            created_by: input.created_by.clone(),
            created_at: Utc::now(),
        };

        if let Err(e) = self.event_repo.insert(&event) {
            warn!(
                animal_id = %record.animal_id,
                error = %e,
                "产犊时间线事件写入失败，继续处理"
            );
        }
    }

    /// 犊牛建档（镜像写入，耳标缺失时跳过）
    fn create_calf(&self, dam: &Animal, input: &CalvingInput) -> Option<String> {
        let calf_tag = match input.calf_tag.as_deref() {
            Some(tag) if !tag.trim().is_empty() => tag.to_string(),
            _ => {
                warn!(
                    animal_id = %dam.animal_id,
                    "要求犊牛建档但未提供耳标号，跳过建档"
                );
                return None;
            }
        };

        let now = Utc::now();
        let calf = Animal {
            animal_id: Uuid::new_v4().to_string(),
            farm_id: dam.farm_id.clone(),
            tag_number: Some(calf_tag.clone()),
            name: None,
            gender: input.calf_gender.unwrap_or(AnimalGender::Female),
            birth_date: Some(input.calving_date),
            birth_weight_kg: input.calf_weight_kg,
            production_status: ProductionStatus::Calf,
            service_date: None,
            expected_calving_date: None,
            days_in_milk: None,
            lactation_number: 0,
            current_daily_production_l: None,
            status: AnimalStatus::Active,
            source: Some("BORN".to_string()),
            dam_id: Some(dam.animal_id.clone()),
            notes: dam
                .tag_number
                .as_ref()
                .map(|t| format!("母牛耳标: {}", t)),
            created_by: input.created_by.clone(),
            created_at: now,
            updated_at: now,
        };

        match self.animal_repo.insert(&calf) {
            Ok(id) => {
                info!(calf_animal_id = %id, calf_tag = %calf_tag, "犊牛建档成功");
                Some(id)
            }
            Err(e) => {
                warn!(
                    dam_animal_id = %dam.animal_id,
                    error = %e,
                    "犊牛建档失败，继续处理"
                );
                None
            }
        }
    }
}
