// ==========================================
// 奶牛繁育管理系统 - 配种记录编排器
// ==========================================
// 职责: 一次配种行为的三路写入编排
// 1. 配种记录（权威事实，主写入，失败中止整个操作）
// 2. INSEMINATION 时间线事件（镜像，失败记 warn 继续）
// 3. 妊娠跟踪记录 SUSPECTED（镜像，失败记 warn 继续）
// 红线: 主记录成功后绝不因镜像失败回滚或报错，缺失的镜像
// 由对账作业补齐
// 红线: 同一动物发现第二条打开的妊娠记录时记 warn（不变式
// 由调用方保证，引擎只检测告警）
// ==========================================

use crate::config::BreedingConfigReader;
use crate::config::DEFAULT_GESTATION_DAYS;
use crate::domain::breeding::{BreedingEvent, BreedingRecord, EventDetails, PregnancyRecord};
use crate::domain::types::{
    BreedingEventType, BreedingMethod, PregnancyStatus, RecordPregnancyStatus,
};
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::animal_repo::AnimalRepository;
use crate::repository::breeding_event_repo::BreedingEventRepository;
use crate::repository::breeding_record_repo::BreedingRecordRepository;
use crate::repository::pregnancy_repo::PregnancyRecordRepository;
use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// CreateBreedingRecordInput - 配种录入输入
// ==========================================
#[derive(Debug, Clone)]
pub struct CreateBreedingRecordInput {
    pub animal_id: String,
    pub farm_id: String,
    pub method: BreedingMethod,
    pub breeding_date: NaiveDate,
    pub sire_code: Option<String>,
    pub technician: Option<String>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

pub struct BreedingRecordOrchestrator<C: BreedingConfigReader> {
    animal_repo: Arc<AnimalRepository>,
    record_repo: Arc<BreedingRecordRepository>,
    event_repo: Arc<BreedingEventRepository>,
    pregnancy_repo: Arc<PregnancyRecordRepository>,
    config: Arc<C>,
}

impl<C: BreedingConfigReader> BreedingRecordOrchestrator<C> {
    pub fn new(
        animal_repo: Arc<AnimalRepository>,
        record_repo: Arc<BreedingRecordRepository>,
        event_repo: Arc<BreedingEventRepository>,
        pregnancy_repo: Arc<PregnancyRecordRepository>,
        config: Arc<C>,
    ) -> Self {
        Self {
            animal_repo,
            record_repo,
            event_repo,
            pregnancy_repo,
            config,
        }
    }

    /// 创建配种记录（三路写入编排）
    #[instrument(skip(self, input), fields(animal_id = %input.animal_id, farm_id = %input.farm_id))]
    pub async fn create(&self, input: CreateBreedingRecordInput) -> EngineResult<BreedingRecord> {
        // 归属校验
        self.animal_repo
            .find_in_farm(&input.animal_id, &input.farm_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "动物".to_string(),
                id: input.animal_id.clone(),
            })?;

        // ===== 主写入: 配种记录 =====
        let record = BreedingRecord {
            record_id: Uuid::new_v4().to_string(),
            animal_id: input.animal_id.clone(),
            farm_id: input.farm_id.clone(),
            method: input.method,
            breeding_date: input.breeding_date,
            sire_code: input.sire_code.clone(),
            technician: input.technician.clone(),
            cost: input.cost,
            notes: input.notes.clone(),
            pregnancy_status: RecordPregnancyStatus::Pending,
            auto_generated: false,
            created_by: input.created_by.clone(),
            created_at: Utc::now(),
        };

        self.record_repo
            .insert(&record)
            .map_err(|e| EngineError::PrimaryWriteFailed(e.to_string()))?;

        info!(
            record_id = %record.record_id,
            breeding_date = %record.breeding_date,
            "配种记录已创建"
        );

        // ===== 镜像写入 1: INSEMINATION 时间线事件 =====
        self.mirror_insemination_event(&record);

        // ===== 镜像写入 2: 妊娠跟踪记录 SUSPECTED =====
        self.mirror_pregnancy_record(&record).await;

        Ok(record)
    }

    /// 追加 INSEMINATION 时间线事件（镜像写入）
    fn mirror_insemination_event(&self, record: &BreedingRecord) {
        let event = BreedingEvent {
            event_id: Uuid::new_v4().to_string(),
            animal_id: record.animal_id.clone(),
            farm_id: record.farm_id.clone(),
            event_type: BreedingEventType::Insemination,
            event_date: record.breeding_date,
            details: Some(EventDetails::Insemination {
                method: record.method,
                sire_code: record.sire_code.clone(),
                technician: record.technician.clone(),
            }),
            notes: record.notes.clone(),
            created_by: record.created_by.clone(),
            created_at: Utc::now(),
        };

        if let Err(e) = self.event_repo.insert(&event) {
            warn!(
                record_id = %record.record_id,
                error = %e,
                "配种时间线事件写入失败，待对账补齐"
            );
        }
    }

    /// 创建 SUSPECTED 妊娠跟踪记录（镜像写入）
    async fn mirror_pregnancy_record(&self, record: &BreedingRecord) {
        // 配置读取失败回落默认妊娠期，不中止
        let gestation_days = match self.config.get_gestation_days(&record.farm_id).await {
            Ok(days) => days,
            Err(e) => {
                warn!(
                    farm_id = %record.farm_id,
                    error = %e,
                    "读取妊娠期配置失败，回落默认值"
                );
                DEFAULT_GESTATION_DAYS
            }
        };

        // 不变式检测: 同一动物最多一条打开的妊娠记录
        match self.pregnancy_repo.find_open_by_animal(&record.animal_id) {
            Ok(open) if !open.is_empty() => {
                warn!(
                    animal_id = %record.animal_id,
                    count = open.len(),
                    "动物已存在打开的妊娠记录，本次仍将新建（不变式由调用方保证）"
                );
            }
            Ok(_) => {}
            Err(e) => {
                warn!(animal_id = %record.animal_id, error = %e, "打开妊娠记录检测失败");
            }
        }

        let now = Utc::now();
        let pregnancy = PregnancyRecord {
            pregnancy_id: Uuid::new_v4().to_string(),
            breeding_record_id: record.record_id.clone(),
            animal_id: record.animal_id.clone(),
            farm_id: record.farm_id.clone(),
            status: PregnancyStatus::Suspected,
            expected_calving_date: Some(
                record.breeding_date + Duration::days(gestation_days as i64),
            ),
            actual_calving_date: None,
            gestation_length_days: None,
            confirmed_date: None,
            exam_method: None,
            examiner: None,
            created_by: record.created_by.clone(),
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.pregnancy_repo.insert(&pregnancy) {
            warn!(
                record_id = %record.record_id,
                error = %e,
                "妊娠跟踪记录写入失败，继续处理"
            );
        }
    }
}
