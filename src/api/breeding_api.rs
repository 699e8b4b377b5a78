// ==========================================
// 奶牛繁育管理系统 - 繁育业务 API
// ==========================================
// 职责: 七个业务操作的对外入口
// - 输入校验（空白标识 → InvalidInput）
// - 委托引擎层执行，错误归一化为 ApiError
// 红线: API 层不直接写库
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::BreedingConfigReader;
use crate::domain::animal::Animal;
use crate::domain::breeding::BreedingRecord;
use crate::domain::types::{
    AnimalGender, BreedingEventType, BreedingMethod, CalvingOutcome, PregnancyCheckResult,
};
use crate::engine::calving::{CalvingHandler, CalvingInput, CalvingOutcomeSummary};
use crate::engine::insemination::{InseminationHandler, InseminationOutcome};
use crate::engine::lactation::{compute_days_in_milk, compute_dry_off_status, DryOffStatus};
use crate::engine::orchestrator::{BreedingRecordOrchestrator, CreateBreedingRecordInput};
use crate::engine::pregnancy_check::{
    PregnancyCheckHandler, PregnancyCheckInput, PregnancyCheckOutcome,
};
use crate::engine::reconciliation::{ReconciliationJob, ReconciliationReport};
use crate::repository::animal_repo::AnimalRepository;
use crate::repository::breeding_event_repo::BreedingEventRepository;
use crate::repository::breeding_record_repo::BreedingRecordRepository;
use crate::repository::pregnancy_repo::PregnancyRecordRepository;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::instrument;

// ==========================================
// 请求结构
// ==========================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBreedingRecordRequest {
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

#[derive(Debug, Clone, Deserialize)]
pub struct PregnancyCheckRequest {
    pub animal_id: String,
    pub farm_id: String,
    pub check_date: NaiveDate,
    pub result: PregnancyCheckResult,
    pub exam_method: Option<String>,
    pub examiner: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalvingRequest {
    pub breeding_record_id: String,
    pub farm_id: String,
    pub calving_date: NaiveDate,
    pub outcome: CalvingOutcome,
    pub create_calf: bool,
    pub calf_tag: Option<String>,
    pub calf_gender: Option<AnimalGender>,
    pub calf_weight_kg: Option<f64>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

// ==========================================
// LactationSummary - 泌乳概要
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct LactationSummary {
    pub days_in_milk: i32,                        // 泌乳天数（缓存优先口径）
    pub lactation_number: i32,                    // 当前胎次
    pub current_daily_production_l: Option<f64>,  // 当前日产量（只读透出）
    pub latest_calving_date: Option<NaiveDate>,   // 最近一次产犊日期
}

// ==========================================
// BreedingApi - 繁育业务接口
// ==========================================
pub struct BreedingApi<C: BreedingConfigReader> {
    animal_repo: Arc<AnimalRepository>,
    event_repo: Arc<BreedingEventRepository>,
    orchestrator: BreedingRecordOrchestrator<C>,
    insemination: InseminationHandler<C>,
    pregnancy_check: PregnancyCheckHandler<C>,
    calving: CalvingHandler,
    reconciliation: ReconciliationJob,
    config: Arc<C>,
}

impl<C: BreedingConfigReader> BreedingApi<C> {
    /// 打开数据库并初始化表结构后装配 API
    pub fn new(db_path: &str, config: Arc<C>) -> ApiResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        crate::db::ensure_schema(&conn)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn)), config))
    }

    /// 从共享连接装配 API（全部仓储复用同一连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>, config: Arc<C>) -> Self {
        let animal_repo = Arc::new(AnimalRepository::from_connection(conn.clone()));
        let record_repo = Arc::new(BreedingRecordRepository::from_connection(conn.clone()));
        let event_repo = Arc::new(BreedingEventRepository::from_connection(conn.clone()));
        let pregnancy_repo = Arc::new(PregnancyRecordRepository::from_connection(conn));

        let orchestrator = BreedingRecordOrchestrator::new(
            animal_repo.clone(),
            record_repo.clone(),
            event_repo.clone(),
            pregnancy_repo.clone(),
            config.clone(),
        );
        let insemination = InseminationHandler::new(animal_repo.clone(), config.clone());
        let pregnancy_check = PregnancyCheckHandler::new(
            animal_repo.clone(),
            event_repo.clone(),
            pregnancy_repo.clone(),
            config.clone(),
        );
        let calving = CalvingHandler::new(
            animal_repo.clone(),
            record_repo.clone(),
            event_repo.clone(),
            pregnancy_repo.clone(),
        );
        let reconciliation = ReconciliationJob::new(record_repo, event_repo.clone());

        Self {
            animal_repo,
            event_repo,
            orchestrator,
            insemination,
            pregnancy_check,
            calving,
            reconciliation,
            config,
        }
    }

    // ==========================================
    // 输入校验
    // ==========================================

    fn require_non_blank(field: &str, value: &str) -> ApiResult<()> {
        if value.trim().is_empty() {
            return Err(ApiError::InvalidInput(format!("{} 不能为空", field)));
        }
        Ok(())
    }

    fn find_animal(&self, animal_id: &str, farm_id: &str) -> ApiResult<Animal> {
        self.animal_repo
            .find_in_farm(animal_id, farm_id)?
            .ok_or_else(|| ApiError::NotFound {
                entity: "动物".to_string(),
                id: animal_id.to_string(),
            })
    }

    // ==========================================
    // 业务操作
    // ==========================================

    /// 创建配种记录（主记录 + 镜像时间线 + 镜像妊娠记录）
    #[instrument(skip(self, request))]
    pub async fn create_breeding_record(
        &self,
        request: CreateBreedingRecordRequest,
    ) -> ApiResult<BreedingRecord> {
        Self::require_non_blank("animal_id", &request.animal_id)?;
        Self::require_non_blank("farm_id", &request.farm_id)?;

        let record = self
            .orchestrator
            .create(CreateBreedingRecordInput {
                animal_id: request.animal_id,
                farm_id: request.farm_id,
                method: request.method,
                breeding_date: request.breeding_date,
                sire_code: request.sire_code,
                technician: request.technician,
                cost: request.cost,
                notes: request.notes,
                created_by: request.created_by,
            })
            .await?;

        Ok(record)
    }

    /// 配种事件状态转换（非 SERVED → SERVED）
    #[instrument(skip(self))]
    pub async fn record_insemination(
        &self,
        animal_id: &str,
        farm_id: &str,
        service_date: NaiveDate,
        created_by: Option<String>,
    ) -> ApiResult<InseminationOutcome> {
        Self::require_non_blank("animal_id", animal_id)?;
        Self::require_non_blank("farm_id", farm_id)?;

        let outcome = self
            .insemination
            .handle(animal_id, farm_id, service_date, created_by.as_deref())
            .await?;
        Ok(outcome)
    }

    /// 妊娠检查（阳性确认 / 阴性回退 / 待定审计）
    #[instrument(skip(self, request))]
    pub async fn record_pregnancy_check(
        &self,
        request: PregnancyCheckRequest,
    ) -> ApiResult<PregnancyCheckOutcome> {
        Self::require_non_blank("animal_id", &request.animal_id)?;
        Self::require_non_blank("farm_id", &request.farm_id)?;

        let outcome = self
            .pregnancy_check
            .handle(PregnancyCheckInput {
                animal_id: request.animal_id,
                farm_id: request.farm_id,
                check_date: request.check_date,
                result: request.result,
                exam_method: request.exam_method,
                examiner: request.examiner,
                notes: request.notes,
                created_by: request.created_by,
            })
            .await?;

        Ok(outcome)
    }

    /// 产犊（妊娠收口 + 时间线 + 可选犊牛建档 + 母牛刷新）
    #[instrument(skip(self, request))]
    pub async fn record_calving(&self, request: CalvingRequest) -> ApiResult<CalvingOutcomeSummary> {
        Self::require_non_blank("breeding_record_id", &request.breeding_record_id)?;
        Self::require_non_blank("farm_id", &request.farm_id)?;

        let summary = self
            .calving
            .handle(CalvingInput {
                breeding_record_id: request.breeding_record_id,
                farm_id: request.farm_id,
                calving_date: request.calving_date,
                outcome: request.outcome,
                create_calf: request.create_calf,
                calf_tag: request.calf_tag,
                calf_gender: request.calf_gender,
                calf_weight_kg: request.calf_weight_kg,
                notes: request.notes,
                created_by: request.created_by,
            })
            .await?;

        Ok(summary)
    }

    /// 干奶判定（只读派生，不修改状态）
    #[instrument(skip(self))]
    pub async fn get_dry_off_status(
        &self,
        animal_id: &str,
        farm_id: &str,
    ) -> ApiResult<DryOffStatus> {
        Self::require_non_blank("animal_id", animal_id)?;
        Self::require_non_blank("farm_id", farm_id)?;

        let animal = self.find_animal(animal_id, farm_id)?;
        let threshold_days = self
            .config
            .get_dryoff_threshold_days(farm_id)
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let today = Utc::now().date_naive();
        Ok(compute_dry_off_status(&animal, threshold_days, today))
    }

    /// 泌乳概要（只读派生: 缓存优先，缺失时从最近产犊事件重算）
    #[instrument(skip(self))]
    pub async fn get_lactation_summary(
        &self,
        animal_id: &str,
        farm_id: &str,
    ) -> ApiResult<LactationSummary> {
        Self::require_non_blank("animal_id", animal_id)?;
        Self::require_non_blank("farm_id", farm_id)?;

        let animal = self.find_animal(animal_id, farm_id)?;
        let latest_calving_date = self
            .event_repo
            .find_latest_by_type(animal_id, BreedingEventType::Calving)?
            .map(|event| event.event_date);

        let today = Utc::now().date_naive();
        let days_in_milk = compute_days_in_milk(&animal, latest_calving_date, today);

        Ok(LactationSummary {
            days_in_milk,
            lactation_number: animal.lactation_number,
            current_daily_production_l: animal.current_daily_production_l,
            latest_calving_date,
        })
    }

    /// 对账: 为缺失配种记录的 INSEMINATION 事件回填记录
    #[instrument(skip(self))]
    pub async fn reconcile_breeding_records(
        &self,
        farm_id: &str,
        created_by: Option<String>,
    ) -> ApiResult<ReconciliationReport> {
        Self::require_non_blank("farm_id", farm_id)?;

        let report = self
            .reconciliation
            .run(farm_id, created_by.as_deref())
            .await?;
        Ok(report)
    }
}
