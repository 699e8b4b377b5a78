// ==========================================
// 奶牛繁育管理系统 - 配种记录对账作业
// ==========================================
// 职责: 扫描牧场内全部 INSEMINATION 时间线事件，为缺失配种
// 记录的事件回填权威记录（auto_generated=true）
// 去重守卫: 动物 + 精确配种日期 已存在记录则跳过
// 红线: 单条失败不中止整个作业，累计错误后继续扫描
// ==========================================

use crate::domain::breeding::{BreedingEvent, BreedingRecord, EventDetails};
use crate::domain::types::{BreedingEventType, BreedingMethod, RecordPregnancyStatus};
use crate::engine::error::EngineResult;
use crate::repository::breeding_event_repo::BreedingEventRepository;
use crate::repository::breeding_record_repo::BreedingRecordRepository;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ReconciliationReport - 对账结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub scanned_count: usize,  // 扫描的配种事件总数
    pub synced_count: usize,   // 本次回填的记录数
    pub errors: Vec<String>,   // 单条失败明细（不中止作业）
}

pub struct ReconciliationJob {
    record_repo: Arc<BreedingRecordRepository>,
    event_repo: Arc<BreedingEventRepository>,
}

impl ReconciliationJob {
    pub fn new(
        record_repo: Arc<BreedingRecordRepository>,
        event_repo: Arc<BreedingEventRepository>,
    ) -> Self {
        Self {
            record_repo,
            event_repo,
        }
    }

    /// 执行牧场对账
    ///
    /// # 参数
    /// - farm_id: 牧场标识
    /// - created_by: 操作人（回填记录的审计归属）
    ///
    /// # 说明
    /// 幂等: 重复执行不会产生重复记录（去重守卫按 动物+日期 匹配）
    #[instrument(skip(self), fields(farm_id = %farm_id))]
    pub async fn run(
        &self,
        farm_id: &str,
        created_by: Option<&str>,
    ) -> EngineResult<ReconciliationReport> {
        let events = self
            .event_repo
            .list_by_farm_and_type(farm_id, BreedingEventType::Insemination)?;

        let mut report = ReconciliationReport {
            scanned_count: events.len(),
            synced_count: 0,
            errors: Vec::new(),
        };

        for event in &events {
            match self.sync_event(event, created_by) {
                Ok(true) => report.synced_count += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        event_id = %event.event_id,
                        animal_id = %event.animal_id,
                        error = %e,
                        "配种事件回填失败，继续扫描"
                    );
                    report
                        .errors
                        .push(format!("event_id={}: {}", event.event_id, e));
                }
            }
        }

        info!(
            farm_id = %farm_id,
            scanned = report.scanned_count,
            synced = report.synced_count,
            errors = report.errors.len(),
            "对账作业完成"
        );

        Ok(report)
    }

    /// 为单条配种事件回填配种记录
    ///
    /// # 返回
    /// - Ok(true): 回填了一条新记录
    /// - Ok(false): 已存在记录，跳过
    fn sync_event(&self, event: &BreedingEvent, created_by: Option<&str>) -> EngineResult<bool> {
        if self
            .record_repo
            .exists_for_animal_on_date(&event.animal_id, event.event_date)?
        {
            return Ok(false);
        }

        // 配种方式/公牛/配种员从事件属性恢复，缺失时回落人工授精
        let (method, sire_code, technician) = match &event.details {
            Some(EventDetails::Insemination {
                method,
                sire_code,
                technician,
            }) => (*method, sire_code.clone(), technician.clone()),
            _ => (BreedingMethod::ArtificialInsemination, None, None),
        };

        let record = BreedingRecord {
            record_id: Uuid::new_v4().to_string(),
            animal_id: event.animal_id.clone(),
            farm_id: event.farm_id.clone(),
            method,
            breeding_date: event.event_date,
            sire_code,
            technician,
            cost: None,
            notes: event.notes.clone(),
            pregnancy_status: RecordPregnancyStatus::Pending,
            auto_generated: true,
            created_by: created_by.map(str::to_string),
            created_at: Utc::now(),
        };

        self.record_repo.insert(&record)?;

        info!(
            record_id = %record.record_id,
            animal_id = %event.animal_id,
            breeding_date = %event.event_date,
            "对账回填配种记录"
        );

        Ok(true)
    }
}
