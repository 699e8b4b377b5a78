// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{NaiveDate, Utc};
use dairy_breeding::domain::animal::Animal;
use dairy_breeding::domain::breeding::{BreedingEvent, EventDetails};
use dairy_breeding::domain::types::{
    AnimalGender, AnimalStatus, BreedingEventType, ProductionStatus,
};
use uuid::Uuid;

// ==========================================
// Animal 构建器
// ==========================================

pub struct AnimalBuilder {
    animal_id: String,
    farm_id: String,
    tag_number: Option<String>,
    gender: AnimalGender,
    production_status: ProductionStatus,
    service_date: Option<NaiveDate>,
    expected_calving_date: Option<NaiveDate>,
    days_in_milk: Option<i32>,
    lactation_number: i32,
    current_daily_production_l: Option<f64>,
    dam_id: Option<String>,
}

impl AnimalBuilder {
    pub fn new(animal_id: &str, farm_id: &str) -> Self {
        Self {
            animal_id: animal_id.to_string(),
            farm_id: farm_id.to_string(),
            tag_number: Some(format!("TAG-{}", animal_id)),
            gender: AnimalGender::Female,
            production_status: ProductionStatus::Lactating,
            service_date: None,
            expected_calving_date: None,
            days_in_milk: None,
            lactation_number: 1,
            current_daily_production_l: None,
            dam_id: None,
        }
    }

    pub fn production_status(mut self, status: ProductionStatus) -> Self {
        self.production_status = status;
        self
    }

    pub fn service_date(mut self, date: NaiveDate) -> Self {
        self.service_date = Some(date);
        self
    }

    pub fn expected_calving_date(mut self, date: NaiveDate) -> Self {
        self.expected_calving_date = Some(date);
        self
    }

    pub fn days_in_milk(mut self, days: i32) -> Self {
        self.days_in_milk = Some(days);
        self
    }

    pub fn lactation_number(mut self, n: i32) -> Self {
        self.lactation_number = n;
        self
    }

    pub fn daily_production(mut self, liters: f64) -> Self {
        self.current_daily_production_l = Some(liters);
        self
    }

    pub fn build(self) -> Animal {
        let now = Utc::now();
        Animal {
            animal_id: self.animal_id,
            farm_id: self.farm_id,
            tag_number: self.tag_number,
            name: None,
            gender: self.gender,
            birth_date: None,
            birth_weight_kg: None,
            production_status: self.production_status,
            service_date: self.service_date,
            expected_calving_date: self.expected_calving_date,
            days_in_milk: self.days_in_milk,
            lactation_number: self.lactation_number,
            current_daily_production_l: self.current_daily_production_l,
            status: AnimalStatus::Active,
            source: None,
            dam_id: self.dam_id,
            notes: None,
            created_by: Some("test".to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}

// ==========================================
// BreedingEvent 构建器
// ==========================================

pub struct BreedingEventBuilder {
    animal_id: String,
    farm_id: String,
    event_type: BreedingEventType,
    event_date: NaiveDate,
    details: Option<EventDetails>,
}

impl BreedingEventBuilder {
    pub fn new(animal_id: &str, farm_id: &str, event_type: BreedingEventType) -> Self {
        Self {
            animal_id: animal_id.to_string(),
            farm_id: farm_id.to_string(),
            event_type,
            event_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            details: None,
        }
    }

    pub fn event_date(mut self, date: NaiveDate) -> Self {
        self.event_date = date;
        self
    }

    pub fn details(mut self, details: EventDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn build(self) -> BreedingEvent {
        BreedingEvent {
            event_id: Uuid::new_v4().to_string(),
            animal_id: self.animal_id,
            farm_id: self.farm_id,
            event_type: self.event_type,
            event_date: self.event_date,
            details: self.details,
            notes: None,
            created_by: Some("test".to_string()),
            created_at: Utc::now(),
        }
    }
}
