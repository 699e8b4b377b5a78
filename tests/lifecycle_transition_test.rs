// ==========================================
// 生命周期状态转换 集成测试
// ==========================================
// 测试范围:
// 1. 配种: 非 SERVED → SERVED（含幂等守卫）
// 2. 妊检: 阳性确认 / 阴性回退 / 待定审计
// 3. 产犊: 妊娠收口、母牛刷新、犊牛建档
// ==========================================

mod helpers;

use chrono::NaiveDate;
use dairy_breeding::api::breeding_api::{
    CalvingRequest, CreateBreedingRecordRequest, PregnancyCheckRequest,
};
use dairy_breeding::api::ApiError;
use dairy_breeding::domain::types::{
    AnimalGender, AnimalStatus, BreedingEventType, BreedingMethod, CalvingOutcome,
    PregnancyCheckResult, PregnancyStatus, ProductionStatus,
};
use helpers::api_test_helper::ApiTestEnv;
use helpers::test_data_builder::AnimalBuilder;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn check_request(
    animal_id: &str,
    check_date: NaiveDate,
    result: PregnancyCheckResult,
) -> PregnancyCheckRequest {
    PregnancyCheckRequest {
        animal_id: animal_id.to_string(),
        farm_id: "FARM-A".to_string(),
        check_date,
        result,
        exam_method: Some("B超".to_string()),
        examiner: Some("李兽医".to_string()),
        notes: None,
        created_by: Some("test".to_string()),
    }
}

/// 完整铺垫: 泌乳牛 + 配种记录 + SERVED 状态
async fn setup_served_cow(env: &ApiTestEnv, animal_id: &str) -> String {
    env.animal_repo
        .insert(
            &AnimalBuilder::new(animal_id, "FARM-A")
                .production_status(ProductionStatus::Lactating)
                .days_in_milk(150)
                .lactation_number(2)
                .build(),
        )
        .expect("插入动物失败");

    let record = env
        .api
        .create_breeding_record(CreateBreedingRecordRequest {
            animal_id: animal_id.to_string(),
            farm_id: "FARM-A".to_string(),
            method: BreedingMethod::ArtificialInsemination,
            breeding_date: date(2024, 1, 1),
            sire_code: Some("SIRE-001".to_string()),
            technician: None,
            cost: None,
            notes: None,
            created_by: Some("test".to_string()),
        })
        .await
        .expect("创建配种记录失败");

    env.api
        .record_insemination(animal_id, "FARM-A", date(2024, 1, 1), Some("test".to_string()))
        .await
        .expect("配种转换失败");

    record.record_id
}

// ==========================================
// 配种转换
// ==========================================

#[tokio::test]
async fn test_配种_泌乳牛转SERVED() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.animal_repo
        .insert(
            &AnimalBuilder::new("COW-001", "FARM-A")
                .production_status(ProductionStatus::Lactating)
                .days_in_milk(150)
                .build(),
        )
        .expect("插入动物失败");

    let outcome = env
        .api
        .record_insemination("COW-001", "FARM-A", date(2024, 1, 1), Some("test".to_string()))
        .await
        .expect("配种转换失败");

    assert!(outcome.applied);
    assert_eq!(outcome.expected_calving_date, Some(date(2024, 10, 7)));

    let animal = env
        .animal_repo
        .find_by_id("COW-001")
        .expect("查询失败")
        .expect("动物应存在");
    assert_eq!(animal.production_status, ProductionStatus::Served);
    assert_eq!(animal.service_date, Some(date(2024, 1, 1)));
    assert_eq!(animal.expected_calving_date, Some(date(2024, 10, 7)));
    assert_eq!(animal.days_in_milk, None, "配种后 days_in_milk 应清空");
}

#[tokio::test]
async fn test_配种_重复事件幂等跳过() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.animal_repo
        .insert(&AnimalBuilder::new("COW-001", "FARM-A").build())
        .expect("插入动物失败");

    env.api
        .record_insemination("COW-001", "FARM-A", date(2024, 1, 1), None)
        .await
        .expect("第一次配种失败");

    let second = env
        .api
        .record_insemination("COW-001", "FARM-A", date(2024, 1, 15), None)
        .await
        .expect("第二次配种不应报错");

    assert!(!second.applied, "重复配种事件应幂等跳过");

    // service_date 保持第一次的值
    let animal = env
        .animal_repo
        .find_by_id("COW-001")
        .expect("查询失败")
        .expect("动物应存在");
    assert_eq!(animal.service_date, Some(date(2024, 1, 1)));
}

// ==========================================
// 妊娠检查
// ==========================================

#[tokio::test]
async fn test_妊检阳性_确认妊娠且状态不变() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let record_id = setup_served_cow(&env, "COW-001").await;

    let outcome = env
        .api
        .record_pregnancy_check(check_request(
            "COW-001",
            date(2024, 2, 15),
            PregnancyCheckResult::Confirmed,
        ))
        .await
        .expect("妊检失败");

    assert!(!outcome.status_changed, "阳性妊检不改变生产状态");
    assert_eq!(outcome.expected_calving_date, Some(date(2024, 10, 7)));

    let animal = env
        .animal_repo
        .find_by_id("COW-001")
        .expect("查询失败")
        .expect("动物应存在");
    assert_eq!(animal.production_status, ProductionStatus::Served);

    // 妊娠记录已确认
    let pregnancy = env
        .pregnancy_repo
        .find_by_breeding_record(&record_id)
        .expect("查询失败")
        .expect("妊娠记录应存在");
    assert_eq!(pregnancy.status, PregnancyStatus::Confirmed);
    assert_eq!(pregnancy.confirmed_date, Some(date(2024, 2, 15)));
    assert_eq!(pregnancy.examiner.as_deref(), Some("李兽医"));

    // 时间线追加了妊检事件
    let event = env
        .event_repo
        .find_latest_by_type("COW-001", BreedingEventType::PregnancyCheck)
        .expect("查询失败")
        .expect("妊检事件应已落库");
    assert_eq!(event.event_date, date(2024, 2, 15));
}

#[tokio::test]
async fn test_妊检阴性_回退泌乳并置FALSE() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let record_id = setup_served_cow(&env, "COW-001").await;

    let outcome = env
        .api
        .record_pregnancy_check(check_request(
            "COW-001",
            date(2024, 2, 15),
            PregnancyCheckResult::Negative,
        ))
        .await
        .expect("妊检失败");

    assert!(outcome.status_changed, "阴性妊检应回退生产状态");

    let animal = env
        .animal_repo
        .find_by_id("COW-001")
        .expect("查询失败")
        .expect("动物应存在");
    assert_eq!(animal.production_status, ProductionStatus::Lactating);
    assert_eq!(animal.service_date, None, "回退后 service_date 应清空");
    assert_eq!(animal.expected_calving_date, None);

    let pregnancy = env
        .pregnancy_repo
        .find_by_breeding_record(&record_id)
        .expect("查询失败")
        .expect("妊娠记录应存在");
    assert_eq!(pregnancy.status, PregnancyStatus::NotPregnant);
}

#[tokio::test]
async fn test_妊检阴性_重放幂等() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    setup_served_cow(&env, "COW-001").await;

    env.api
        .record_pregnancy_check(check_request(
            "COW-001",
            date(2024, 2, 15),
            PregnancyCheckResult::Negative,
        ))
        .await
        .expect("第一次妊检失败");

    let second = env
        .api
        .record_pregnancy_check(check_request(
            "COW-001",
            date(2024, 2, 16),
            PregnancyCheckResult::Negative,
        ))
        .await
        .expect("重放不应报错");

    assert!(!second.status_changed, "动物已非 SERVED，重放应跳过");
}

#[tokio::test]
async fn test_妊检待定_仅追加时间线() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    setup_served_cow(&env, "COW-001").await;

    let outcome = env
        .api
        .record_pregnancy_check(check_request(
            "COW-001",
            date(2024, 2, 15),
            PregnancyCheckResult::Pending,
        ))
        .await
        .expect("妊检失败");

    assert!(!outcome.status_changed);

    let animal = env
        .animal_repo
        .find_by_id("COW-001")
        .expect("查询失败")
        .expect("动物应存在");
    assert_eq!(animal.production_status, ProductionStatus::Served);

    // 审计事件仍然追加
    assert!(env
        .event_repo
        .find_latest_by_type("COW-001", BreedingEventType::PregnancyCheck)
        .expect("查询失败")
        .is_some());
}

// ==========================================
// 产犊
// ==========================================

#[tokio::test]
async fn test_产犊_收口刷新并建档犊牛() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let record_id = setup_served_cow(&env, "COW-001").await;

    env.api
        .record_pregnancy_check(check_request(
            "COW-001",
            date(2024, 2, 15),
            PregnancyCheckResult::Confirmed,
        ))
        .await
        .expect("妊检失败");

    let summary = env
        .api
        .record_calving(CalvingRequest {
            breeding_record_id: record_id.clone(),
            farm_id: "FARM-A".to_string(),
            calving_date: date(2024, 10, 5),
            outcome: CalvingOutcome::Normal,
            create_calf: true,
            calf_tag: Some("CALF-2024-001".to_string()),
            calf_gender: None,
            calf_weight_kg: Some(38.5),
            notes: None,
            created_by: Some("test".to_string()),
        })
        .await
        .expect("产犊处理失败");

    // 实际妊娠期 = 产犊日 - 配种日
    assert!(summary.applied);
    assert_eq!(summary.gestation_length_days, 278);
    assert_eq!(summary.dam_lactation_number, 3);

    // 妊娠记录收口
    let pregnancy = env
        .pregnancy_repo
        .find_by_breeding_record(&record_id)
        .expect("查询失败")
        .expect("妊娠记录应存在");
    assert_eq!(pregnancy.status, PregnancyStatus::Completed);
    assert_eq!(pregnancy.actual_calving_date, Some(date(2024, 10, 5)));
    assert_eq!(pregnancy.gestation_length_days, Some(278));

    // 母牛刷新: LACTATING、胎次 2→3、days_in_milk 归零
    let dam = env
        .animal_repo
        .find_by_id("COW-001")
        .expect("查询失败")
        .expect("母牛应存在");
    assert_eq!(dam.production_status, ProductionStatus::Lactating);
    assert_eq!(dam.lactation_number, 3);
    assert_eq!(dam.days_in_milk, Some(0));
    assert_eq!(dam.service_date, None);
    assert_eq!(dam.expected_calving_date, None);

    // 犊牛建档: 默认母犊、来源 BORN、指回母牛
    let calf_id = summary.calf_animal_id.expect("犊牛应已建档");
    let calf = env
        .animal_repo
        .find_by_id(&calf_id)
        .expect("查询失败")
        .expect("犊牛应存在");
    assert_eq!(calf.production_status, ProductionStatus::Calf);
    assert_eq!(calf.gender, AnimalGender::Female);
    assert_eq!(calf.status, AnimalStatus::Active);
    assert_eq!(calf.source.as_deref(), Some("BORN"));
    assert_eq!(calf.dam_id.as_deref(), Some("COW-001"));
    assert_eq!(calf.birth_date, Some(date(2024, 10, 5)));
    assert_eq!(calf.birth_weight_kg, Some(38.5));
    assert_eq!(calf.tag_number.as_deref(), Some("CALF-2024-001"));

    // 时间线追加了 CALVING 事件
    assert!(env
        .event_repo
        .find_latest_by_type("COW-001", BreedingEventType::Calving)
        .expect("查询失败")
        .is_some());
}

#[tokio::test]
async fn test_产犊_不建档犊牛() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let record_id = setup_served_cow(&env, "COW-001").await;

    let summary = env
        .api
        .record_calving(CalvingRequest {
            breeding_record_id: record_id,
            farm_id: "FARM-A".to_string(),
            calving_date: date(2024, 10, 5),
            outcome: CalvingOutcome::Stillborn,
            create_calf: false,
            calf_tag: None,
            calf_gender: None,
            calf_weight_kg: None,
            notes: None,
            created_by: None,
        })
        .await
        .expect("产犊处理失败");

    assert!(summary.applied);
    assert!(summary.calf_animal_id.is_none());

    // 母牛仍然刷新
    let dam = env
        .animal_repo
        .find_by_id("COW-001")
        .expect("查询失败")
        .expect("母牛应存在");
    assert_eq!(dam.production_status, ProductionStatus::Lactating);
    assert_eq!(dam.lactation_number, 3);
}

#[tokio::test]
async fn test_产犊_重复事件幂等跳过() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let record_id = setup_served_cow(&env, "COW-001").await;

    let request = CalvingRequest {
        breeding_record_id: record_id.clone(),
        farm_id: "FARM-A".to_string(),
        calving_date: date(2024, 10, 5),
        outcome: CalvingOutcome::Normal,
        create_calf: false,
        calf_tag: None,
        calf_gender: None,
        calf_weight_kg: None,
        notes: None,
        created_by: Some("test".to_string()),
    };

    let first = env
        .api
        .record_calving(request.clone())
        .await
        .expect("第一次产犊失败");
    assert!(first.applied);
    assert_eq!(first.dam_lactation_number, 3);

    // 同一配种记录的重复产犊事件: 跳过，不再收口/建事件/刷新
    let second = env
        .api
        .record_calving(request)
        .await
        .expect("重复产犊不应报错");
    assert!(!second.applied, "妊娠记录已收口，重放应跳过");
    assert_eq!(second.dam_lactation_number, 3, "重放不得再次自增胎次");

    // 胎次只自增一次
    let dam = env
        .animal_repo
        .find_by_id("COW-001")
        .expect("查询失败")
        .expect("母牛应存在");
    assert_eq!(dam.lactation_number, 3);

    // 时间线只有一条 CALVING 事件
    let calving_events: Vec<_> = env
        .event_repo
        .list_by_animal("COW-001")
        .expect("查询失败")
        .into_iter()
        .filter(|e| e.event_type == BreedingEventType::Calving)
        .collect();
    assert_eq!(calving_events.len(), 1, "重放不得追加第二条产犊事件");

    // 妊娠记录保持首次收口的内容
    let pregnancy = env
        .pregnancy_repo
        .find_by_breeding_record(&record_id)
        .expect("查询失败")
        .expect("妊娠记录应存在");
    assert_eq!(pregnancy.status, PregnancyStatus::Completed);
    assert_eq!(pregnancy.actual_calving_date, Some(date(2024, 10, 5)));
}

#[tokio::test]
async fn test_产犊_配种记录不存在() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let result = env
        .api
        .record_calving(CalvingRequest {
            breeding_record_id: "MISSING".to_string(),
            farm_id: "FARM-A".to_string(),
            calving_date: date(2024, 10, 5),
            outcome: CalvingOutcome::Normal,
            create_calf: false,
            calf_tag: None,
            calf_gender: None,
            calf_weight_kg: None,
            notes: None,
            created_by: None,
        })
        .await;

    assert!(matches!(result, Err(ApiError::NotFound { .. })));
}
