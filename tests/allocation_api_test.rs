// ==========================================
// 自动分配 API 测试
// ==========================================
// 职责: 校验 → 求解 → 响应 / 导出 的完整链路
// ==========================================

mod helpers;

use helpers::*;
use nw_allocation::api::{AllocationApi, ApiError};
use nw_allocation::config::AllocationConfig;
use nw_allocation::domain::{AllocationRequest, InventoryRecord, SolveStatus};
use nw_allocation::engine::{AllocationModel, SolverBackend, SolverSolution};
use std::sync::Arc;

fn request() -> AllocationRequest {
    ScenarioBuilder::new()
        .product(ProductBuilder::new("SKU001").brand("BrandA").build())
        .product(ProductBuilder::new("SKU002").brand("BrandB").build())
        .channel(store("STORE1", 30.0))
        .channel(donation("DONATE1", 100.0))
        .inventory("SKU001", 25)
        .inventory("SKU002", 40)
        .restricted_brands(&["BrandA"])
        .build_request()
}

struct InfeasibleBackend;

impl SolverBackend for InfeasibleBackend {
    fn name(&self) -> &'static str {
        "infeasible"
    }

    fn solve(&self, model: &AllocationModel) -> SolverSolution {
        SolverSolution::without_values(SolveStatus::Infeasible, model.variables().len())
    }
}

#[tokio::test]
async fn test_auto_allocate_returns_optimal_response() {
    let api = AllocationApi::new(AllocationConfig::default());
    let response = api.auto_allocate(request()).await.unwrap();

    assert_eq!(response.status, SolveStatus::Optimal);
    assert!(response.run_id.starts_with("run_"));
    // SKU001 只能进门店(≤25)，SKU002 进门店剩余 + 捐赠
    assert_eq!(response.total_quantity, 65);
    assert_eq!(quantity_of(&response.allocations, "SKU001", "DONATE1"), 0);
    assert_eq!(response.allocations_created, response.allocations.len());
}

#[tokio::test]
async fn test_zero_inventory_is_success_not_failure() {
    let mut req = request();
    req.inventory.clear();

    let api = AllocationApi::new(AllocationConfig::default());
    let response = api.auto_allocate(req).await.unwrap();

    assert_eq!(response.status, SolveStatus::Optimal);
    assert_eq!(response.allocations_created, 0);
    assert_eq!(response.total_quantity, 0);
}

#[tokio::test]
async fn test_non_optimal_status_is_an_error() {
    let api = AllocationApi::with_backend(AllocationConfig::default(), Arc::new(InfeasibleBackend));
    let err = api.auto_allocate(request()).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::SolveNotOptimal {
            status: SolveStatus::Infeasible
        }
    ));
}

#[tokio::test]
async fn test_invalid_request_collects_violations() {
    let mut req = request();
    req.inventory.push(InventoryRecord::new("SKU404", -5));

    let api = AllocationApi::new(AllocationConfig::default());
    let err = api.auto_allocate(req).await.unwrap_err();
    match err {
        ApiError::ValidationError { violations, .. } => assert_eq!(violations.len(), 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_exports_are_written_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AllocationConfig::default();
    config.solver.time_limit_secs = Some(60);
    config.export.decisions_csv_path = Some(dir.path().join("decisions.csv"));
    config.export.model_summary_path = Some(dir.path().join("model_summary.md"));
    config.export.lp_path = Some(dir.path().join("model.lp"));

    let api = AllocationApi::new(config);
    let response = api.auto_allocate(request()).await.unwrap();

    let csv = std::fs::read_to_string(dir.path().join("decisions.csv")).unwrap();
    assert!(csv.starts_with("product_sku,channel_id,quantity\n"));
    assert_eq!(csv.lines().count(), response.allocations.len() + 1);

    let summary = std::fs::read_to_string(dir.path().join("model_summary.md")).unwrap();
    assert!(summary.contains("Restricted_Brand_BrandA_Prod_SKU001_Chan_DONATE1"));

    let lp = std::fs::read_to_string(dir.path().join("model.lp")).unwrap();
    assert!(lp.contains("Subject To"));
    assert!(lp.contains(" Capacity_Channel_STORE1:"));
}

#[test]
fn test_request_is_completed_from_configured_tables() {
    let coverage = temp_file_with(".csv", "channel,abc_class,coverage_days\nSTORE1,A,7\n");
    let sellout = temp_file_with(".csv", "ean,Channel,weekly_demand\nSKU001,STORE1,2\n");

    let mut config = AllocationConfig::default();
    config.parameter_files.coverage = Some(coverage.path().to_path_buf());
    config.parameter_files.sellout = Some(sellout.path().to_path_buf());
    config.donation.restricted_brands = vec!["BrandZ".to_string()];

    let api = AllocationApi::new(config);

    // 请求自带限制品牌 => 以请求为准
    let completed = api.load_request_from_tables(request()).unwrap();
    assert_eq!(completed.parameters.coverage_days_rules.len(), 1);
    assert_eq!(
        completed.parameters.restricted_brands_for_donation,
        Some(vec!["BrandA".to_string()])
    );
    assert_eq!(completed.demand.len(), 1);

    // 请求未带限制品牌 => 使用配置默认
    let mut bare = request();
    bare.parameters.restricted_brands_for_donation = None;
    let completed = api.load_request_from_tables(bare).unwrap();
    assert_eq!(
        completed.parameters.restricted_brands_for_donation,
        Some(vec!["BrandZ".to_string()])
    );
}
