// ==========================================
// 导入层集成测试
// ==========================================
// 职责: 规则表 + 需求表 → 参数包/需求 → 引擎
// ==========================================

mod helpers;

use helpers::*;
use nw_allocation::domain::{AbcClass, SolveStatus};
use nw_allocation::engine::{AllocationOrchestrator, RuleRegistry};
use nw_allocation::importer::{
    load_demand, load_parameters, validate_request, ImportError, ParameterTablePaths,
};

#[test]
fn test_rule_tables_feed_registry() {
    let coverage = temp_file_with(
        ".csv",
        "Channel ID,abc_class,coverage_days\nSTORE1,A,14\nSTORE1,b,21\nSTORE1,A,28\nSTORE2,C,oops\n",
    );
    let capacity = temp_file_with(
        ".csv",
        "channel_id_string,division,axe,max_skus\nOUTLET1,LLD,Fragrance,3\n",
    );
    let assortment = temp_file_with(
        ".csv",
        "metier,subaxis,brand,max_skus\nLipstick,Lip Makeup,BrandC,1\n",
    );

    let params = load_parameters(
        ParameterTablePaths {
            coverage: Some(coverage.path()),
            outlet_capacity: Some(capacity.path()),
            outlet_assortment: Some(assortment.path()),
        },
        &["BrandB".to_string()],
    )
    .unwrap();

    assert_eq!(params.coverage_days_rules.len(), 4);
    let registry = RuleRegistry::build(&params);
    // 重复键后者覆盖前者
    assert_eq!(registry.coverage_days("STORE1", Some(AbcClass::A)), Some(28.0));
    assert_eq!(registry.coverage_days("STORE1", Some(AbcClass::B)), Some(21.0));
    // 非法值 => 规则缺失
    assert_eq!(registry.coverage_days("STORE2", Some(AbcClass::C)), None);
    assert_eq!(registry.outlet_max_skus("OUTLET1", "LLD", "Fragrance"), Some(3.0));
    assert!(registry.is_brand_restricted(Some("BrandB")));
    assert_eq!(registry.duplicate_keys(), 1);
    assert_eq!(registry.malformed_values(), 1);
}

#[test]
fn test_sellout_table_drives_coverage_ceiling() {
    let sellout = temp_file_with(".csv", "ean,channel_id,weekly_demand\nSKU001,STORE1,7\n");
    let coverage = temp_file_with(".csv", "channel,abc_class,coverage_days\nSTORE1,A,3\n");

    let mut request = ScenarioBuilder::new()
        .product(ProductBuilder::new("SKU001").abc(AbcClass::A).build())
        .channel(store("STORE1", 100.0))
        .inventory("SKU001", 50)
        .build_request();
    request.parameters = load_parameters(
        ParameterTablePaths {
            coverage: Some(coverage.path()),
            ..ParameterTablePaths::default()
        },
        &[],
    )
    .unwrap();
    request.demand = load_demand(sellout.path()).unwrap().to_entries();

    assert!(validate_request(&request).is_empty());

    let outcome = AllocationOrchestrator::default().run(&request.into());
    assert_eq!(outcome.status, SolveStatus::Optimal);
    assert_eq!(quantity_of(&outcome.decisions, "SKU001", "STORE1"), 3);
}

#[test]
fn test_missing_weekly_demand_column_is_reported() {
    let sellout = temp_file_with(".csv", "ean,channel_id,demand\nSKU001,STORE1,7\n");
    let err = load_demand(sellout.path()).unwrap_err();
    assert!(
        matches!(err, ImportError::MissingColumn { ref column, .. } if column == "weekly_demand"),
        "unexpected error: {err}"
    );
}
