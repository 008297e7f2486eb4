// ==========================================
// 库存分配优化系统 - 领域模型层
// ==========================================
// 职责: 定义商品/渠道/库存/需求/规则/决策等领域实体与类型
// 红线: 不含文件读写逻辑，不含建模逻辑
// ==========================================

pub mod allocation;
pub mod catalog;
pub mod rules;
pub mod types;

// 重导出核心类型
pub use allocation::{
    total_quantity, AllocationDecision, AllocationInput, AllocationOutcome, AllocationRequest,
    DataQualityGaps,
};
pub use catalog::{aggregate_inventory, Channel, DemandEntry, DemandMap, InventoryRecord, Product};
pub use rules::{
    CoverageDaysRule, OptimizationParameters, OutletAssortmentRule, OutletSkuCapacityRule,
};
pub use types::{AbcClass, ChannelType, NumericField, SolveStatus};
