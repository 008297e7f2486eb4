// ==========================================
// 库存分配优化系统 - 分配请求/结果领域模型
// ==========================================

use crate::domain::catalog::{Channel, DemandEntry, DemandMap, InventoryRecord, Product};
use crate::domain::rules::OptimizationParameters;
use crate::domain::types::SolveStatus;
use crate::engine::model::ModelStats;
use serde::{Deserialize, Serialize};

// ==========================================
// AllocationRequest - 分配请求（边界输入）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    #[serde(default)]
    pub parameters: OptimizationParameters,
    pub products: Vec<Product>,
    pub channels: Vec<Channel>,
    pub inventory: Vec<InventoryRecord>,
    #[serde(default)]
    pub demand: Vec<DemandEntry>,
}

// ==========================================
// AllocationInput - 单次求解的输入快照
// ==========================================
// 商品顺序/渠道顺序即输出顺序
#[derive(Debug, Clone, Default)]
pub struct AllocationInput {
    pub products: Vec<Product>,
    pub channels: Vec<Channel>,
    pub inventory: Vec<InventoryRecord>,
    pub demand: DemandMap,
    pub parameters: OptimizationParameters,
}

impl From<AllocationRequest> for AllocationInput {
    fn from(request: AllocationRequest) -> Self {
        let demand = DemandMap::from_entries(&request.demand);
        Self {
            products: request.products,
            channels: request.channels,
            inventory: request.inventory,
            demand,
            parameters: request.parameters,
        }
    }
}

// ==========================================
// AllocationDecision - 分配决策（输出）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllocationDecision {
    pub product_sku: String,
    pub channel_id: String,
    pub quantity: u64, // >= 1
}

impl AllocationDecision {
    pub fn new(product_sku: &str, channel_id: &str, quantity: u64) -> Self {
        Self {
            product_sku: product_sku.to_string(),
            channel_id: channel_id.to_string(),
            quantity,
        }
    }
}

/// 决策列表总件数
pub fn total_quantity(decisions: &[AllocationDecision]) -> u64 {
    decisions.iter().map(|d| d.quantity).sum()
}

// ==========================================
// DataQualityGaps - 配置缺口统计
// ==========================================
// 缺口不报错，只是对应约束族不作用于该实体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityGaps {
    pub products_without_capacity_group: usize,
    pub products_without_assortment_group: usize,
    pub products_without_abc_class: usize,
    pub products_without_brand: usize,
    pub channels_without_capacity: usize,
    pub malformed_rule_values: usize,
    pub duplicate_rule_keys: usize,
}

impl DataQualityGaps {
    pub fn total(&self) -> usize {
        self.products_without_capacity_group
            + self.products_without_assortment_group
            + self.products_without_abc_class
            + self.products_without_brand
            + self.channels_without_capacity
            + self.malformed_rule_values
            + self.duplicate_rule_keys
    }
}

// ==========================================
// AllocationOutcome - 单次求解结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub status: SolveStatus,
    /// 仅 Optimal 时非空
    pub decisions: Vec<AllocationDecision>,
    pub stats: ModelStats,
    pub gaps: DataQualityGaps,
}

impl AllocationOutcome {
    pub fn total_quantity(&self) -> u64 {
        total_quantity(&self.decisions)
    }
}
