// ==========================================
// 库存分配优化系统 - 业务规则参数
// ==========================================
// 职责: 覆盖天数 / 奥莱 SKU 产能 / 奥莱品类组合 / 捐赠品牌限制
// 红线: 数值字段保持原始形态，解析失败 => 规则缺失
// ==========================================

use crate::domain::types::{AbcClass, NumericField};
use serde::{Deserialize, Serialize};

// ==========================================
// CoverageDaysRule - 最大覆盖天数
// ==========================================
// (渠道, ABC 分类) → 最大覆盖天数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageDaysRule {
    pub channel_id: String,
    pub abc_class: AbcClass,
    pub coverage_days: NumericField,
}

impl CoverageDaysRule {
    pub fn new(channel_id: &str, abc_class: AbcClass, coverage_days: impl Into<NumericField>) -> Self {
        Self {
            channel_id: channel_id.to_string(),
            abc_class,
            coverage_days: coverage_days.into(),
        }
    }
}

// ==========================================
// OutletSkuCapacityRule - 奥莱 SKU 产能
// ==========================================
// (奥莱渠道, division, axis) → 最大不同 SKU 数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutletSkuCapacityRule {
    pub channel_id: String,
    pub division: String,
    #[serde(alias = "axe")]
    pub axis: String,
    pub max_skus: NumericField,
}

impl OutletSkuCapacityRule {
    pub fn new(
        channel_id: &str,
        division: &str,
        axis: &str,
        max_skus: impl Into<NumericField>,
    ) -> Self {
        Self {
            channel_id: channel_id.to_string(),
            division: division.to_string(),
            axis: axis.to_string(),
            max_skus: max_skus.into(),
        }
    }
}

// ==========================================
// OutletAssortmentRule - 奥莱品类组合上限
// ==========================================
// (métier, sub-axis, brand) → 最大不同 SKU 数；对所有奥莱渠道一视同仁
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutletAssortmentRule {
    pub metier: String,
    #[serde(alias = "subaxis")]
    pub sub_axis: String,
    pub brand: String,
    pub max_skus: NumericField,
}

impl OutletAssortmentRule {
    pub fn new(metier: &str, sub_axis: &str, brand: &str, max_skus: impl Into<NumericField>) -> Self {
        Self {
            metier: metier.to_string(),
            sub_axis: sub_axis.to_string(),
            brand: brand.to_string(),
            max_skus: max_skus.into(),
        }
    }
}

// ==========================================
// OptimizationParameters - 参数包
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationParameters {
    /// 禁止进入捐赠渠道的品牌（签名）
    #[serde(default)]
    pub restricted_brands_for_donation: Option<Vec<String>>,

    #[serde(default)]
    pub coverage_days_rules: Vec<CoverageDaysRule>,

    #[serde(default)]
    pub outlet_sku_capacity_rules: Vec<OutletSkuCapacityRule>,

    #[serde(default)]
    pub outlet_assortment_rules: Vec<OutletAssortmentRule>,
}

impl OptimizationParameters {
    /// 是否配置了非空的捐赠限制品牌列表
    pub fn has_restricted_brands(&self) -> bool {
        self.restricted_brands_for_donation
            .as_ref()
            .is_some_and(|brands| !brands.is_empty())
    }

    /// 三类规则表是否全部为空
    pub fn has_no_rule_tables(&self) -> bool {
        self.coverage_days_rules.is_empty()
            && self.outlet_sku_capacity_rules.is_empty()
            && self.outlet_assortment_rules.is_empty()
    }
}
