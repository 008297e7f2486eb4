// ==========================================
// 库存分配优化系统 - 规则注册表
// ==========================================
// 职责: 将规则列表索引为复合键映射，约束生成时 O(1) 查找
// 红线: “规则缺失”(None) 与 “规则值为 0”(Some(0)) 必须区分
//       数值非法 => 规则缺失，绝不视为 0
// ==========================================

use crate::domain::rules::OptimizationParameters;
use crate::domain::types::{AbcClass, NumericField};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

// ==========================================
// 复合键
// ==========================================

/// 覆盖天数键: (渠道, ABC 分类)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoverageKey {
    pub channel_id: String,
    pub abc_class: AbcClass,
}

/// 奥莱 SKU 产能键: (奥莱渠道, division, axis)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutletCapacityKey {
    pub channel_id: String,
    pub division: String,
    pub axis: String,
}

/// 奥莱品类组合键: (métier, sub-axis, brand)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssortmentKey {
    pub metier: String,
    pub sub_axis: String,
    pub brand: String,
}

/// 键字段统一去除首尾空白，与商品属性的读取口径一致
fn key_part(raw: &str) -> String {
    raw.trim().to_string()
}

// ==========================================
// RuleRegistry - 规则注册表
// ==========================================
// 每次求解重建，不做全局缓存
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    coverage: HashMap<CoverageKey, f64>,
    outlet_capacity: HashMap<OutletCapacityKey, f64>,
    assortment: HashMap<AssortmentKey, f64>,
    restricted_brands: HashSet<String>,

    malformed_values: usize,
    duplicate_keys: usize,
}

impl RuleRegistry {
    /// 从参数包构建注册表
    ///
    /// 重复键: 后者覆盖前者（记录告警）
    /// 非法数值: 跳过该规则（记录告警），等价于规则缺失
    pub fn build(params: &OptimizationParameters) -> Self {
        let mut registry = Self::default();

        for rule in &params.coverage_days_rules {
            let key = CoverageKey {
                channel_id: key_part(&rule.channel_id),
                abc_class: rule.abc_class,
            };
            if let Some(days) = registry.accept_value("coverage_days", &rule.coverage_days, &key) {
                if registry.coverage.insert(key.clone(), days).is_some() {
                    registry.note_duplicate("coverage_days", &key);
                }
            }
        }

        for rule in &params.outlet_sku_capacity_rules {
            let key = OutletCapacityKey {
                channel_id: key_part(&rule.channel_id),
                division: key_part(&rule.division),
                axis: key_part(&rule.axis),
            };
            if let Some(max_skus) = registry.accept_value("outlet_max_skus", &rule.max_skus, &key) {
                if registry.outlet_capacity.insert(key.clone(), max_skus).is_some() {
                    registry.note_duplicate("outlet_max_skus", &key);
                }
            }
        }

        for rule in &params.outlet_assortment_rules {
            let key = AssortmentKey {
                metier: key_part(&rule.metier),
                sub_axis: key_part(&rule.sub_axis),
                brand: key_part(&rule.brand),
            };
            if let Some(max_skus) =
                registry.accept_value("assortment_max_skus", &rule.max_skus, &key)
            {
                if registry.assortment.insert(key.clone(), max_skus).is_some() {
                    registry.note_duplicate("assortment_max_skus", &key);
                }
            }
        }

        if let Some(brands) = &params.restricted_brands_for_donation {
            registry.restricted_brands = brands
                .iter()
                .map(|b| key_part(b))
                .filter(|b| !b.is_empty())
                .collect();
        }

        debug!(
            coverage_rules = registry.coverage.len(),
            outlet_capacity_rules = registry.outlet_capacity.len(),
            assortment_rules = registry.assortment.len(),
            restricted_brands = registry.restricted_brands.len(),
            malformed_values = registry.malformed_values,
            "规则注册表构建完成"
        );

        registry
    }

    fn accept_value<K: std::fmt::Debug>(
        &mut self,
        field: &str,
        raw: &NumericField,
        key: &K,
    ) -> Option<f64> {
        let value = raw.non_negative();
        if value.is_none() {
            self.malformed_values += 1;
            warn!(field, raw = %raw, key = ?key, "规则数值非法，按规则缺失处理");
        }
        value
    }

    fn note_duplicate<K: std::fmt::Debug>(&mut self, field: &str, key: &K) {
        self.duplicate_keys += 1;
        warn!(field, key = ?key, "规则键重复，后者覆盖前者");
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 覆盖天数；ABC 分类缺失时无规则
    pub fn coverage_days(&self, channel_id: &str, abc_class: Option<AbcClass>) -> Option<f64> {
        let key = CoverageKey {
            channel_id: key_part(channel_id),
            abc_class: abc_class?,
        };
        self.coverage.get(&key).copied()
    }

    /// 奥莱 (division, axis) 分组的最大 SKU 数
    pub fn outlet_max_skus(&self, channel_id: &str, division: &str, axis: &str) -> Option<f64> {
        let key = OutletCapacityKey {
            channel_id: key_part(channel_id),
            division: key_part(division),
            axis: key_part(axis),
        };
        self.outlet_capacity.get(&key).copied()
    }

    /// 品类组合 (métier, sub-axis, brand) 的最大 SKU 数
    pub fn assortment_max_skus(&self, key: &AssortmentKey) -> Option<f64> {
        self.assortment.get(key).copied()
    }

    pub fn is_brand_restricted(&self, brand: Option<&str>) -> bool {
        brand.is_some_and(|b| self.restricted_brands.contains(b.trim()))
    }

    pub fn has_restricted_brands(&self) -> bool {
        !self.restricted_brands.is_empty()
    }

    pub fn malformed_values(&self) -> usize {
        self.malformed_values
    }

    pub fn duplicate_keys(&self) -> usize {
        self.duplicate_keys
    }
}
