// ==========================================
// 库存分配优化系统 - 分配方案校验
// ==========================================
// 职责: 以决策列表复核供给/产能/覆盖/捐赠/奥莱分组约束
// 说明: 指示变量按 quantity > 0 推断；规则注册表与分组按输入重建
// ==========================================

use crate::domain::allocation::{AllocationDecision, AllocationInput};
use crate::domain::catalog::aggregate_inventory;
use crate::engine::grouping::ProductGroups;
use crate::engine::rule_registry::RuleRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

const DAYS_PER_WEEK: f64 = 7.0;
const CEILING_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    Supply,
    ChannelCapacity,
    CoverageCeiling,
    DonationRestriction,
    OutletSkuCapacity,
    OutletAssortment,
    UnknownReference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanViolation {
    pub kind: ViolationKind,
    pub subject: String,
    pub limit: f64,
    pub actual: f64,
}

impl fmt::Display for PlanViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {} (limit={}, actual={})",
            self.kind, self.subject, self.limit, self.actual
        )
    }
}

// ==========================================
// PlanVerifier - 方案校验器
// ==========================================
pub struct PlanVerifier<'a> {
    input: &'a AllocationInput,
    registry: RuleRegistry,
    groups: ProductGroups,
}

impl<'a> PlanVerifier<'a> {
    pub fn new(input: &'a AllocationInput) -> Self {
        Self {
            input,
            registry: RuleRegistry::build(&input.parameters),
            groups: ProductGroups::build(&input.products),
        }
    }

    /// 校验决策列表，返回全部违规项（空列表即通过）
    pub fn verify(&self, decisions: &[AllocationDecision]) -> Vec<PlanViolation> {
        let mut violations = Vec::new();

        let product_index: HashMap<&str, usize> = self
            .input
            .products
            .iter()
            .enumerate()
            .map(|(i, p)| (p.sku.as_str(), i))
            .collect();
        let channel_index: HashMap<&str, usize> = self
            .input
            .channels
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.as_str(), i))
            .collect();

        // (p, c) → 数量
        let mut quantities: HashMap<(usize, usize), f64> = HashMap::new();
        for d in decisions {
            match (
                product_index.get(d.product_sku.as_str()),
                channel_index.get(d.channel_id.as_str()),
            ) {
                (Some(&p), Some(&c)) => {
                    *quantities.entry((p, c)).or_insert(0.0) += d.quantity as f64;
                }
                _ => violations.push(PlanViolation {
                    kind: ViolationKind::UnknownReference,
                    subject: format!("{}/{}", d.product_sku, d.channel_id),
                    limit: 0.0,
                    actual: d.quantity as f64,
                }),
            }
        }
        let allocated: HashSet<(usize, usize)> = quantities
            .iter()
            .filter(|(_, q)| **q > 0.0)
            .map(|(k, _)| *k)
            .collect();

        self.check_supply(&quantities, &mut violations);
        self.check_channel_capacity(&quantities, &mut violations);
        self.check_coverage(&quantities, &mut violations);
        self.check_donation(&quantities, &mut violations);
        self.check_outlet_groups(&allocated, &mut violations);

        violations
    }

    fn check_supply(&self, quantities: &HashMap<(usize, usize), f64>, out: &mut Vec<PlanViolation>) {
        let totals = aggregate_inventory(&self.input.inventory);
        for (p, product) in self.input.products.iter().enumerate() {
            let sent: f64 = quantities
                .iter()
                .filter(|((pp, _), _)| *pp == p)
                .map(|(_, q)| *q)
                .sum();
            let available = totals.get(&product.sku).copied().unwrap_or(0) as f64;
            if sent > available {
                out.push(PlanViolation {
                    kind: ViolationKind::Supply,
                    subject: product.sku.clone(),
                    limit: available,
                    actual: sent,
                });
            }
        }
    }

    fn check_channel_capacity(
        &self,
        quantities: &HashMap<(usize, usize), f64>,
        out: &mut Vec<PlanViolation>,
    ) {
        for (c, channel) in self.input.channels.iter().enumerate() {
            let Some(capacity) = channel.total_capacity() else {
                continue;
            };
            let received: f64 = quantities
                .iter()
                .filter(|((_, cc), _)| *cc == c)
                .map(|(_, q)| *q)
                .sum();
            if received > capacity + CEILING_EPSILON {
                out.push(PlanViolation {
                    kind: ViolationKind::ChannelCapacity,
                    subject: channel.id.clone(),
                    limit: capacity,
                    actual: received,
                });
            }
        }
    }

    fn check_coverage(&self, quantities: &HashMap<(usize, usize), f64>, out: &mut Vec<PlanViolation>) {
        for (&(p, c), &qty) in quantities {
            let product = &self.input.products[p];
            let channel = &self.input.channels[c];
            let Some(days) = self.registry.coverage_days(&channel.id, product.abc_class) else {
                continue;
            };
            let weekly = self.input.demand.weekly_demand(&product.sku, &channel.id);
            let ceiling = if weekly > 0.0 {
                weekly / DAYS_PER_WEEK * days
            } else {
                0.0
            };
            // 整数决策只能取到上限的整数部分；先容差后取整，51 - 1e-14 仍按 51 计
            if qty > (ceiling + CEILING_EPSILON).floor() {
                out.push(PlanViolation {
                    kind: ViolationKind::CoverageCeiling,
                    subject: format!("{}/{}", product.sku, channel.id),
                    limit: ceiling,
                    actual: qty,
                });
            }
        }
    }

    fn check_donation(&self, quantities: &HashMap<(usize, usize), f64>, out: &mut Vec<PlanViolation>) {
        for (&(p, c), &qty) in quantities {
            let product = &self.input.products[p];
            let channel = &self.input.channels[c];
            if channel.is_donation() && self.registry.is_brand_restricted(product.brand()) && qty > 0.0 {
                out.push(PlanViolation {
                    kind: ViolationKind::DonationRestriction,
                    subject: format!("{}/{}", product.sku, channel.id),
                    limit: 0.0,
                    actual: qty,
                });
            }
        }
    }

    fn check_outlet_groups(&self, allocated: &HashSet<(usize, usize)>, out: &mut Vec<PlanViolation>) {
        for (c, channel) in self.input.channels.iter().enumerate() {
            if !channel.is_outlet() {
                continue;
            }

            for (key, members) in &self.groups.by_capacity_group {
                let Some(max_skus) = self.registry.outlet_max_skus(&channel.id, &key.division, &key.axis)
                else {
                    continue;
                };
                let count = members.iter().filter(|&&p| allocated.contains(&(p, c))).count() as f64;
                if count > max_skus + CEILING_EPSILON {
                    out.push(PlanViolation {
                        kind: ViolationKind::OutletSkuCapacity,
                        subject: format!("{}/{}/{}", channel.id, key.division, key.axis),
                        limit: max_skus,
                        actual: count,
                    });
                }
            }

            for (key, members) in &self.groups.by_assortment_group {
                let Some(max_skus) = self.registry.assortment_max_skus(key) else {
                    continue;
                };
                let count = members.iter().filter(|&&p| allocated.contains(&(p, c))).count() as f64;
                if count > max_skus + CEILING_EPSILON {
                    out.push(PlanViolation {
                        kind: ViolationKind::OutletAssortment,
                        subject: format!("{}/{}/{}/{}", channel.id, key.metier, key.sub_axis, key.brand),
                        limit: max_skus,
                        actual: count,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Channel, DemandEntry, DemandMap, InventoryRecord, Product};
    use crate::domain::rules::{CoverageDaysRule, OptimizationParameters, OutletSkuCapacityRule};
    use crate::domain::types::{AbcClass, ChannelType, NumericField};

    fn input() -> AllocationInput {
        let mut a = Product::new("SKU001");
        a.brand = Some("BrandA".to_string());
        a.division = Some("LLD".to_string());
        a.axis = Some("Fragrance".to_string());
        a.abc_class = Some(AbcClass::A);
        let mut b = a.clone();
        b.sku = "SKU002".to_string();

        let mut store = Channel::new("STORE1", ChannelType::Store);
        store.capacity = Some(NumericField::from(10.0));

        AllocationInput {
            products: vec![a, b],
            channels: vec![
                store,
                Channel::new("OUTLET1", ChannelType::Outlet),
                Channel::new("DONATE1", ChannelType::Donation),
            ],
            inventory: vec![InventoryRecord::new("SKU001", 8), InventoryRecord::new("SKU002", 20)],
            demand: DemandMap::from_entries(&[DemandEntry::new("SKU001", "STORE1", 7.0)]),
            parameters: OptimizationParameters {
                restricted_brands_for_donation: Some(vec!["BrandA".to_string()]),
                coverage_days_rules: vec![CoverageDaysRule::new("STORE1", AbcClass::A, 3.5)],
                outlet_sku_capacity_rules: vec![OutletSkuCapacityRule::new(
                    "OUTLET1", "LLD", "Fragrance", 1u32,
                )],
                outlet_assortment_rules: vec![],
            },
        }
    }

    #[test]
    fn test_clean_plan_passes() {
        let input = input();
        let decisions = vec![
            AllocationDecision::new("SKU001", "STORE1", 3),
            AllocationDecision::new("SKU002", "OUTLET1", 20),
        ];
        assert!(PlanVerifier::new(&input).verify(&decisions).is_empty());
    }

    #[test]
    fn test_detects_each_violation_kind() {
        let input = input();
        let decisions = vec![
            AllocationDecision::new("SKU001", "STORE1", 4), // 覆盖上限 3.5 → 3
            AllocationDecision::new("SKU001", "OUTLET1", 5), // 8 件库存共发 9+
            AllocationDecision::new("SKU002", "OUTLET1", 1), // 奥莱分组上限 1
            AllocationDecision::new("SKU002", "DONATE1", 1), // 限制品牌
            AllocationDecision::new("SKU999", "STORE1", 1),
        ];
        let kinds: HashSet<ViolationKind> = PlanVerifier::new(&input)
            .verify(&decisions)
            .into_iter()
            .map(|v| v.kind)
            .collect();
        assert!(kinds.contains(&ViolationKind::CoverageCeiling));
        assert!(kinds.contains(&ViolationKind::Supply));
        assert!(kinds.contains(&ViolationKind::OutletSkuCapacity));
        assert!(kinds.contains(&ViolationKind::DonationRestriction));
        assert!(kinds.contains(&ViolationKind::UnknownReference));
        assert!(!kinds.contains(&ViolationKind::ChannelCapacity));
    }

    #[test]
    fn test_float_ceiling_just_below_integer() {
        // 17 / 7 × 21 = 50.99999999999999
        let mut input = input();
        input.demand = DemandMap::from_entries(&[DemandEntry::new("SKU002", "STORE1", 17.0)]);
        input.parameters.coverage_days_rules = vec![CoverageDaysRule::new("STORE1", AbcClass::A, 21.0)];
        input.channels[0].capacity = Some(NumericField::from(100.0));
        input.inventory = vec![InventoryRecord::new("SKU002", 80)];

        let verifier = PlanVerifier::new(&input);
        let at_ceiling = vec![AllocationDecision::new("SKU002", "STORE1", 51)];
        assert!(verifier.verify(&at_ceiling).is_empty());

        let over = vec![AllocationDecision::new("SKU002", "STORE1", 52)];
        let violations = verifier.verify(&over);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::CoverageCeiling);
    }
}
