// ==========================================
// 库存分配优化系统 - 模型构建器
// ==========================================
// 职责: 声明决策变量、目标函数与全部约束族
// 输入: 商品目录 + 渠道 + 库存 + 周需求 + 规则参数
// 输出: AllocationModel（与求解器无关）
// ==========================================
// 约束族（按规则存在与否独立启用）:
// 1) 供给: Σ_c x(p,c) <= 汇总库存(p)
// 2) 产能: 非奥莱按总件数；奥莱按 (division, axis) 分组 SKU 数
// 3) 覆盖天数上限: x <= 周需求 / 7 × 覆盖天数；需求为 0 则 x = 0
// 4) 捐赠限制: 限制品牌在捐赠渠道 x = 0
// 5) 奥莱品类组合: (métier, sub-axis, brand) 分组 SKU 数
// 6) 指示变量联动 (big-M): x <= 库存(p) × y；库存为 0 则 y = 0
// ==========================================

use crate::domain::allocation::{AllocationInput, DataQualityGaps};
use crate::domain::catalog::{aggregate_inventory, Channel, Product};
use crate::engine::grouping::ProductGroups;
use crate::engine::model::{AllocationModel, ConstraintFamily, ConstraintSense, VarId};
use crate::engine::rule_registry::RuleRegistry;
use tracing::{debug, info, instrument};

pub const MODEL_NAME: &str = "InventoryAllocation";
pub const OBJECTIVE_NAME: &str = "Maximize_Total_Allocation";

const DAYS_PER_WEEK: f64 = 7.0;

// ==========================================
// ModelOptions - 建模选项
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelOptions {
    /// 历史策略: donation_eligible = false 的商品同样禁止进入捐赠渠道
    pub enforce_donation_eligibility: bool,
}

/// 构建结果
#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub model: AllocationModel,
    pub gaps: DataQualityGaps,
}

// ==========================================
// ModelBuilder - 模型构建器
// ==========================================
pub struct ModelBuilder<'a> {
    products: &'a [Product],
    channels: &'a [Channel],
    input: &'a AllocationInput,
    options: ModelOptions,
    registry: RuleRegistry,
    groups: ProductGroups,
    inventory: Vec<i64>, // 按商品下标的汇总库存
    model: AllocationModel,
    gaps: DataQualityGaps,
}

impl<'a> ModelBuilder<'a> {
    /// 构造函数（注册表与分组在此重建，不跨调用复用）
    pub fn new(input: &'a AllocationInput, options: ModelOptions) -> Self {
        let registry = RuleRegistry::build(&input.parameters);
        let groups = ProductGroups::build(&input.products);

        let totals = aggregate_inventory(&input.inventory);
        let inventory: Vec<i64> = input
            .products
            .iter()
            .map(|p| totals.get(&p.sku).copied().unwrap_or(0))
            .collect();

        let mut model = AllocationModel::new(
            MODEL_NAME,
            input.products.iter().map(|p| p.sku.clone()).collect(),
            input.channels.iter().map(|c| c.id.clone()).collect(),
        );
        for (p, total) in inventory.iter().enumerate() {
            model.set_quantity_upper(p, (*total).max(0) as f64);
        }

        let gaps = DataQualityGaps {
            products_without_capacity_group: groups.without_capacity_group,
            products_without_assortment_group: groups.without_assortment_group,
            malformed_rule_values: registry.malformed_values(),
            duplicate_rule_keys: registry.duplicate_keys(),
            ..DataQualityGaps::default()
        };

        Self {
            products: &input.products,
            channels: &input.channels,
            input,
            options,
            registry,
            groups,
            inventory,
            model,
            gaps,
        }
    }

    /// 构建完整模型
    #[instrument(skip(self), fields(
        products = self.products.len(),
        channels = self.channels.len()
    ))]
    pub fn build(mut self) -> BuiltModel {
        self.add_objective();
        self.add_supply_constraints();
        self.add_capacity_constraints();
        self.add_coverage_constraints();
        self.add_donation_constraints();
        self.add_assortment_constraints();
        self.add_linking_constraints();

        let stats = self.model.stats();
        info!(
            variables = stats.integer_variables + stats.binary_variables,
            constraints = stats.constraints,
            gaps = self.gaps.total(),
            "分配模型构建完成"
        );

        BuiltModel {
            model: self.model,
            gaps: self.gaps,
        }
    }

    // ==========================================
    // 目标函数: 最大化总分配件数
    // ==========================================
    fn add_objective(&mut self) {
        let terms = self.all_pairs().map(|(p, c)| (self.model.quantity_var(p, c), 1.0)).collect();
        self.model.set_objective(OBJECTIVE_NAME, terms);
    }

    // ==========================================
    // 1) 供给约束
    // ==========================================
    fn add_supply_constraints(&mut self) {
        for (p, product) in self.products.iter().enumerate() {
            let terms = self.quantity_terms_for_product(p);
            self.model.add_constraint(
                format!("Supply_Product_{}", product.sku),
                ConstraintFamily::Supply,
                terms,
                ConstraintSense::LessEq,
                self.inventory[p] as f64,
            );
        }
    }

    // ==========================================
    // 2) 渠道产能约束
    // ==========================================
    fn add_capacity_constraints(&mut self) {
        for (c, channel) in self.channels.iter().enumerate() {
            if channel.is_outlet() {
                // 奥莱: 每个 (division, axis) 分组的 SKU 数上限；无规则的分组不受约束
                for (key, members) in &self.groups.by_capacity_group {
                    let Some(max_skus) =
                        self.registry.outlet_max_skus(&channel.id, &key.division, &key.axis)
                    else {
                        continue;
                    };
                    let terms = members
                        .iter()
                        .map(|&p| (self.model.indicator_var(p, c), 1.0))
                        .collect();
                    self.model.add_constraint(
                        format!("Outlet_Capacity_SKU_{}_{}_{}", channel.id, key.division, key.axis),
                        ConstraintFamily::OutletSkuCapacity,
                        terms,
                        ConstraintSense::LessEq,
                        max_skus,
                    );
                }
                continue;
            }

            match channel.total_capacity() {
                Some(capacity) => {
                    let terms = (0..self.products.len())
                        .map(|p| (self.model.quantity_var(p, c), 1.0))
                        .collect();
                    self.model.add_constraint(
                        format!("Capacity_Channel_{}", channel.id),
                        ConstraintFamily::ChannelCapacity,
                        terms,
                        ConstraintSense::LessEq,
                        capacity,
                    );
                }
                None => {
                    self.gaps.channels_without_capacity += 1;
                    debug!(channel_id = %channel.id, "渠道产能缺失或非法，不施加总量约束");
                }
            }
        }
    }

    // ==========================================
    // 3) 覆盖天数上限
    // ==========================================
    fn add_coverage_constraints(&mut self) {
        self.gaps.products_without_abc_class =
            self.products.iter().filter(|p| p.abc_class.is_none()).count();

        for (c, channel) in self.channels.iter().enumerate() {
            for (p, product) in self.products.iter().enumerate() {
                let Some(coverage_days) = self.registry.coverage_days(&channel.id, product.abc_class)
                else {
                    continue;
                };

                let x = self.model.quantity_var(p, c);
                let weekly = self.input.demand.weekly_demand(&product.sku, &channel.id);
                if weekly > 0.0 {
                    let ceiling = weekly / DAYS_PER_WEEK * coverage_days;
                    self.model.add_constraint(
                        format!("Max_Coverage_Days_{}_{}", product.sku, channel.id),
                        ConstraintFamily::CoverageCeiling,
                        vec![(x, 1.0)],
                        ConstraintSense::LessEq,
                        ceiling,
                    );
                } else {
                    // 有覆盖规则但无需求信号 => 无补货需求
                    self.model.add_constraint(
                        format!("Max_Coverage_Days_Zero_Demand_{}_{}", product.sku, channel.id),
                        ConstraintFamily::CoverageCeiling,
                        vec![(x, 1.0)],
                        ConstraintSense::LessEq,
                        0.0,
                    );
                }
            }
        }
    }

    // ==========================================
    // 4) 捐赠限制（品牌级）
    // ==========================================
    fn add_donation_constraints(&mut self) {
        self.gaps.products_without_brand =
            self.products.iter().filter(|p| p.brand().is_none()).count();

        let donation_channels: Vec<usize> = self
            .channels
            .iter()
            .enumerate()
            .filter(|(_, ch)| ch.is_donation())
            .map(|(c, _)| c)
            .collect();
        if donation_channels.is_empty() {
            return;
        }

        let brand_rule_active = self.registry.has_restricted_brands();
        for (p, product) in self.products.iter().enumerate() {
            // 无品牌的商品不受品牌限制
            let restricted_brand = product
                .brand()
                .filter(|_| brand_rule_active)
                .filter(|b| self.registry.is_brand_restricted(Some(*b)));

            for &c in &donation_channels {
                let channel_id = &self.channels[c].id;
                let name = if let Some(brand) = restricted_brand {
                    format!("Restricted_Brand_{}_Prod_{}_Chan_{}", brand, product.sku, channel_id)
                } else if self.options.enforce_donation_eligibility && !product.donation_eligible {
                    format!("Donation_Ineligible_Prod_{}_Chan_{}", product.sku, channel_id)
                } else {
                    continue;
                };
                let x = self.model.quantity_var(p, c);
                self.model.add_constraint(
                    name,
                    ConstraintFamily::DonationRestriction,
                    vec![(x, 1.0)],
                    ConstraintSense::Equal,
                    0.0,
                );
            }
        }
    }

    // ==========================================
    // 5) 奥莱品类组合上限（所有奥莱渠道同一规则）
    // ==========================================
    fn add_assortment_constraints(&mut self) {
        for (c, channel) in self.channels.iter().enumerate() {
            if !channel.is_outlet() {
                continue;
            }
            for (key, members) in &self.groups.by_assortment_group {
                let Some(max_skus) = self.registry.assortment_max_skus(key) else {
                    continue;
                };
                let terms = members
                    .iter()
                    .map(|&p| (self.model.indicator_var(p, c), 1.0))
                    .collect();
                self.model.add_constraint(
                    format!(
                        "Outlet_Assortment_{}_{}_{}_{}",
                        channel.id, key.metier, key.sub_axis, key.brand
                    ),
                    ConstraintFamily::OutletAssortment,
                    terms,
                    ConstraintSense::LessEq,
                    max_skus,
                );
            }
        }
    }

    // ==========================================
    // 6) 指示变量联动 (big-M = 商品自身汇总库存)
    // ==========================================
    fn add_linking_constraints(&mut self) {
        for (p, product) in self.products.iter().enumerate() {
            let big_m = self.inventory[p];
            for (c, channel) in self.channels.iter().enumerate() {
                let x = self.model.quantity_var(p, c);
                let y = self.model.indicator_var(p, c);
                if big_m > 0 {
                    self.model.add_constraint(
                        format!("Link_x_y_Prod_{}_Chan_{}", product.sku, channel.id),
                        ConstraintFamily::IndicatorLink,
                        vec![(x, 1.0), (y, -(big_m as f64))],
                        ConstraintSense::LessEq,
                        0.0,
                    );
                } else {
                    self.model.add_constraint(
                        format!("Force_y_zero_Prod_{}_Chan_{}", product.sku, channel.id),
                        ConstraintFamily::IndicatorForcedZero,
                        vec![(y, 1.0)],
                        ConstraintSense::Equal,
                        0.0,
                    );
                }
            }
        }
    }

    // ==========================================
    // 辅助
    // ==========================================

    fn all_pairs(&self) -> impl Iterator<Item = (usize, usize)> {
        let channels = self.channels.len();
        (0..self.products.len()).flat_map(move |p| (0..channels).map(move |c| (p, c)))
    }

    fn quantity_terms_for_product(&self, p: usize) -> Vec<(VarId, f64)> {
        (0..self.channels.len())
            .map(|c| (self.model.quantity_var(p, c), 1.0))
            .collect()
    }
}

/// 便捷入口
pub fn build_allocation_model(input: &AllocationInput, options: ModelOptions) -> BuiltModel {
    ModelBuilder::new(input, options).build()
}
