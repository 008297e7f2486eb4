// ==========================================
// 库存分配优化系统 - MIP 模型中间表示
// ==========================================
// 职责: 与求解器无关的模型（变量 / 目标 / 具名线性约束）
// 变量布局: [数量变量 x(p,c) ... | 指示变量 y(p,c) ...]，下标 p * |C| + c
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 变量句柄（模型内下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    /// 非负整数
    Integer,
    /// 0/1
    Binary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionVariable {
    pub name: String,
    pub kind: VarKind,
    pub lower: f64,
    pub upper: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintSense {
    LessEq,
    Equal,
}

impl fmt::Display for ConstraintSense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintSense::LessEq => write!(f, "<="),
            ConstraintSense::Equal => write!(f, "="),
        }
    }
}

// ==========================================
// ConstraintFamily - 约束族
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConstraintFamily {
    Supply,
    ChannelCapacity,
    OutletSkuCapacity,
    CoverageCeiling,
    DonationRestriction,
    OutletAssortment,
    IndicatorLink,
    IndicatorForcedZero,
}

impl ConstraintFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintFamily::Supply => "supply",
            ConstraintFamily::ChannelCapacity => "channel_capacity",
            ConstraintFamily::OutletSkuCapacity => "outlet_sku_capacity",
            ConstraintFamily::CoverageCeiling => "coverage_ceiling",
            ConstraintFamily::DonationRestriction => "donation_restriction",
            ConstraintFamily::OutletAssortment => "outlet_assortment",
            ConstraintFamily::IndicatorLink => "indicator_link",
            ConstraintFamily::IndicatorForcedZero => "indicator_forced_zero",
        }
    }
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub family: ConstraintFamily,
    pub terms: Vec<(VarId, f64)>,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// 代入变量取值，判断约束是否满足（带容差）
    pub fn is_satisfied_by(&self, value_of: impl Fn(VarId) -> f64, tolerance: f64) -> bool {
        let lhs: f64 = self.terms.iter().map(|(v, coef)| coef * value_of(*v)).sum();
        match self.sense {
            ConstraintSense::LessEq => lhs <= self.rhs + tolerance,
            ConstraintSense::Equal => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

// ==========================================
// ModelStats - 模型规模统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStats {
    pub products: usize,
    pub channels: usize,
    pub integer_variables: usize,
    pub binary_variables: usize,
    pub constraints: usize,
    pub constraints_by_family: BTreeMap<ConstraintFamily, usize>,
}

// ==========================================
// AllocationModel - 分配模型
// ==========================================
#[derive(Debug, Clone)]
pub struct AllocationModel {
    pub name: String,
    pub objective_name: String,
    product_skus: Vec<String>,
    channel_ids: Vec<String>,
    variables: Vec<DecisionVariable>,
    objective: Vec<(VarId, f64)>,
    constraints: Vec<LinearConstraint>,
}

impl AllocationModel {
    /// 创建模型并声明两族变量（每个 (商品, 渠道) 对各一个）
    pub fn new(name: &str, product_skus: Vec<String>, channel_ids: Vec<String>) -> Self {
        let pairs = product_skus.len() * channel_ids.len();
        let mut variables = Vec::with_capacity(pairs * 2);

        for sku in &product_skus {
            for channel in &channel_ids {
                variables.push(DecisionVariable {
                    name: format!("allocation_qty_{}_{}", sku, channel),
                    kind: VarKind::Integer,
                    lower: 0.0,
                    upper: None,
                });
            }
        }
        for sku in &product_skus {
            for channel in &channel_ids {
                variables.push(DecisionVariable {
                    name: format!("is_allocated_{}_{}", sku, channel),
                    kind: VarKind::Binary,
                    lower: 0.0,
                    upper: Some(1.0),
                });
            }
        }

        Self {
            name: name.to_string(),
            objective_name: String::new(),
            product_skus,
            channel_ids,
            variables,
            objective: Vec::new(),
            constraints: Vec::new(),
        }
    }

    // ===== 维度 =====

    pub fn product_count(&self) -> usize {
        self.product_skus.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channel_ids.len()
    }

    pub fn pair_count(&self) -> usize {
        self.product_skus.len() * self.channel_ids.len()
    }

    pub fn product_sku(&self, p: usize) -> &str {
        &self.product_skus[p]
    }

    pub fn channel_id(&self, c: usize) -> &str {
        &self.channel_ids[c]
    }

    // ===== 变量 =====

    pub fn quantity_var(&self, p: usize, c: usize) -> VarId {
        VarId(p * self.channel_ids.len() + c)
    }

    pub fn indicator_var(&self, p: usize, c: usize) -> VarId {
        VarId(self.pair_count() + p * self.channel_ids.len() + c)
    }

    /// 为商品 p 的全部数量变量设置上界（汇总库存即合法上界，可收紧 LP 松弛）
    pub fn set_quantity_upper(&mut self, p: usize, upper: f64) {
        for c in 0..self.channel_ids.len() {
            let id = self.quantity_var(p, c);
            self.variables[id.0].upper = Some(upper);
        }
    }

    pub fn variables(&self) -> &[DecisionVariable] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> &DecisionVariable {
        &self.variables[id.0]
    }

    // ===== 目标 =====

    pub fn set_objective(&mut self, name: &str, terms: Vec<(VarId, f64)>) {
        self.objective_name = name.to_string();
        self.objective = terms;
    }

    pub fn objective(&self) -> &[(VarId, f64)] {
        &self.objective
    }

    // ===== 约束 =====

    pub fn add_constraint(
        &mut self,
        name: String,
        family: ConstraintFamily,
        terms: Vec<(VarId, f64)>,
        sense: ConstraintSense,
        rhs: f64,
    ) {
        self.constraints.push(LinearConstraint {
            name,
            family,
            terms,
            sense,
            rhs,
        });
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn constraints_of(&self, family: ConstraintFamily) -> impl Iterator<Item = &LinearConstraint> {
        self.constraints.iter().filter(move |c| c.family == family)
    }

    pub fn constraint(&self, name: &str) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn stats(&self) -> ModelStats {
        let mut by_family = BTreeMap::new();
        for constraint in &self.constraints {
            *by_family.entry(constraint.family).or_insert(0) += 1;
        }
        ModelStats {
            products: self.product_count(),
            channels: self.channel_count(),
            integer_variables: self
                .variables
                .iter()
                .filter(|v| v.kind == VarKind::Integer)
                .count(),
            binary_variables: self
                .variables
                .iter()
                .filter(|v| v.kind == VarKind::Binary)
                .count(),
            constraints: self.constraints.len(),
            constraints_by_family: by_family,
        }
    }
}
