// ==========================================
// 库存分配优化系统 - 商品/渠道/库存/需求领域模型
// ==========================================
// 职责: 单次求解的只读输入快照
// 红线: 求解期间不可变，不持有跨调用状态
// ==========================================

use crate::domain::types::{AbcClass, ChannelType, NumericField};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// 读取可选属性（空白字符串视为缺失）
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

// ==========================================
// Product - 商品
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    // ===== 主键 =====
    pub sku: String, // 唯一库存键（EAN）

    // ===== 分组属性（均可缺失）=====
    #[serde(default)]
    pub brand: Option<String>, // 品牌/签名
    #[serde(default)]
    pub division: Option<String>, // 事业部 (CPD/LLD/...)
    #[serde(default, alias = "axe")]
    pub axis: Option<String>, // 品类轴
    #[serde(default, alias = "subaxis")]
    pub sub_axis: Option<String>, // 子轴
    #[serde(default)]
    pub metier: Option<String>, // métier（比子轴更细）
    #[serde(default)]
    pub abc_class: Option<AbcClass>,

    // ===== 捐赠 =====
    #[serde(default)]
    pub donation_eligible: bool,

    // ===== 描述信息 =====
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Product {
    pub fn new(sku: &str) -> Self {
        Self {
            sku: sku.to_string(),
            brand: None,
            division: None,
            axis: None,
            sub_axis: None,
            metier: None,
            abc_class: None,
            donation_eligible: false,
            name: None,
            category: None,
        }
    }

    pub fn brand(&self) -> Option<&str> {
        present(&self.brand)
    }

    /// 奥莱产能分组键 (division, axis)，任一缺失返回 None
    pub fn capacity_group_key(&self) -> Option<(&str, &str)> {
        Some((present(&self.division)?, present(&self.axis)?))
    }

    /// 奥莱品类组合分组键 (métier, sub-axis, brand)，任一缺失返回 None
    pub fn assortment_group_key(&self) -> Option<(&str, &str, &str)> {
        Some((
            present(&self.metier)?,
            present(&self.sub_axis)?,
            present(&self.brand)?,
        ))
    }
}

// ==========================================
// Channel - 分配渠道
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub channel_type: ChannelType,

    /// 总件数产能（仅非 outlet 渠道有意义）
    #[serde(default)]
    pub capacity: Option<NumericField>,

    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Channel {
    pub fn new(id: &str, channel_type: ChannelType) -> Self {
        Self {
            id: id.to_string(),
            channel_type,
            capacity: None,
            country: None,
            name: None,
        }
    }

    pub fn is_outlet(&self) -> bool {
        self.channel_type == ChannelType::Outlet
    }

    pub fn is_donation(&self) -> bool {
        self.channel_type == ChannelType::Donation
    }

    /// 有效总量产能
    ///
    /// # 返回
    /// - Some(cap): 非 outlet 渠道且产能可解析为非负数
    /// - None: outlet 渠道 / 产能缺失 / 产能非法（不施加总量约束）
    pub fn total_capacity(&self) -> Option<f64> {
        if self.is_outlet() {
            return None;
        }
        self.capacity.as_ref().and_then(NumericField::non_negative)
    }
}

// ==========================================
// InventoryRecord - 库存记录
// ==========================================
// 同一 SKU 可有多行（不同库存状态/仓位），建模前求和
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub product_sku: String,
    pub quantity: i64,
    #[serde(default)]
    pub status: Option<String>, // excess / obsolete / returned ...
}

impl InventoryRecord {
    pub fn new(product_sku: &str, quantity: i64) -> Self {
        Self {
            product_sku: product_sku.to_string(),
            quantity,
            status: None,
        }
    }
}

/// 按 SKU 汇总库存
///
/// 负数行（应已被边界校验拒绝）按 0 计入。
pub fn aggregate_inventory(records: &[InventoryRecord]) -> HashMap<String, i64> {
    let mut totals: HashMap<String, i64> = HashMap::new();
    for record in records {
        *totals.entry(record.product_sku.clone()).or_insert(0) += record.quantity.max(0);
    }
    totals
}

// ==========================================
// DemandEntry / DemandMap - 周需求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandEntry {
    pub product_sku: String,
    pub channel_id: String,
    /// 周需求件数
    pub demand_quantity: f64,
}

impl DemandEntry {
    pub fn new(product_sku: &str, channel_id: &str, demand_quantity: f64) -> Self {
        Self {
            product_sku: product_sku.to_string(),
            channel_id: channel_id.to_string(),
            demand_quantity,
        }
    }
}

/// (SKU, 渠道) → 周需求；无条目即需求为 0
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemandMap {
    weekly: HashMap<(String, String), f64>,
}

impl DemandMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从需求行构建（重复键后者覆盖前者）
    pub fn from_entries(entries: &[DemandEntry]) -> Self {
        let mut map = Self::new();
        for entry in entries {
            map.insert(&entry.product_sku, &entry.channel_id, entry.demand_quantity);
        }
        map
    }

    /// 写入一条周需求，返回被覆盖的旧值
    pub fn insert(&mut self, product_sku: &str, channel_id: &str, weekly: f64) -> Option<f64> {
        let previous = self
            .weekly
            .insert((product_sku.to_string(), channel_id.to_string()), weekly);
        if let Some(old) = previous {
            warn!(
                product_sku,
                channel_id,
                old_demand = old,
                new_demand = weekly,
                "需求键重复，后者覆盖前者"
            );
        }
        previous
    }

    pub fn weekly_demand(&self, product_sku: &str, channel_id: &str) -> f64 {
        self.weekly
            .get(&(product_sku.to_string(), channel_id.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.weekly.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weekly.is_empty()
    }

    pub fn to_entries(&self) -> Vec<DemandEntry> {
        let mut entries: Vec<DemandEntry> = self
            .weekly
            .iter()
            .map(|((sku, channel), qty)| DemandEntry::new(sku, channel, *qty))
            .collect();
        entries.sort_by(|a, b| {
            (a.product_sku.as_str(), a.channel_id.as_str())
                .cmp(&(b.product_sku.as_str(), b.channel_id.as_str()))
        });
        entries
    }
}
