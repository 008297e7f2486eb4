// ==========================================
// 库存分配优化系统 - 请求边界校验
// ==========================================
// 职责: 进入引擎前的结构性校验（主键/引用/数值范围/规则标识）
// 红线: 收集全部违规项一次性返回，不在首个错误处中断
// ==========================================

use crate::domain::allocation::AllocationRequest;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 校验违规详情
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestViolation {
    /// 所在分区（products / channels / inventory / demand / parameters.*）
    pub section: String,
    /// 分区内下标（从 0 开始）
    pub row: usize,
    pub field: String,
    pub message: String,
}

impl fmt::Display for RequestViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}].{}: {}", self.section, self.row, self.field, self.message)
    }
}

struct Collector {
    violations: Vec<RequestViolation>,
}

impl Collector {
    fn push(&mut self, section: &str, row: usize, field: &str, message: impl Into<String>) {
        self.violations.push(RequestViolation {
            section: section.to_string(),
            row,
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn require_non_empty(&mut self, section: &str, row: usize, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(section, row, field, "不能为空");
        }
    }
}

/// 校验分配请求
///
/// # 返回
/// 全部违规项；空列表表示通过
pub fn validate_request(request: &AllocationRequest) -> Vec<RequestViolation> {
    let mut c = Collector {
        violations: Vec::new(),
    };

    // ===== 商品 =====
    let mut skus = HashSet::new();
    for (i, product) in request.products.iter().enumerate() {
        c.require_non_empty("products", i, "sku", &product.sku);
        if !product.sku.trim().is_empty() && !skus.insert(product.sku.as_str()) {
            c.push("products", i, "sku", format!("SKU 重复: {}", product.sku));
        }
    }

    // ===== 渠道 =====
    let mut channel_ids = HashSet::new();
    for (i, channel) in request.channels.iter().enumerate() {
        c.require_non_empty("channels", i, "id", &channel.id);
        if !channel.id.trim().is_empty() && !channel_ids.insert(channel.id.as_str()) {
            c.push("channels", i, "id", format!("渠道 ID 重复: {}", channel.id));
        }
    }

    // ===== 库存 =====
    for (i, record) in request.inventory.iter().enumerate() {
        if !skus.contains(record.product_sku.as_str()) {
            c.push(
                "inventory",
                i,
                "product_sku",
                format!("引用了未知商品: {}", record.product_sku),
            );
        }
        if record.quantity < 0 {
            c.push("inventory", i, "quantity", format!("库存不能为负: {}", record.quantity));
        }
    }

    // ===== 需求 =====
    for (i, entry) in request.demand.iter().enumerate() {
        if !skus.contains(entry.product_sku.as_str()) {
            c.push("demand", i, "product_sku", format!("引用了未知商品: {}", entry.product_sku));
        }
        if !channel_ids.contains(entry.channel_id.as_str()) {
            c.push("demand", i, "channel_id", format!("引用了未知渠道: {}", entry.channel_id));
        }
        if !entry.demand_quantity.is_finite() || entry.demand_quantity < 0.0 {
            c.push(
                "demand",
                i,
                "demand_quantity",
                format!("周需求必须为非负有限数: {}", entry.demand_quantity),
            );
        }
    }

    // ===== 规则标识 =====
    let params = &request.parameters;
    for (i, rule) in params.coverage_days_rules.iter().enumerate() {
        c.require_non_empty("parameters.coverage_days_rules", i, "channel_id", &rule.channel_id);
    }
    for (i, rule) in params.outlet_sku_capacity_rules.iter().enumerate() {
        let section = "parameters.outlet_sku_capacity_rules";
        c.require_non_empty(section, i, "channel_id", &rule.channel_id);
        c.require_non_empty(section, i, "division", &rule.division);
        c.require_non_empty(section, i, "axis", &rule.axis);
    }
    for (i, rule) in params.outlet_assortment_rules.iter().enumerate() {
        let section = "parameters.outlet_assortment_rules";
        c.require_non_empty(section, i, "metier", &rule.metier);
        c.require_non_empty(section, i, "sub_axis", &rule.sub_axis);
        c.require_non_empty(section, i, "brand", &rule.brand);
    }
    if let Some(brands) = &params.restricted_brands_for_donation {
        for (i, brand) in brands.iter().enumerate() {
            c.require_non_empty("parameters.restricted_brands_for_donation", i, "brand", brand);
        }
    }

    c.violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Channel, DemandEntry, InventoryRecord, Product};
    use crate::domain::rules::OutletAssortmentRule;
    use crate::domain::types::ChannelType;

    fn request() -> AllocationRequest {
        AllocationRequest {
            products: vec![Product::new("SKU001"), Product::new("SKU002")],
            channels: vec![Channel::new("STORE1", ChannelType::Store)],
            inventory: vec![InventoryRecord::new("SKU001", 10)],
            demand: vec![DemandEntry::new("SKU001", "STORE1", 7.0)],
            ..AllocationRequest::default()
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate_request(&request()).is_empty());
    }

    #[test]
    fn test_collects_every_violation() {
        let mut req = request();
        req.products.push(Product::new("SKU001"));
        req.inventory.push(InventoryRecord::new("SKU999", -1));
        req.demand.push(DemandEntry::new("SKU002", "STORE9", f64::NAN));
        req.parameters
            .outlet_assortment_rules
            .push(OutletAssortmentRule::new("Lipstick", "", "BrandC", 1u32));
        req.parameters.restricted_brands_for_donation = Some(vec!["".to_string()]);

        let violations = validate_request(&req);
        let fields: Vec<(&str, &str)> = violations
            .iter()
            .map(|v| (v.section.as_str(), v.field.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("products", "sku"),
                ("inventory", "product_sku"),
                ("inventory", "quantity"),
                ("demand", "channel_id"),
                ("demand", "demand_quantity"),
                ("parameters.outlet_assortment_rules", "sub_axis"),
                ("parameters.restricted_brands_for_donation", "brand"),
            ]
        );
    }
}
