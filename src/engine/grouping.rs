// ==========================================
// 库存分配优化系统 - 商品分组预处理
// ==========================================
// 职责: 每次求解按奥莱规则所需的属性组合对商品分桶（一次扫描）
// 红线: 缺任一分组属性的商品不进入该桶（不受该规则族约束），不报错
// ==========================================

use crate::domain::catalog::Product;
use crate::engine::rule_registry::AssortmentKey;
use std::collections::BTreeMap;
use tracing::debug;

/// 奥莱产能分组键: (division, axis)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CapacityGroupKey {
    pub division: String,
    pub axis: String,
}

// ==========================================
// ProductGroups - 分组结果
// ==========================================
// 桶内存放商品下标（目录顺序）；BTreeMap 保证约束生成顺序稳定
#[derive(Debug, Clone, Default)]
pub struct ProductGroups {
    pub by_capacity_group: BTreeMap<CapacityGroupKey, Vec<usize>>,
    pub by_assortment_group: BTreeMap<AssortmentKey, Vec<usize>>,
    pub without_capacity_group: usize,
    pub without_assortment_group: usize,
}

impl ProductGroups {
    /// 对商品目录分组
    pub fn build(products: &[Product]) -> Self {
        let mut groups = Self::default();

        for (idx, product) in products.iter().enumerate() {
            match product.capacity_group_key() {
                Some((division, axis)) => groups
                    .by_capacity_group
                    .entry(CapacityGroupKey {
                        division: division.to_string(),
                        axis: axis.to_string(),
                    })
                    .or_default()
                    .push(idx),
                None => {
                    groups.without_capacity_group += 1;
                    debug!(sku = %product.sku, "缺少 division/axis，不受奥莱产能规则约束");
                }
            }

            match product.assortment_group_key() {
                Some((metier, sub_axis, brand)) => groups
                    .by_assortment_group
                    .entry(AssortmentKey {
                        metier: metier.to_string(),
                        sub_axis: sub_axis.to_string(),
                        brand: brand.to_string(),
                    })
                    .or_default()
                    .push(idx),
                None => {
                    groups.without_assortment_group += 1;
                    debug!(sku = %product.sku, "缺少 métier/sub-axis/brand，不受奥莱品类组合规则约束");
                }
            }
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(sku: &str, division: &str, axis: &str, metier: &str, sub_axis: &str, brand: &str) -> Product {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        let mut p = Product::new(sku);
        p.division = opt(division);
        p.axis = opt(axis);
        p.metier = opt(metier);
        p.sub_axis = opt(sub_axis);
        p.brand = opt(brand);
        p
    }

    #[test]
    fn test_groups_by_attribute_combinations() {
        let products = vec![
            product("SKU001", "LLD", "Fragrance", "Eau de Toilette", "Men Fragrance", "BrandA"),
            product("SKU002", "LLD", "Fragrance", "Eau de Parfum", "Women Fragrance", "BrandA"),
            product("SKU003", "CPD", "Skincare", "Moisturizer", "Face Care", "BrandB"),
            product("SKU005", "LLD", "Fragrance", "Eau de Toilette", "Men Fragrance", "BrandA"),
        ];
        let groups = ProductGroups::build(&products);

        let lld = CapacityGroupKey {
            division: "LLD".to_string(),
            axis: "Fragrance".to_string(),
        };
        assert_eq!(groups.by_capacity_group.get(&lld), Some(&vec![0, 1, 3]));
        assert_eq!(groups.by_capacity_group.len(), 2);

        let edt = AssortmentKey {
            metier: "Eau de Toilette".to_string(),
            sub_axis: "Men Fragrance".to_string(),
            brand: "BrandA".to_string(),
        };
        assert_eq!(groups.by_assortment_group.get(&edt), Some(&vec![0, 3]));
        assert_eq!(groups.by_assortment_group.len(), 3);
    }

    #[test]
    fn test_missing_attributes_excluded_silently() {
        let products = vec![
            product("SKU001", "LLD", "", "Lipstick", "Lip Makeup", ""),
            product("SKU002", "", "", "", "", ""),
        ];
        let groups = ProductGroups::build(&products);
        assert!(groups.by_capacity_group.is_empty());
        assert!(groups.by_assortment_group.is_empty());
        assert_eq!(groups.without_capacity_group, 2);
        assert_eq!(groups.without_assortment_group, 2);
    }
}
