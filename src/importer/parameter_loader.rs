// ==========================================
// 库存分配优化系统 - 规则参数表导入
// ==========================================
// 覆盖天数表:   channel | abc_class | coverage_days
// 奥莱产能表:   channel | division | axe | max_skus
// 品类组合表:   metier | subaxis | brand | max_skus
// ==========================================
// 红线: 数值单元格保持原文（NumericField::Text），非法值由规则注册表降级
// ==========================================

use crate::domain::rules::{
    CoverageDaysRule, OptimizationParameters, OutletAssortmentRule, OutletSkuCapacityRule,
};
use crate::domain::types::{AbcClass, NumericField};
use crate::importer::demand_loader::{channel_column, require_column};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawRecord, UniversalFileParser};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// 规则表路径（None 表示不加载该表）
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterTablePaths<'a> {
    pub coverage: Option<&'a Path>,
    pub outlet_capacity: Option<&'a Path>,
    pub outlet_assortment: Option<&'a Path>,
}

fn read_table(path: &Path) -> ImportResult<Vec<RawRecord>> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    UniversalFileParser.parse(path)
}

fn cell<'r>(record: &'r RawRecord, column: &str) -> &'r str {
    record.get(column).map(String::as_str).unwrap_or("")
}

fn raw_number(record: &RawRecord, column: &str) -> NumericField {
    NumericField::Text(cell(record, column).to_string())
}

/// 读取覆盖天数表
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_coverage_rules(path: &Path) -> ImportResult<Vec<CoverageDaysRule>> {
    let records = read_table(path)?;
    if records.is_empty() {
        return Ok(Vec::new());
    }
    let channel_col = channel_column(&records, path)?;
    require_column(&records, path, "abc_class")?;
    require_column(&records, path, "coverage_days")?;

    let mut rules = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        let channel_id = cell(record, &channel_col);
        if channel_id.is_empty() {
            warn!(row = idx + 2, "覆盖天数表渠道为空，跳过");
            continue;
        }
        let abc_class = match cell(record, "abc_class").parse::<AbcClass>() {
            Ok(class) => class,
            Err(message) => {
                warn!(row = idx + 2, %message, "覆盖天数表 ABC 分类无法识别，跳过");
                continue;
            }
        };
        rules.push(CoverageDaysRule {
            channel_id: channel_id.to_string(),
            abc_class,
            coverage_days: raw_number(record, "coverage_days"),
        });
    }

    info!(rules = rules.len(), "覆盖天数规则导入完成");
    Ok(rules)
}

/// 读取奥莱 SKU 产能表
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_outlet_capacity_rules(path: &Path) -> ImportResult<Vec<OutletSkuCapacityRule>> {
    let records = read_table(path)?;
    if records.is_empty() {
        return Ok(Vec::new());
    }
    let channel_col = channel_column(&records, path)?;
    for column in ["division", "axe", "max_skus"] {
        require_column(&records, path, column)?;
    }

    let mut rules = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        let (channel_id, division, axis) = (
            cell(record, &channel_col),
            cell(record, "division"),
            cell(record, "axe"),
        );
        if channel_id.is_empty() || division.is_empty() || axis.is_empty() {
            warn!(row = idx + 2, "奥莱产能表键字段为空，跳过");
            continue;
        }
        rules.push(OutletSkuCapacityRule {
            channel_id: channel_id.to_string(),
            division: division.to_string(),
            axis: axis.to_string(),
            max_skus: raw_number(record, "max_skus"),
        });
    }

    info!(rules = rules.len(), "奥莱产能规则导入完成");
    Ok(rules)
}

/// 读取奥莱品类组合表
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_assortment_rules(path: &Path) -> ImportResult<Vec<OutletAssortmentRule>> {
    let records = read_table(path)?;
    if records.is_empty() {
        return Ok(Vec::new());
    }
    for column in ["metier", "subaxis", "brand", "max_skus"] {
        require_column(&records, path, column)?;
    }

    let mut rules = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        let (metier, sub_axis, brand) = (
            cell(record, "metier"),
            cell(record, "subaxis"),
            cell(record, "brand"),
        );
        if metier.is_empty() || sub_axis.is_empty() || brand.is_empty() {
            warn!(row = idx + 2, "品类组合表键字段为空，跳过");
            continue;
        }
        rules.push(OutletAssortmentRule {
            metier: metier.to_string(),
            sub_axis: sub_axis.to_string(),
            brand: brand.to_string(),
            max_skus: raw_number(record, "max_skus"),
        });
    }

    info!(rules = rules.len(), "品类组合规则导入完成");
    Ok(rules)
}

/// 组装参数包
///
/// 已配置路径的表必须存在；未配置的表为空列表。
pub fn load_parameters(
    paths: ParameterTablePaths<'_>,
    restricted_brands: &[String],
) -> ImportResult<OptimizationParameters> {
    let coverage_days_rules = match paths.coverage {
        Some(path) => load_coverage_rules(path)?,
        None => Vec::new(),
    };
    let outlet_sku_capacity_rules = match paths.outlet_capacity {
        Some(path) => load_outlet_capacity_rules(path)?,
        None => Vec::new(),
    };
    let outlet_assortment_rules = match paths.outlet_assortment {
        Some(path) => load_assortment_rules(path)?,
        None => Vec::new(),
    };

    let restricted: Vec<String> = restricted_brands
        .iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect();
    debug!(restricted_brands = ?restricted, "捐赠限制品牌");

    Ok(OptimizationParameters {
        restricted_brands_for_donation: if restricted.is_empty() {
            None
        } else {
            Some(restricted)
        },
        coverage_days_rules,
        outlet_sku_capacity_rules,
        outlet_assortment_rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(temp_file, "{}", line).unwrap();
        }
        temp_file
    }

    #[test]
    fn test_coverage_rules_keep_raw_numbers_and_skip_unknown_class() {
        let file = csv_file(&[
            "Channel,abc_class,coverage_days",
            "STORE1,A,30",
            "STORE1,B,n/a",
            "STORE1,Z,10",
        ]);
        let rules = load_coverage_rules(file.path()).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].coverage_days.non_negative(), Some(30.0));
        assert_eq!(rules[1].abc_class, AbcClass::B);
        assert_eq!(rules[1].coverage_days.non_negative(), None);
    }

    #[test]
    fn test_outlet_capacity_rules_use_axe_column() {
        let file = csv_file(&[
            "channel_id,division,axe,max_skus",
            "OUTLET1,LLD,Fragrance,2",
        ]);
        let rules = load_outlet_capacity_rules(file.path()).unwrap();
        assert_eq!(rules, vec![OutletSkuCapacityRule::new("OUTLET1", "LLD", "Fragrance", "2")]);
    }

    #[test]
    fn test_assortment_missing_column_is_error() {
        let file = csv_file(&["metier,brand,max_skus", "Lipstick,BrandC,1"]);
        let err = load_assortment_rules(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn { column, .. } if column == "subaxis"));
    }

    #[test]
    fn test_load_parameters_skips_unconfigured_tables() {
        let assortment = csv_file(&["metier,subaxis,brand,max_skus", "Lipstick,Lip Makeup,BrandC,1"]);
        let params = load_parameters(
            ParameterTablePaths {
                outlet_assortment: Some(assortment.path()),
                ..ParameterTablePaths::default()
            },
            &["BrandA".to_string(), " ".to_string()],
        )
        .unwrap();
        assert!(params.coverage_days_rules.is_empty());
        assert_eq!(params.outlet_assortment_rules.len(), 1);
        assert_eq!(params.restricted_brands_for_donation, Some(vec!["BrandA".to_string()]));
    }

    #[test]
    fn test_configured_table_must_exist() {
        let err = load_coverage_rules(Path::new("missing/coverage.xlsx")).unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }
}
