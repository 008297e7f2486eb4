// ==========================================
// 库存分配优化系统 - 周需求（sell-out）导入
// ==========================================
// 输入列: ean / 渠道列（多个别名）/ weekly_demand
// 红线: 文件不存在 => 空需求 + 警告；缺列 => ImportError
// ==========================================

use crate::domain::catalog::{DemandEntry, DemandMap};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{find_column, RawRecord, UniversalFileParser};
use std::path::Path;
use tracing::{info, instrument, warn};

/// 渠道标识列候选名（按优先级）
pub const CHANNEL_COLUMN_ALIASES: [&str; 4] = ["channel_id_string", "channel_id", "Channel ID", "Channel"];

pub const SKU_COLUMN: &str = "ean";
pub const WEEKLY_DEMAND_COLUMN: &str = "weekly_demand";

/// 定位渠道列
pub(crate) fn channel_column(records: &[RawRecord], file: &Path) -> ImportResult<String> {
    let headers = records.first().map(|r| r.keys().collect::<Vec<_>>()).unwrap_or_default();
    find_column(headers, &CHANNEL_COLUMN_ALIASES).ok_or_else(|| ImportError::MissingColumn {
        file: file.display().to_string(),
        column: CHANNEL_COLUMN_ALIASES.join(" | "),
    })
}

/// 检查必需列
pub(crate) fn require_column(records: &[RawRecord], file: &Path, column: &str) -> ImportResult<()> {
    match records.first() {
        Some(first) if !first.contains_key(column) => Err(ImportError::MissingColumn {
            file: file.display().to_string(),
            column: column.to_string(),
        }),
        _ => Ok(()),
    }
}

/// 解析需求单元格
fn parse_demand(row: usize, raw: &str) -> ImportResult<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| ImportError::TypeConversionError {
        row,
        field: WEEKLY_DEMAND_COLUMN.to_string(),
        message: format!("无法解析为数值: '{}'", raw),
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(ImportError::TypeConversionError {
            row,
            field: WEEKLY_DEMAND_COLUMN.to_string(),
            message: format!("周需求必须为非负有限数: {}", value),
        });
    }
    Ok(value)
}

/// 读取周需求表
///
/// # 返回
/// - Ok(DemandMap): 文件不存在时为空表
/// - Err: 缺少必需列 / 数值非法 / 文件无法解析
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_demand(path: impl AsRef<Path>) -> ImportResult<DemandMap> {
    let path = path.as_ref();
    if !path.exists() {
        warn!("需求文件不存在，按空需求处理");
        return Ok(DemandMap::new());
    }

    let records = UniversalFileParser.parse(path)?;
    if records.is_empty() {
        warn!("需求文件无数据行");
        return Ok(DemandMap::new());
    }

    require_column(&records, path, SKU_COLUMN)?;
    require_column(&records, path, WEEKLY_DEMAND_COLUMN)?;
    let channel_col = channel_column(&records, path)?;

    let mut entries = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        let row = idx + 2; // 表头占第 1 行
        let sku = record.get(SKU_COLUMN).map(String::as_str).unwrap_or("");
        let channel = record.get(&channel_col).map(String::as_str).unwrap_or("");
        if sku.is_empty() || channel.is_empty() {
            return Err(ImportError::FieldMappingError {
                row,
                message: format!("{} 或 {} 为空", SKU_COLUMN, channel_col),
            });
        }
        let raw_demand = record.get(WEEKLY_DEMAND_COLUMN).map(String::as_str).unwrap_or("");
        entries.push(DemandEntry::new(sku, channel, parse_demand(row, raw_demand)?));
    }

    let demand = DemandMap::from_entries(&entries);
    info!(rows = entries.len(), pairs = demand.len(), channel_column = %channel_col, "需求导入完成");
    Ok(demand)
}
