// ==========================================
// 集成测试共享辅助
// ==========================================
// 每个测试 crate 只用到其中一部分
#![allow(dead_code)]

pub mod test_data_builder;

pub use test_data_builder::*;

use nw_allocation::domain::AllocationDecision;
use std::io::Write;
use tempfile::NamedTempFile;

/// 查找 (sku, channel) 的分配件数，无决策为 0
pub fn quantity_of(decisions: &[AllocationDecision], sku: &str, channel_id: &str) -> u64 {
    decisions
        .iter()
        .filter(|d| d.product_sku == sku && d.channel_id == channel_id)
        .map(|d| d.quantity)
        .sum()
}

/// 商品在所有渠道的分配总件数
pub fn product_total(decisions: &[AllocationDecision], sku: &str) -> u64 {
    decisions
        .iter()
        .filter(|d| d.product_sku == sku)
        .map(|d| d.quantity)
        .sum()
}

/// 渠道收到的总件数
pub fn channel_total(decisions: &[AllocationDecision], channel_id: &str) -> u64 {
    decisions
        .iter()
        .filter(|d| d.channel_id == channel_id)
        .map(|d| d.quantity)
        .sum()
}

/// 写出带扩展名的临时文件（需保持返回值存活）
pub fn temp_file_with(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("创建临时文件失败");
    file.write_all(content.as_bytes()).expect("写入临时文件失败");
    file.flush().expect("刷新临时文件失败");
    file
}
