// ==========================================
// 库存分配优化系统 - 领域类型定义
// ==========================================
// 渠道类型 / ABC 分类 / 求解状态 / 数值字段
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 渠道类型 (Channel Type)
// ==========================================
// 红线: outlet 渠道没有总量产能，只有分组 SKU 数上限
// 序列化格式: lowercase；未知类型统一归为 Other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Store,    // 门店
    Outlet,   // 奥莱
    Donation, // 捐赠
    #[serde(other)]
    Other, // 其他（员工内购、清货等）
}

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::Store => "store",
            ChannelType::Outlet => "outlet",
            ChannelType::Donation => "donation",
            ChannelType::Other => "other",
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ChannelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "store" => Ok(ChannelType::Store),
            "outlet" => Ok(ChannelType::Outlet),
            "donation" => Ok(ChannelType::Donation),
            "" => Err("渠道类型为空".to_string()),
            _ => Ok(ChannelType::Other),
        }
    }
}

// ==========================================
// ABC 分类 (Demand Velocity Class)
// ==========================================
// A = 快销，用于分档覆盖天数规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl fmt::Display for AbcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbcClass::A => write!(f, "A"),
            AbcClass::B => write!(f, "B"),
            AbcClass::C => write!(f, "C"),
        }
    }
}

impl std::str::FromStr for AbcClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(AbcClass::A),
            "B" => Ok(AbcClass::B),
            "C" => Ok(AbcClass::C),
            other => Err(format!("未知 ABC 分类: {}", other)),
        }
    }
}

// ==========================================
// 求解状态 (Solve Status)
// ==========================================
// 非 Optimal 状态必须与“最优但零分配”区分开
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    NotSolved,
    Undefined,
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "Optimal"),
            SolveStatus::Infeasible => write!(f, "Infeasible"),
            SolveStatus::Unbounded => write!(f, "Unbounded"),
            SolveStatus::NotSolved => write!(f, "NotSolved"),
            SolveStatus::Undefined => write!(f, "Undefined"),
        }
    }
}

// ==========================================
// NumericField - 原始数值字段
// ==========================================
// 规则表/渠道表中的数值单元格：可能是数字，也可能是字符串（Excel 导出常见）
// 红线: 解析失败或为负数 => 视为“规则缺失”，绝不视为 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    /// 解析为非负有限数值
    ///
    /// # 返回
    /// - Some(v): v 有限且 >= 0
    /// - None: 无法解析 / 负数 / NaN / 无穷（调用方按“规则缺失”处理）
    pub fn non_negative(&self) -> Option<f64> {
        let value = match self {
            NumericField::Number(v) => *v,
            NumericField::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (value.is_finite() && value >= 0.0).then_some(value)
    }
}

impl From<f64> for NumericField {
    fn from(value: f64) -> Self {
        NumericField::Number(value)
    }
}

impl From<u32> for NumericField {
    fn from(value: u32) -> Self {
        NumericField::Number(f64::from(value))
    }
}

impl From<&str> for NumericField {
    fn from(value: &str) -> Self {
        NumericField::Text(value.to_string())
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericField::Number(v) => write!(f, "{}", v),
            NumericField::Text(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_field_accepts_numbers_and_numeric_text() {
        assert_eq!(NumericField::from(14.0).non_negative(), Some(14.0));
        assert_eq!(NumericField::from(" 21 ").non_negative(), Some(21.0));
        assert_eq!(NumericField::from(0u32).non_negative(), Some(0.0));
    }

    #[test]
    fn test_numeric_field_malformed_is_absent() {
        assert_eq!(NumericField::from("n/a").non_negative(), None);
        assert_eq!(NumericField::from("").non_negative(), None);
        assert_eq!(NumericField::from(-3.0).non_negative(), None);
        assert_eq!(NumericField::from(f64::NAN).non_negative(), None);
    }

    #[test]
    fn test_numeric_field_deserializes_untagged() {
        let n: NumericField = serde_json::from_str("12").unwrap();
        assert_eq!(n, NumericField::Number(12.0));
        let t: NumericField = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(t, NumericField::Text("abc".to_string()));
    }

    #[test]
    fn test_channel_type_unknown_maps_to_other() {
        let t: ChannelType = serde_json::from_str("\"friends_family\"").unwrap();
        assert_eq!(t, ChannelType::Other);
        let o: ChannelType = serde_json::from_str("\"outlet\"").unwrap();
        assert_eq!(o, ChannelType::Outlet);
        assert_eq!("Donation".parse::<ChannelType>(), Ok(ChannelType::Donation));
    }

    #[test]
    fn test_solve_status_display() {
        assert_eq!(SolveStatus::Optimal.to_string(), "Optimal");
        assert_eq!(SolveStatus::NotSolved.to_string(), "NotSolved");
        assert!(!SolveStatus::Infeasible.is_optimal());
    }
}
