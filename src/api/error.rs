// ==========================================
// 库存分配优化系统 - API层错误类型
// ==========================================
// 职责: 汇总导入/配置/校验/求解失败，转换为面向调用方的错误消息
// 红线: 非 Optimal 求解必须与“最优但零分配”区分
// ==========================================

use crate::config::ConfigError;
use crate::domain::types::SolveStatus;
use crate::importer::{ImportError, RequestViolation};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 请求校验失败（带全部违规项）
    #[error("请求校验失败: {reason}")]
    ValidationError {
        reason: String,
        violations: Vec<RequestViolation>,
    },

    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 求解错误
    // ==========================================
    #[error("求解未得到最优解: status={status}")]
    SolveNotOptimal { status: SolveStatus },

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Other(inner) => ApiError::Other(inner),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::InternalError(format!("CSV 写出失败: {}", err))
    }
}

impl ApiError {
    /// 由校验违规列表构造错误
    pub fn from_violations(violations: Vec<RequestViolation>) -> Self {
        let reason = match violations.first() {
            Some(first) if violations.len() > 1 => {
                format!("{}（另有 {} 项）", first, violations.len() - 1)
            }
            Some(first) => first.to_string(),
            None => "未知校验错误".to_string(),
        };
        ApiError::ValidationError { reason, violations }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_violations_summarises_first() {
        let violations = vec![
            RequestViolation {
                section: "products".to_string(),
                row: 0,
                field: "sku".to_string(),
                message: "不能为空".to_string(),
            },
            RequestViolation {
                section: "channels".to_string(),
                row: 1,
                field: "id".to_string(),
                message: "不能为空".to_string(),
            },
        ];
        let err = ApiError::from_violations(violations);
        assert_eq!(err.to_string(), "请求校验失败: products[0].sku: 不能为空（另有 1 项）");
        assert!(matches!(err, ApiError::ValidationError { violations, .. } if violations.len() == 2));
    }

    #[test]
    fn test_non_optimal_message_names_status() {
        let err = ApiError::SolveNotOptimal {
            status: SolveStatus::Infeasible,
        };
        assert_eq!(err.to_string(), "求解未得到最优解: status=Infeasible");
    }
}
