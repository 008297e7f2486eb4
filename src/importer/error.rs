// ==========================================
// 库存分配优化系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv/.json）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("JSON 解析失败: {0}")]
    JsonParseError(String),

    // ===== 数据映射错误 =====
    #[error("缺少必需列 {column}（文件: {file}）")]
    MissingColumn { file: String, column: String },

    #[error("字段映射失败 (行 {row}): {message}")]
    FieldMappingError { row: usize, message: String },

    #[error("类型转换失败 (行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::JsonParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
