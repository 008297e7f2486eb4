// ==========================================
// 库存分配优化系统 - 导入层
// ==========================================
// 职责: 外部表格/请求 → 领域输入
// 支持: Excel, CSV, JSON 请求
// ==========================================

pub mod demand_loader;
pub mod error;
pub mod file_parser;
pub mod parameter_loader;
pub mod request_validator;

// 重导出核心类型
pub use demand_loader::{load_demand, CHANNEL_COLUMN_ALIASES};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
pub use parameter_loader::{
    load_assortment_rules, load_coverage_rules, load_outlet_capacity_rules, load_parameters,
    ParameterTablePaths,
};
pub use request_validator::{validate_request, RequestViolation};
