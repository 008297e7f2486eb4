// ==========================================
// 库存分配优化系统 - API 层
// ==========================================
// 职责: 进程内业务入口（校验 → 求解 → 响应 / 导出）
// ==========================================

pub mod allocation_api;
pub mod error;

// 重导出核心类型
pub use allocation_api::{export_decisions_csv, generate_run_id, AllocationApi, AllocationResponse};
pub use error::{ApiError, ApiResult};
