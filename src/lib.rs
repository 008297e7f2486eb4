// ==========================================
// 库存分配优化系统 - 核心库
// ==========================================
// 定位: 多渠道（门店/奥莱/捐赠）过剩库存分配的 MIP 建模层
// 技术栈: Rust + good_lp (microlp / HiGHS)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 规则注册/分组/建模/求解/提取
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 运行配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AbcClass, ChannelType, NumericField, SolveStatus};

// 领域实体
pub use domain::{
    AllocationDecision, AllocationInput, AllocationOutcome, AllocationRequest, Channel,
    DemandEntry, DemandMap, InventoryRecord, OptimizationParameters, Product,
};

// 引擎
pub use engine::{
    AllocationModel, AllocationOrchestrator, GoodLpBackend, ModelBuilder, ModelOptions,
    PlanVerifier, RuleRegistry, SolverBackend, ALLOCATION_TOLERANCE,
};

// API
pub use api::{AllocationApi, AllocationResponse, ApiError, ApiResult};

// 配置
pub use config::AllocationConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "库存分配优化系统";
