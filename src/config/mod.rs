// ==========================================
// 库存分配优化系统 - 配置层
// ==========================================
// 职责: 运行配置加载（JSON 文件 + 环境变量覆写）
// ==========================================

pub mod allocation_config;

pub use allocation_config::{
    AllocationConfig, ConfigError, ConfigResult, DonationSettings, ExportSettings, ParameterFiles,
    SolverSettings, DEFAULT_TIME_LIMIT_SECS, ENV_CONFIG_PATH, ENV_TIME_LIMIT_SECS,
};
