// ==========================================
// 库存分配优化系统 - 运行配置
// ==========================================
// 职责: 求解时限 / 捐赠策略 / 规则表路径 / 导出路径
// 加载顺序: 显式路径 → 环境变量 NW_ALLOCATION_CONFIG → 用户配置目录 → 内置默认
// 覆写: NW_ALLOCATION_TIME_LIMIT_SECS 覆盖求解时限
// ==========================================

use crate::engine::model_builder::ModelOptions;
use crate::importer::parameter_loader::ParameterTablePaths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const ENV_CONFIG_PATH: &str = "NW_ALLOCATION_CONFIG";
pub const ENV_TIME_LIMIT_SECS: &str = "NW_ALLOCATION_TIME_LIMIT_SECS";

const CONFIG_DIR_NAME: &str = "nw-allocation";
const CONFIG_FILE_NAME: &str = "config.json";

// ==========================================
// ConfigError - 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置文件解析失败 ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ValueError {
        key: String,
        value: String,
        message: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// 配置分组
// ==========================================

/// 默认求解时限（秒）
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// 求解时限（秒）；null 或 0 表示不限时
    pub time_limit_secs: Option<u64>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_limit_secs: Some(DEFAULT_TIME_LIMIT_SECS),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DonationSettings {
    /// 从规则表组装参数时使用的默认限制品牌
    pub restricted_brands: Vec<String>,
    /// 历史策略: donation_eligible = false 的商品也禁止进入捐赠渠道
    pub enforce_eligibility_flag: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterFiles {
    pub coverage: Option<PathBuf>,
    pub outlet_capacity: Option<PathBuf>,
    pub outlet_assortment: Option<PathBuf>,
    /// 周需求表（sell-out）
    pub sellout: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub model_summary_path: Option<PathBuf>,
    pub lp_path: Option<PathBuf>,
    pub decisions_csv_path: Option<PathBuf>,
}

// ==========================================
// AllocationConfig - 运行配置
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    pub solver: SolverSettings,
    pub donation: DonationSettings,
    pub parameter_files: ParameterFiles,
    pub export: ExportSettings,
}

impl AllocationConfig {
    /// 按加载顺序解析配置并应用环境变量覆写
    ///
    /// # 参数
    /// - explicit: 显式指定的配置文件（必须存在）
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let env_path = std::env::var(ENV_CONFIG_PATH)
            .ok()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let mut config = match (explicit, env_path) {
            (Some(path), _) => Self::from_file(path)?,
            (None, Some(path)) => Self::from_file(&path)?,
            (None, None) => match Self::default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("未找到配置文件，使用内置默认配置");
                    Self::default()
                }
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// 从 JSON 文件读取
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!(path = %path.display(), "配置文件已加载");
        Ok(config)
    }

    /// 用户配置目录下的默认路径
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// 应用覆写（lookup 通常为环境变量读取）
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        if let Some(raw) = lookup(ENV_TIME_LIMIT_SECS) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                let secs: u64 = trimmed.parse().map_err(|_| ConfigError::ValueError {
                    key: ENV_TIME_LIMIT_SECS.to_string(),
                    value: raw.clone(),
                    message: "必须为非负整数秒".to_string(),
                })?;
                self.solver.time_limit_secs = Some(secs);
            }
        }
        Ok(())
    }

    /// 生效的求解时限；0 视为不限时
    pub fn time_limit(&self) -> Option<Duration> {
        self.solver
            .time_limit_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn model_options(&self) -> ModelOptions {
        ModelOptions {
            enforce_donation_eligibility: self.donation.enforce_eligibility_flag,
        }
    }

    pub fn parameter_table_paths(&self) -> ParameterTablePaths<'_> {
        ParameterTablePaths {
            coverage: self.parameter_files.coverage.as_deref(),
            outlet_capacity: self.parameter_files.outlet_capacity.as_deref(),
            outlet_assortment: self.parameter_files.outlet_assortment.as_deref(),
        }
    }

    /// 是否配置了任一规则表
    pub fn has_parameter_tables(&self) -> bool {
        let files = &self.parameter_files;
        files.coverage.is_some() || files.outlet_capacity.is_some() || files.outlet_assortment.is_some()
    }
}
