// ==========================================
// 库存分配优化系统 - 自动分配 API
// ==========================================
// 流程: 边界校验 → 输入快照 → 限时求解 → 导出 → 响应
// 红线: 非 Optimal 返回 SolveNotOptimal，绝不伪装成“零分配成功”
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::AllocationConfig;
use crate::domain::allocation::{
    AllocationDecision, AllocationInput, AllocationOutcome, AllocationRequest, DataQualityGaps,
};
use crate::domain::types::SolveStatus;
use crate::engine::model::ModelStats;
use crate::engine::model_summary::{write_lp, write_markdown_summary};
use crate::engine::orchestrator::AllocationOrchestrator;
use crate::engine::solver::{GoodLpBackend, SolverBackend};
use crate::importer::{load_demand, load_parameters, validate_request};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// 决策导出表头
const DECISION_CSV_HEADER: [&str; 3] = ["product_sku", "channel_id", "quantity"];

// ==========================================
// AllocationResponse - 自动分配响应
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationResponse {
    /// 运行 ID（run_YYYYmmddHHMMSS_xxxxxxxx）
    pub run_id: String,
    pub status: SolveStatus,
    pub message: String,
    pub allocations: Vec<AllocationDecision>,
    pub allocations_created: usize,
    pub total_quantity: u64,
    /// 模型规模
    pub stats: ModelStats,
    /// 配置缺口统计
    pub gaps: DataQualityGaps,
    pub elapsed_ms: i64,
}

/// 生成运行 ID
pub fn generate_run_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("run_{}_{}", Utc::now().format("%Y%m%d%H%M%S"), &suffix[..8])
}

/// 写出决策 CSV（product_sku,channel_id,quantity）
pub fn export_decisions_csv(path: impl AsRef<Path>, decisions: &[AllocationDecision]) -> ApiResult<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(DECISION_CSV_HEADER)?;
    for decision in decisions {
        writer.write_record([
            decision.product_sku.as_str(),
            decision.channel_id.as_str(),
            decision.quantity.to_string().as_str(),
        ])?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = decisions.len(), "分配决策已导出");
    Ok(())
}

// ==========================================
// AllocationApi - 自动分配 API
// ==========================================
pub struct AllocationApi {
    config: AllocationConfig,
    orchestrator: AllocationOrchestrator,
}

impl AllocationApi {
    /// 使用默认 good_lp 求解器
    pub fn new(config: AllocationConfig) -> Self {
        Self::with_backend(config, Arc::new(GoodLpBackend::new()))
    }

    pub fn with_backend(config: AllocationConfig, backend: Arc<dyn SolverBackend>) -> Self {
        let orchestrator = AllocationOrchestrator::new(backend).with_options(config.model_options());
        Self { config, orchestrator }
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// 用配置的规则表补全请求
    ///
    /// - 请求未带任何规则表时，从配置的规则表文件加载
    /// - 请求自带限制品牌列表时以请求为准，否则使用配置的默认品牌
    /// - 请求未带需求时，从配置的 sell-out 表加载
    pub fn load_request_from_tables(&self, mut request: AllocationRequest) -> ApiResult<AllocationRequest> {
        if request.parameters.has_no_rule_tables() && self.config.has_parameter_tables() {
            let own_brands = request.parameters.restricted_brands_for_donation.take();
            let mut loaded = load_parameters(
                self.config.parameter_table_paths(),
                &self.config.donation.restricted_brands,
            )?;
            if own_brands.is_some() {
                loaded.restricted_brands_for_donation = own_brands;
            }
            request.parameters = loaded;
        } else if request.parameters.restricted_brands_for_donation.is_none()
            && !self.config.donation.restricted_brands.is_empty()
        {
            request.parameters.restricted_brands_for_donation =
                Some(self.config.donation.restricted_brands.clone());
        }

        if request.demand.is_empty() {
            if let Some(path) = &self.config.parameter_files.sellout {
                request.demand = load_demand(path)?.to_entries();
            }
        }

        Ok(request)
    }

    /// 自动分配
    ///
    /// # 返回
    /// - Ok(AllocationResponse): 求解状态为 Optimal（决策可能为空）
    /// - Err(ApiError::ValidationError): 请求未通过边界校验
    /// - Err(ApiError::SolveNotOptimal): 不可行 / 无界 / 超时 / 未定义
    #[instrument(skip_all, fields(
        products = request.products.len(),
        channels = request.channels.len()
    ))]
    pub async fn auto_allocate(&self, request: AllocationRequest) -> ApiResult<AllocationResponse> {
        let started = Instant::now();
        let run_id = generate_run_id();

        if request.products.is_empty() || request.channels.is_empty() {
            return Err(ApiError::InvalidInput(
                "缺少必要数据（商品或渠道为空）".to_string(),
            ));
        }

        let violations = validate_request(&request);
        if !violations.is_empty() {
            warn!(run_id = %run_id, violations = violations.len(), "请求校验失败");
            return Err(ApiError::from_violations(violations));
        }

        let input = AllocationInput::from(request);
        let outcome = match self.config.time_limit() {
            Some(deadline) => self.orchestrator.run_with_deadline(&input, deadline).await,
            None => self.orchestrator.run(&input),
        };

        self.write_model_exports(&input, outcome.status)?;

        if !outcome.status.is_optimal() {
            warn!(run_id = %run_id, status = %outcome.status, "求解未得到最优解");
            return Err(ApiError::SolveNotOptimal {
                status: outcome.status,
            });
        }

        if let Some(path) = &self.config.export.decisions_csv_path {
            export_decisions_csv(path, &outcome.decisions)?;
        }

        let response = Self::respond(run_id, outcome, started);
        info!(
            run_id = %response.run_id,
            allocations_created = response.allocations_created,
            total_quantity = response.total_quantity,
            elapsed_ms = response.elapsed_ms,
            "自动分配完成"
        );
        Ok(response)
    }

    fn respond(run_id: String, outcome: AllocationOutcome, started: Instant) -> AllocationResponse {
        let total_quantity = outcome.total_quantity();
        let allocations_created = outcome.decisions.len();
        let message = if allocations_created == 0 {
            "自动分配完成：最优解为零分配".to_string()
        } else {
            "自动分配成功".to_string()
        };
        AllocationResponse {
            run_id,
            status: outcome.status,
            message,
            allocations: outcome.decisions,
            allocations_created,
            total_quantity,
            stats: outcome.stats,
            gaps: outcome.gaps,
            elapsed_ms: started.elapsed().as_millis() as i64,
        }
    }

    /// 模型摘要 / LP 导出（任何求解状态都写出，便于排查不可行）
    fn write_model_exports(&self, input: &AllocationInput, status: SolveStatus) -> ApiResult<()> {
        let export = &self.config.export;
        if export.model_summary_path.is_none() && export.lp_path.is_none() {
            return Ok(());
        }
        let built = self.orchestrator.build_model(input);
        if let Some(path) = &export.model_summary_path {
            write_markdown_summary(&built.model, status, path)?;
        }
        if let Some(path) = &export.lp_path {
            write_lp(&built.model, path)?;
        }
        Ok(())
    }
}
