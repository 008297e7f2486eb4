// ==========================================
// 库存分配优化系统 - 引擎编排器
// ==========================================
// 主流程: 规则注册 → 商品分组 → 建模 → 求解 → 提取 → 复核
// 红线: 每次调用独立，不持有跨调用的可变状态
// ==========================================

use crate::domain::allocation::{AllocationInput, AllocationOutcome};
use crate::domain::types::SolveStatus;
use crate::engine::model_builder::{BuiltModel, ModelBuilder, ModelOptions};
use crate::engine::plan_verifier::PlanVerifier;
use crate::engine::result_extractor::extract_decisions;
use crate::engine::solver::{solve_with_deadline, GoodLpBackend, SolverBackend, SolverSolution};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

// ==========================================
// AllocationOrchestrator - 引擎编排器
// ==========================================
#[derive(Clone)]
pub struct AllocationOrchestrator {
    backend: Arc<dyn SolverBackend>,
    options: ModelOptions,
}

impl Default for AllocationOrchestrator {
    fn default() -> Self {
        Self::new(Arc::new(GoodLpBackend::new()))
    }
}

impl AllocationOrchestrator {
    pub fn new(backend: Arc<dyn SolverBackend>) -> Self {
        Self {
            backend,
            options: ModelOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ModelOptions {
        self.options
    }

    /// 仅构建模型（导出摘要 / LP 时使用）
    pub fn build_model(&self, input: &AllocationInput) -> BuiltModel {
        ModelBuilder::new(input, self.options).build()
    }

    /// 同步执行完整分配流程
    #[instrument(skip(self, input), fields(
        backend = self.backend.name(),
        products = input.products.len(),
        channels = input.channels.len()
    ))]
    pub fn run(&self, input: &AllocationInput) -> AllocationOutcome {
        let built = self.build_model(input);
        let solution = self.backend.solve(&built.model);
        Self::finish(input, built, &solution)
    }

    /// 带截止时间执行；超时 => NotSolved 且无决策
    #[instrument(skip(self, input), fields(
        backend = self.backend.name(),
        products = input.products.len(),
        channels = input.channels.len()
    ))]
    pub async fn run_with_deadline(&self, input: &AllocationInput, deadline: Duration) -> AllocationOutcome {
        let BuiltModel { model, gaps } = self.build_model(input);
        let model = Arc::new(model);
        let solution = solve_with_deadline(self.backend.clone(), model.clone(), deadline).await;
        let model = Arc::try_unwrap(model).unwrap_or_else(|shared| (*shared).clone());
        Self::finish(input, BuiltModel { model, gaps }, &solution)
    }

    fn finish(input: &AllocationInput, built: BuiltModel, solution: &SolverSolution) -> AllocationOutcome {
        let decisions = extract_decisions(&built.model, solution);

        if solution.status == SolveStatus::Optimal {
            let violations = PlanVerifier::new(input).verify(&decisions);
            for violation in &violations {
                warn!(%violation, "最优解未通过复核");
            }
        }

        let outcome = AllocationOutcome {
            status: solution.status,
            decisions,
            stats: built.model.stats(),
            gaps: built.gaps,
        };

        info!(
            status = %outcome.status,
            decisions = outcome.decisions.len(),
            total_quantity = outcome.total_quantity(),
            constraints = outcome.stats.constraints,
            gaps = outcome.gaps.total(),
            "分配流程完成"
        );
        outcome
    }
}
