// ==========================================
// 库存分配优化系统 - 引擎层
// ==========================================
// 职责: 把商品/渠道/库存/需求/规则翻译为混合整数规划模型，
//       交给外部求解器，并把原始解转换为分配决策
// 红线: 引擎不读写文件、不做持久化；配置缺口只降级不报错
// ==========================================

pub mod grouping;
pub mod model;
pub mod model_builder;
pub mod model_summary;
pub mod orchestrator;
pub mod plan_verifier;
pub mod result_extractor;
pub mod rule_registry;
pub mod solver;

// 重导出核心引擎
pub use grouping::{CapacityGroupKey, ProductGroups};
pub use model::{
    AllocationModel, ConstraintFamily, ConstraintSense, DecisionVariable, LinearConstraint,
    ModelStats, VarId, VarKind,
};
pub use model_builder::{build_allocation_model, BuiltModel, ModelBuilder, ModelOptions};
pub use orchestrator::AllocationOrchestrator;
pub use plan_verifier::{PlanVerifier, PlanViolation, ViolationKind};
pub use result_extractor::{extract_decisions, ALLOCATION_TOLERANCE};
pub use rule_registry::{AssortmentKey, CoverageKey, OutletCapacityKey, RuleRegistry};
pub use solver::{solve_with_deadline, GoodLpBackend, SolverBackend, SolverSolution};
