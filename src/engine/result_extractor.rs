// ==========================================
// 库存分配优化系统 - 结果提取
// ==========================================
// 职责: 过滤、取整并重排原始解为稳定的决策列表
// 红线: 非 Optimal 状态不输出任何决策
// 顺序: 商品按目录顺序，同一商品内渠道按目录顺序
// ==========================================

use crate::domain::allocation::AllocationDecision;
use crate::engine::model::AllocationModel;
use crate::engine::solver::SolverSolution;
use tracing::debug;

/// 近零容差：吸收求解器浮点噪声，低于此值视为未分配
pub const ALLOCATION_TOLERANCE: f64 = 0.1;

/// 提取分配决策
pub fn extract_decisions(model: &AllocationModel, solution: &SolverSolution) -> Vec<AllocationDecision> {
    if !solution.status.is_optimal() {
        debug!(status = %solution.status, "非最优状态，不输出决策");
        return Vec::new();
    }

    let mut decisions = Vec::new();
    for p in 0..model.product_count() {
        for c in 0..model.channel_count() {
            let Some(value) = solution.value(model.quantity_var(p, c)) else {
                continue;
            };
            if value <= ALLOCATION_TOLERANCE {
                continue;
            }
            let quantity = value.round() as u64;
            if quantity == 0 {
                continue;
            }
            decisions.push(AllocationDecision::new(
                model.product_sku(p),
                model.channel_id(c),
                quantity,
            ));
        }
    }
    decisions
}
