// ==========================================
// 库存分配优化系统 - 求解适配层
// ==========================================
// 职责: 将组装好的模型交给外部求解引擎，返回终止状态 + 变量取值
// 红线: 不做任何领域解释；任何符合契约的 MIP/LP 求解器均可替换
// ==========================================

use crate::domain::types::SolveStatus;
use crate::engine::model::{AllocationModel, ConstraintSense, VarId, VarKind};
#[cfg(feature = "solver-highs")]
use good_lp::solvers::highs::highs as default_solver;
#[cfg(not(feature = "solver-highs"))]
use good_lp::solvers::microlp::microlp as default_solver;
use good_lp::{
    variable, Expression, ProblemVariables, ResolutionError, Solution, SolutionStatus, SolverModel,
    Variable, WithTimeLimit,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

#[cfg(feature = "solver-highs")]
const SOLVER_NAME: &str = "highs";
#[cfg(not(feature = "solver-highs"))]
const SOLVER_NAME: &str = "microlp";

// ==========================================
// SolverSolution - 求解结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct SolverSolution {
    pub status: SolveStatus,
    values: Vec<Option<f64>>,
}

impl SolverSolution {
    pub fn new(status: SolveStatus, values: Vec<Option<f64>>) -> Self {
        Self { status, values }
    }

    /// 无取值的结果（未求解 / 不可行等）
    pub fn without_values(status: SolveStatus, variable_count: usize) -> Self {
        Self {
            status,
            values: vec![None; variable_count],
        }
    }

    /// 变量取值；None 表示未赋值
    pub fn value(&self, var: VarId) -> Option<f64> {
        self.values.get(var.index()).copied().flatten()
    }
}

// ==========================================
// Trait: SolverBackend
// ==========================================
// solve(model) → (status, assignment)
pub trait SolverBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, model: &AllocationModel) -> SolverSolution;

    /// 带时限求解；时限内未证明最优 => NotSolved
    ///
    /// 默认实现忽略时限，由 `solve_with_deadline` 在外层截断
    fn solve_within(&self, model: &AllocationModel, time_limit: Duration) -> SolverSolution {
        let _ = time_limit;
        self.solve(model)
    }
}

// ==========================================
// GoodLpBackend - good_lp 求解后端
// ==========================================
// 默认 microlp（纯 Rust 分支定界）；启用 solver-highs 特性后改用 HiGHS
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpBackend;

impl GoodLpBackend {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, model), fields(
        backend = SOLVER_NAME,
        variables = model.variables().len(),
        constraints = model.constraints().len()
    ))]
    fn run(&self, model: &AllocationModel, time_limit: Option<Duration>) -> SolverSolution {
        let started = Instant::now();

        // HiGHS 拒绝空模型；零变量的最优解即为空
        if model.variables().is_empty() {
            return SolverSolution::new(SolveStatus::Optimal, Vec::new());
        }

        let mut problem_vars = ProblemVariables::new();
        let vars: Vec<Variable> = model
            .variables()
            .iter()
            .map(|v| {
                let def = match v.kind {
                    VarKind::Binary => variable().binary(),
                    VarKind::Integer => {
                        let def = variable().integer().min(v.lower);
                        match v.upper {
                            Some(upper) => def.max(upper),
                            None => def,
                        }
                    }
                };
                problem_vars.add(def)
            })
            .collect();

        let objective = linear_expression(&vars, model.objective());
        let mut problem = problem_vars.maximise(objective).using(default_solver);
        if let Some(limit) = time_limit {
            problem = problem.with_time_limit(limit.as_secs_f64());
        }

        for constraint in model.constraints() {
            // 无变量的约束是常量判断，所有约束族的右端项均非负，直接跳过
            if constraint.terms.is_empty() {
                continue;
            }
            let lhs = linear_expression(&vars, &constraint.terms);
            let row = match constraint.sense {
                ConstraintSense::LessEq => lhs.leq(constraint.rhs),
                ConstraintSense::Equal => lhs.eq(constraint.rhs),
            };
            problem = problem.with(row);
        }

        let timed_out = || time_limit.is_some_and(|limit| started.elapsed() >= limit);
        let solution = match problem.solve() {
            Ok(solution) => match solution.status() {
                SolutionStatus::Optimal => {
                    let values = vars.iter().map(|v| Some(solution.value(*v))).collect();
                    SolverSolution::new(SolveStatus::Optimal, values)
                }
                // 时限内只有可行解，未证明最优
                SolutionStatus::TimeLimit | SolutionStatus::GapLimit => {
                    SolverSolution::without_values(SolveStatus::NotSolved, vars.len())
                }
            },
            Err(ResolutionError::Infeasible) => {
                SolverSolution::without_values(SolveStatus::Infeasible, vars.len())
            }
            Err(ResolutionError::Unbounded) => {
                SolverSolution::without_values(SolveStatus::Unbounded, vars.len())
            }
            Err(err) if timed_out() => {
                warn!(error = %err, "求解时限内未找到可行解");
                SolverSolution::without_values(SolveStatus::NotSolved, vars.len())
            }
            Err(err) => {
                warn!(error = %err, "求解器返回未定义错误");
                SolverSolution::without_values(SolveStatus::Undefined, vars.len())
            }
        };

        info!(
            status = %solution.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "求解完成"
        );
        solution
    }
}

fn linear_expression(vars: &[Variable], terms: &[(VarId, f64)]) -> Expression {
    let mut expr = Expression::with_capacity(terms.len());
    for (var, coef) in terms {
        expr.add_mul(*coef, vars[var.index()]);
    }
    expr
}

impl SolverBackend for GoodLpBackend {
    fn name(&self) -> &'static str {
        SOLVER_NAME
    }

    fn solve(&self, model: &AllocationModel) -> SolverSolution {
        self.run(model, None)
    }

    fn solve_within(&self, model: &AllocationModel, time_limit: Duration) -> SolverSolution {
        self.run(model, Some(time_limit))
    }
}

// ==========================================
// 截止时间包装
// ==========================================
// 超时 => NotSolved；时限同时下发给求解器，阻塞线程随之结束
pub async fn solve_with_deadline(
    backend: Arc<dyn SolverBackend>,
    model: Arc<AllocationModel>,
    deadline: Duration,
) -> SolverSolution {
    let variable_count = model.variables().len();
    let task = tokio::task::spawn_blocking(move || backend.solve_within(&model, deadline));

    match tokio::time::timeout(deadline, task).await {
        Ok(Ok(solution)) => solution,
        Ok(Err(join_err)) => {
            warn!(error = %join_err, "求解任务异常退出");
            SolverSolution::without_values(SolveStatus::Undefined, variable_count)
        }
        Err(_) => {
            warn!(deadline_ms = deadline.as_millis() as u64, "求解超时，按 NotSolved 处理");
            SolverSolution::without_values(SolveStatus::NotSolved, variable_count)
        }
    }
}
