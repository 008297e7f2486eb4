// ==========================================
// 库存分配优化系统 - 模型摘要与 LP 导出
// ==========================================
// 职责: 将模型渲染为 Markdown 摘要 / CPLEX-LP 文本，供离线排查
// 说明: LP 格式中的名称只保留字母数字与下划线；清洗后重名的追加下标
// ==========================================

use crate::domain::types::SolveStatus;
use crate::engine::model::{AllocationModel, ConstraintSense, VarId, VarKind};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

/// LP 名称清洗：非字母数字字符替换为 '_'
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}

fn format_coef(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// 清洗后仍互不相同的名称（OUT-1 与 OUT_1 不得合并为同一个变量）
fn unique_lp_names<'n>(raw_names: impl Iterator<Item = &'n str>) -> Vec<String> {
    let mut used = HashSet::new();
    raw_names
        .enumerate()
        .map(|(i, raw)| {
            let base = sanitize_name(raw);
            let mut name = base.clone();
            if !used.insert(name.clone()) {
                name = format!("{}_{}", base, i);
                while !used.insert(name.clone()) {
                    name.push('_');
                }
            }
            name
        })
        .collect()
}

/// 线性表达式文本，如 `x_a + 2 x_b - 5 y_a`
fn render_terms<'m>(terms: &[(VarId, f64)], name_of: impl Fn(VarId) -> &'m str) -> String {
    if terms.is_empty() {
        return "0".to_string();
    }
    let mut out = String::new();
    for (i, (var, coef)) in terms.iter().enumerate() {
        let name = name_of(*var);
        let sign = if *coef < 0.0 { "-" } else { "+" };
        let magnitude = coef.abs();
        if i == 0 {
            if *coef < 0.0 {
                out.push('-');
            }
        } else {
            let _ = write!(out, " {} ", sign);
        }
        if magnitude != 1.0 {
            let _ = write!(out, "{} ", format_coef(magnitude));
        }
        out.push_str(name);
    }
    out
}

// ==========================================
// Markdown 摘要
// ==========================================

pub fn render_markdown_summary(model: &AllocationModel, status: SolveStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Model Summary\n");
    let _ = writeln!(out, "Generated for model: {}", model.name);
    let _ = writeln!(out, "Status after solve: {}\n", status);

    let _ = writeln!(out, "## Objective Function\n");
    if model.objective().is_empty() {
        let _ = writeln!(out, "No objective function defined.\n");
    } else {
        let _ = writeln!(
            out,
            "{}: maximize {}\n",
            model.objective_name,
            render_terms(model.objective(), |v| model.variable(v).name.as_str())
        );
    }

    let _ = writeln!(out, "## Decision Variables\n");
    if model.variables().is_empty() {
        let _ = writeln!(out, "No decision variables defined.\n");
    } else {
        for var in model.variables() {
            let kind = match var.kind {
                VarKind::Integer => "Integer",
                VarKind::Binary => "Binary",
            };
            match var.upper {
                Some(upper) => {
                    let _ = writeln!(
                        out,
                        "- {}: {} <= {} <= {} ({})",
                        var.name,
                        format_coef(var.lower),
                        var.name,
                        format_coef(upper),
                        kind
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "- {}: {} <= {} ({})",
                        var.name,
                        format_coef(var.lower),
                        var.name,
                        kind
                    );
                }
            }
        }
        out.push('\n');
    }

    let _ = writeln!(out, "## Constraints\n");
    if model.constraints().is_empty() {
        let _ = writeln!(out, "No constraints defined.");
    } else {
        for c in model.constraints() {
            let _ = writeln!(
                out,
                "- {}: {} {} {}",
                c.name,
                render_terms(&c.terms, |v| model.variable(v).name.as_str()),
                c.sense,
                format_coef(c.rhs)
            );
        }
    }
    out
}

// ==========================================
// CPLEX-LP 导出
// ==========================================

pub fn render_lp(model: &AllocationModel) -> String {
    let var_names = unique_lp_names(model.variables().iter().map(|v| v.name.as_str()));
    let row_names = unique_lp_names(
        std::iter::once(model.objective_name.as_str())
            .chain(model.constraints().iter().map(|c| c.name.as_str())),
    );
    let name_of = |v: VarId| var_names[v.index()].as_str();

    let mut out = String::new();
    let _ = writeln!(out, "\\* {} *\\", sanitize_name(&model.name));
    let _ = writeln!(out, "Maximize");
    let _ = writeln!(out, " {}: {}", row_names[0], render_terms(model.objective(), name_of));

    let _ = writeln!(out, "Subject To");
    for (c, row_name) in model.constraints().iter().zip(&row_names[1..]) {
        // 空约束在 LP 中无法表达
        if c.terms.is_empty() {
            continue;
        }
        let op = match c.sense {
            ConstraintSense::LessEq => "<=",
            ConstraintSense::Equal => "=",
        };
        let _ = writeln!(
            out,
            " {}: {} {} {}",
            row_name,
            render_terms(&c.terms, name_of),
            op,
            format_coef(c.rhs)
        );
    }

    let _ = writeln!(out, "Bounds");
    for (var, name) in model.variables().iter().zip(&var_names) {
        if var.kind != VarKind::Integer {
            continue;
        }
        match var.upper {
            Some(upper) => {
                let _ = writeln!(out, " {} <= {} <= {}", format_coef(var.lower), name, format_coef(upper));
            }
            None => {
                let _ = writeln!(out, " {} >= {}", name, format_coef(var.lower));
            }
        }
    }

    for (section, kind) in [("Generals", VarKind::Integer), ("Binaries", VarKind::Binary)] {
        let mut names = model
            .variables()
            .iter()
            .zip(&var_names)
            .filter(|(v, _)| v.kind == kind)
            .map(|(_, name)| name)
            .peekable();
        if names.peek().is_none() {
            continue;
        }
        let _ = writeln!(out, "{}", section);
        for name in names {
            let _ = writeln!(out, " {}", name);
        }
    }

    let _ = writeln!(out, "End");
    out
}

/// 写出 Markdown 摘要
pub fn write_markdown_summary(
    model: &AllocationModel,
    status: SolveStatus,
    path: impl AsRef<Path>,
) -> io::Result<()> {
    let path = path.as_ref();
    fs::write(path, render_markdown_summary(model, status))?;
    info!(path = %path.display(), "模型摘要已写出");
    Ok(())
}

/// 写出 LP 文件
pub fn write_lp(model: &AllocationModel, path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    fs::write(path, render_lp(model))?;
    info!(path = %path.display(), "LP 文件已写出");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::model::ConstraintFamily;

    fn model() -> AllocationModel {
        let mut model = AllocationModel::new(
            "InventoryAllocation",
            vec!["SKU-001".to_string()],
            vec!["STORE 1".to_string()],
        );
        let x = model.quantity_var(0, 0);
        let y = model.indicator_var(0, 0);
        model.set_objective("Maximize_Total_Allocation", vec![(x, 1.0)]);
        model.add_constraint(
            "Supply_Product_SKU-001".to_string(),
            ConstraintFamily::Supply,
            vec![(x, 1.0)],
            ConstraintSense::LessEq,
            70.0,
        );
        model.add_constraint(
            "Link_x_y_Prod_SKU-001_Chan_STORE 1".to_string(),
            ConstraintFamily::IndicatorLink,
            vec![(x, 1.0), (y, -70.0)],
            ConstraintSense::LessEq,
            0.0,
        );
        model
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("allocation_qty_SKU-001_STORE 1"), "allocation_qty_SKU_001_STORE_1");
    }

    #[test]
    fn test_markdown_summary_lists_sections() {
        let text = render_markdown_summary(&model(), SolveStatus::Optimal);
        assert!(text.contains("Generated for model: InventoryAllocation"));
        assert!(text.contains("Status after solve: Optimal"));
        assert!(text.contains("- Supply_Product_SKU-001: allocation_qty_SKU-001_STORE 1 <= 70"));
        assert!(text.contains("(Binary)"));
    }

    #[test]
    fn test_lp_rendering() {
        let lp = render_lp(&model());
        assert!(lp.starts_with("\\* InventoryAllocation *\\\nMaximize\n"));
        assert!(lp.contains(" Maximize_Total_Allocation: allocation_qty_SKU_001_STORE_1\n"));
        assert!(lp.contains(
            " Link_x_y_Prod_SKU_001_Chan_STORE_1: allocation_qty_SKU_001_STORE_1 - 70 is_allocated_SKU_001_STORE_1 <= 0\n"
        ));
        assert!(lp.contains("Generals\n allocation_qty_SKU_001_STORE_1\n"));
        assert!(lp.contains("Binaries\n is_allocated_SKU_001_STORE_1\n"));
        assert!(lp.ends_with("End\n"));
    }

    #[test]
    fn test_lp_names_stay_distinct_after_sanitizing() {
        let mut model = AllocationModel::new(
            "InventoryAllocation",
            vec!["SKU001".to_string()],
            vec!["OUT-1".to_string(), "OUT_1".to_string()],
        );
        let a = model.quantity_var(0, 0);
        let b = model.quantity_var(0, 1);
        model.set_objective("Maximize_Total_Allocation", vec![(a, 1.0), (b, 1.0)]);
        model.add_constraint(
            "Outlet_Cap_OUT-1".to_string(),
            ConstraintFamily::OutletSkuCapacity,
            vec![(a, 1.0)],
            ConstraintSense::LessEq,
            1.0,
        );
        model.add_constraint(
            "Outlet_Cap_OUT_1".to_string(),
            ConstraintFamily::OutletSkuCapacity,
            vec![(b, 1.0)],
            ConstraintSense::LessEq,
            2.0,
        );

        let lp = render_lp(&model);
        assert!(lp.contains(
            " Maximize_Total_Allocation: allocation_qty_SKU001_OUT_1 + allocation_qty_SKU001_OUT_1_1\n"
        ));
        assert!(lp.contains(" Outlet_Cap_OUT_1: allocation_qty_SKU001_OUT_1 <= 1\n"));
        assert!(lp.contains(" Outlet_Cap_OUT_1_2: allocation_qty_SKU001_OUT_1_1 <= 2\n"));
        assert!(lp.contains(" is_allocated_SKU001_OUT_1_3\n"));
    }
}
