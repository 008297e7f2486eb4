// ==========================================
// 库存分配优化系统 - 命令行入口
// ==========================================
// 用法:
//   nw-allocation <request.json> [config.json]
//
// 读取 JSON 请求 → 按配置补全规则表/需求 → 求解 → 打印决策 → 写出导出文件
// 非 Optimal 状态以非零退出码结束
// ==========================================

use anyhow::{bail, Context};
use nw_allocation::api::{AllocationApi, ApiError};
use nw_allocation::config::AllocationConfig;
use nw_allocation::domain::AllocationRequest;
use nw_allocation::logging;
use std::path::PathBuf;
use std::process::ExitCode;

fn print_usage() {
    eprintln!("用法: nw-allocation <request.json> [config.json]");
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let request_path = match args.next() {
        Some(path) => PathBuf::from(path),
        None => {
            print_usage();
            return Ok(ExitCode::from(2));
        }
    };
    let config_path = args
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", nw_allocation::APP_NAME, nw_allocation::VERSION);
    tracing::info!("==================================================");

    let config = AllocationConfig::load(config_path.as_deref()).context("加载配置失败")?;

    let raw = std::fs::read_to_string(&request_path)
        .with_context(|| format!("读取请求文件失败: {}", request_path.display()))?;
    let request: AllocationRequest = serde_json::from_str(&raw)
        .with_context(|| format!("解析请求文件失败: {}", request_path.display()))?;

    let api = AllocationApi::new(config);
    let request = api.load_request_from_tables(request)?;

    match api.auto_allocate(request).await {
        Ok(response) => {
            for decision in &response.allocations {
                println!(
                    "{}\t{}\t{}",
                    decision.product_sku, decision.channel_id, decision.quantity
                );
            }
            println!(
                "run_id={} status={} allocations={} total_quantity={}",
                response.run_id, response.status, response.allocations_created, response.total_quantity
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(ApiError::SolveNotOptimal { status }) => {
            eprintln!("求解未得到最优解: status={}", status);
            Ok(ExitCode::FAILURE)
        }
        Err(ApiError::ValidationError { violations, .. }) => {
            for violation in &violations {
                eprintln!("{}", violation);
            }
            bail!("请求校验失败（{} 项）", violations.len())
        }
        Err(err) => Err(err.into()),
    }
}
