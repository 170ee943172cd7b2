// apps/gv_cli/src/main.rs

//! GeoViz 命令行界面
//!
//! 场景融合与状态同步的命令行宿主。渲染与文件格式解析不在本工具范围内，
//! `demo` 命令在内存中生成一个合成场景来演示完整流程。

mod commands;
mod synthetic;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// GeoViz 地球物理场景融合命令行工具
#[derive(Parser)]
#[command(name = "gv_cli")]
#[command(author = "GeoViz Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "GeoViz geophysical scene fusion", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 融合合成场景并执行一组控制意图
    Demo(commands::demo::DemoArgs),
    /// 显示信息
    Info(commands::info::InfoArgs),
    /// 验证配置
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Demo(args) => commands::demo::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
