// apps/mf_cli/src/main.rs

//! MultiFluid 命令行界面
//!
//! 读取 JSON 运行配置，构建三流体耦合并提取冻结超曲面。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 4: Application**，只通过 `MultiHydroConfig`
//! 与 `Box<dyn Hydro>` 接触物理层。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// MultiFluid 三流体冻结面提取命令行工具
#[derive(Parser)]
#[command(name = "mf_cli")]
#[command(author = "MultiFluid Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Three-fluid friction coupling and freeze-out extraction", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行耦合并写出冻结面
    Run(commands::run::RunArgs),
    /// 验证配置
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

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
        Commands::Run(args) => commands::run::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
