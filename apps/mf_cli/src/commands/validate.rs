// apps/mf_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 解析并验证运行配置，对可疑但合法的取值给出警告。

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use mf_config::{CoordinateKind, MultiHydroConfig};
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,

    /// 输出补全默认值后的配置
    #[arg(long)]
    pub write_resolved: Option<PathBuf>,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== MultiFluid 配置验证 ===");

    let mut result = ValidationResult::default();
    match MultiHydroConfig::from_file(&args.config) {
        Ok(config) => {
            check_ranges(&config, &mut result);
            if let Some(path) = &args.write_resolved {
                config.to_file(path)?;
                println!("已写出补全配置: {}", path.display());
            }
        }
        Err(e) => result.add_error(e.to_string()),
    }

    print_validation_result(&result, args.strict)
}

fn check_ranges(config: &MultiHydroConfig, result: &mut ValidationResult) {
    if config.e_crit < 0.05 || config.e_crit > 2.0 {
        result.add_warning(format!(
            "e_crit = {} GeV/fm³ 超出常用范围 [0.05, 2]",
            config.e_crit
        ));
    }
    let g = &config.grid;
    let min_spacing = g.dx.min(g.dy).min(g.dz);
    if config.coordinates == CoordinateKind::Cartesian && config.dtau > min_spacing {
        result.add_warning(format!(
            "dtau = {} 大于最小网格间距 {}，冻结面可能跨越多个单元",
            config.dtau, min_spacing
        ));
    }
    if config.coordinates == CoordinateKind::Milne && g.nz > 1 && g.dz > 1.0 {
        result.add_warning(format!("Δη = {} 较大", g.dz));
    }
    if config.friction.formation_time > 0.0 && config.friction.formation_time < config.dtau {
        result.add_warning("形成时间小于 dtau，推迟交付退化为插值");
    }
    if config.freezeout.finder_resolution < 2 {
        result.add_warning("finder_resolution = 1 时质心精度较低");
    }
    if config.output.energy_density_interval > config.run.n_steps {
        result.add_warning("能量密度输出间隔大于总步数，不会有输出");
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    let success = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };

    if success {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}
