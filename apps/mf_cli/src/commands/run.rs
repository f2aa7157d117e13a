// apps/mf_cli/src/commands/run.rs

//! 运行命令
//!
//! 由配置构建两块相向运动的冷核物质（弹核、靶核）与空火球，
//! 推进给定步数并在输出目录写出冻结面与运行摘要。

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use mf_config::{CoordinateKind, MultiHydroConfig};
use mf_physics::conservation::{ConservationReport, ConservedTotals};
use mf_physics::prelude::*;
use mf_physics::types::PhysicalConstants;
use serde::Serialize;
use tracing::{info, warn};

/// 质子数与质量数之比
const CHARGE_FRACTION: f64 = 0.4;

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径（缺省使用默认配置）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 输出目录（覆盖配置）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 步数（覆盖配置）
    #[arg(short = 'n', long)]
    pub steps: Option<usize>,
}

/// 写入 summary.json 的运行摘要
#[derive(Serialize)]
struct RunSummary {
    steps: usize,
    tau: f64,
    friction_model: &'static str,
    surface_elements: usize,
    v_eff: f64,
    surface_energy: f64,
    initial: ConservedTotals,
    last: ConservedTotals,
    retarded_energy: f64,
    conservation: ConservationReport,
    last_step: Option<StepReport>,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== MultiFluid 运行启动 ===");

    let mut config = match &args.config {
        Some(path) => MultiHydroConfig::from_file(path)
            .with_context(|| format!("读取配置失败: {}", path.display()))?,
        None => MultiHydroConfig::default(),
    };
    if let Some(dir) = args.output {
        config.output.directory = dir;
    }
    if let Some(steps) = args.steps {
        config.run.n_steps = steps;
    }

    info!(
        "网格 {}×{}×{}, √s_NN = {} GeV, e_crit = {} GeV/fm³, 摩擦: {}",
        config.grid.nx,
        config.grid.ny,
        config.grid.nz,
        config.snn,
        config.e_crit,
        if config.uses_simplified_friction() { "简化" } else { "微观" }
    );

    let hydros = build_hydros(&config).context("构建初始流体失败")?;
    let mut multi = MultiHydro::new(
        hydros,
        Box::new(IdealGasEos::default()),
        Box::new(ConstantTransport::inviscid()),
        Box::new(ParametrizedCrossSections::default()),
        MultiHydroSettings::from_config(&config),
    )
    .context("构建三流体耦合失败")?;
    multi
        .init_output(&config.output.directory)
        .with_context(|| format!("打开输出目录失败: {}", config.output.directory.display()))?;

    let initial = multi.conserved_totals();
    let start = Instant::now();
    let mut last_step = None;
    for _ in 0..config.run.n_steps {
        let report = multi.perform_step().context("时间步失败")?;
        if report.dropped_elements > 0 {
            warn!("步 {}: 丢弃 {} 个面元", report.step, report.dropped_elements);
        }
        last_step = Some(report);
    }
    let elapsed = start.elapsed();

    let last = multi.conserved_totals();
    let retarded_energy = multi.retarded_energy_in_flight();
    let tau = multi.tau();
    let friction_model = multi.friction_model();
    let totals = multi.finish().context("刷新输出失败")?;
    let surface_energy = totals.energy.combined_net();
    let conservation = ConservationReport::between(&initial, &last, surface_energy);

    info!("=== 运行完成 ===");
    info!("总步数: {}, τ = {:.4} fm/c", config.run.n_steps, tau);
    info!("计算时间: {:.2} s", elapsed.as_secs_f64());
    info!("冻结面元: {}, V_eff = {:.6e} fm³", totals.elements(), totals.v_eff());
    info!(
        "阈值以上损失能量 {:.6e} GeV, 冻结面净能量 {:.6e} GeV, 相对偏差 {:.3e}",
        conservation.fluid_energy_lost, surface_energy, conservation.relative_mismatch
    );
    for kind in FluidKind::ALL {
        info!(
            "{}: 冻结面能量 +{:.6e} / -{:.6e} GeV, V_eff = {:.6e} fm³",
            kind,
            totals.energy.positive(kind),
            totals.energy.negative(kind),
            totals.v_eff_fluid(kind)
        );
    }

    let summary = RunSummary {
        steps: config.run.n_steps,
        tau,
        friction_model,
        surface_elements: totals.elements(),
        v_eff: totals.v_eff(),
        surface_energy,
        initial,
        last,
        retarded_energy,
        conservation,
        last_step,
    };
    let path = config.output.directory.join("summary.json");
    let json = serde_json::to_string_pretty(&summary)?;
    std::fs::write(&path, json).with_context(|| format!("写入 {} 失败", path.display()))?;
    info!("摘要: {}", path.display());

    Ok(())
}

/// 两块相向运动的冷核物质与空火球
fn build_hydros(config: &MultiHydroConfig) -> Result<[Box<dyn Hydro>; 3]> {
    let geometry = GridGeometry::from_config(&config.grid)?;
    let coordinates = CoordinateSystem::from(config.coordinates);
    let eos = IdealGasEos::default();

    // 核子-核子质心系中的 γ 与速度
    let gamma = config.snn / (2.0 * PhysicalConstants::NUCLEON_MASS);
    let velocity = (1.0 - 1.0 / (gamma * gamma)).sqrt();

    let nb = PhysicalConstants::SATURATION_DENSITY;
    let e = nb * PhysicalConstants::NUCLEON_MASS;
    let densities = [nb, CHARGE_FRACTION * nb, 0.0];
    let weight = coordinates.weight(config.tau0);

    let extent_x = geometry.dims.nx() as f64 * geometry.dx;
    let extent_y = geometry.dims.ny() as f64 * geometry.dy;
    let radius = 0.4 * extent_x.min(extent_y);
    let thickness = 2.0 * radius / gamma + 0.5 * geometry.dz;
    info!(
        "γ = {:.3}, v = {:.5}, 半径 {:.2} fm, 厚度 {:.3}",
        gamma, velocity, radius, thickness
    );

    let mut projectile = Fluid::new(geometry, coordinates);
    let mut target = Fluid::new(geometry, coordinates);
    let p_cell = Cell::from_primitive(e, densities, [0.0, 0.0, velocity], &eos, weight)?;
    let t_cell = Cell::from_primitive(e, densities, [0.0, 0.0, -velocity], &eos, weight)?;
    for (i, (ix, iy, iz)) in geometry.dims.iter().enumerate() {
        let (x, y, z) = (geometry.x(ix), geometry.y(iy), geometry.z(iz));
        if x * x + y * y > radius * radius {
            continue;
        }
        if z < 0.0 && z >= -thickness {
            *projectile.cell_at_mut(i) = p_cell;
        } else if z > 0.0 && z <= thickness {
            *target.cell_at_mut(i) = t_cell;
        }
    }
    let fireball = Fluid::new(geometry, coordinates);

    let (tau0, dtau) = (config.tau0, config.dtau);
    let hydros: [Box<dyn Hydro>; 3] = match config.coordinates {
        CoordinateKind::Cartesian => [
            Box::new(StaticHydro::new(projectile, tau0, dtau)),
            Box::new(StaticHydro::new(target, tau0, dtau)),
            Box::new(StaticHydro::new(fireball, tau0, dtau)),
        ],
        CoordinateKind::Milne => [
            Box::new(BjorkenHydro::new(projectile, tau0, dtau)?),
            Box::new(BjorkenHydro::new(target, tau0, dtau)?),
            Box::new(BjorkenHydro::new(fireball, tau0, dtau)?),
        ],
    };
    Ok(hydros)
}
