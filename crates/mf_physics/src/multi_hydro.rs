// crates/mf_physics/src/multi_hydro.rs

//! 三流体耦合与冻结面提取
//!
//! 每个全局时间步：
//!
//! 1. 三个 [`Hydro`] 各推进一步
//! 2. 摩擦子步：并行计算每个单元的摩擦力，串行施加为源项；
//!    火球份额经推迟缓冲在形成时间后交付
//! 3. 交换能量密度双缓冲并按判据重算当前层
//! 4. 扫描全部超立方体，提取冻结面元并写出记录
//!
//! 并行阶段只读快照，写入全部在并行阶段之后按固定顺序进行，输出可复现。

use std::path::Path;

use mf_config::MultiHydroConfig;
use mf_foundation::{KahanSum, MfError};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::conservation::ConservedTotals;
use crate::cross_sections::CrossSections;
use crate::energy_density::{
    cell_energy_density, energy_momentum_tensor, CellContext, EnergyDensityCriterion,
    EnergyDensityField,
};
use crate::eos::{Eos, ThermoState};
use crate::error::{PhysicsError, PhysicsResult};
use crate::fluid::{Cell, Fluid, GridGeometry};
use crate::freezeout::{
    evaluate_element, CubeCells, ElementOutcome, EvaluationContext, FreezeoutRecord,
    SurfaceEnergyTotals, SurfaceTotals,
};
use crate::friction::{
    select_model, FluidSample, FrictionForces, FrictionInput, FrictionModel,
    RetardedFrictionBuffer,
};
use crate::hydro::Hydro;
use crate::output::{EnergyDensityWriter, FreezeoutSinks, SurfaceCategory};
use crate::surface::{Hypercube, ProjectionFinder, SurfaceFinder};
use crate::tensor::{EigenSelection, Tensor4};
use crate::transport::TransportCoeff;
use crate::types::{CoordinateSystem, FluidKind};

// ============================================================
// 设置
// ============================================================

/// 耦合参数
#[derive(Debug, Clone, PartialEq)]
pub struct MultiHydroSettings {
    /// 时间步长
    pub dtau: f64,
    /// 冻结能量密度 [GeV/fm³]
    pub e_crit: f64,
    /// √s_NN [GeV]
    pub sqrt_snn: f64,
    /// 简化摩擦强度，0 使用微观摩擦
    pub lambda: f64,
    /// 形成时间 [fm/c]
    pub formation_time: f64,
    /// 火球参与摩擦的最低温度 [GeV]
    pub min_fireball_temperature: f64,
    /// 能量密度判据
    pub criterion: EnergyDensityCriterion,
    /// Landau 本征向量选择
    pub eigen_selection: EigenSelection,
    /// 曲面查找分辨率
    pub finder_resolution: usize,
    /// info 日志间隔（步）
    pub log_interval: usize,
    /// 能量密度切片输出间隔（步），0 关闭
    pub energy_density_interval: usize,
}

impl Default for MultiHydroSettings {
    fn default() -> Self {
        Self::from_config(&MultiHydroConfig::default())
    }
}

impl MultiHydroSettings {
    /// 由配置构造
    pub fn from_config(config: &MultiHydroConfig) -> Self {
        Self {
            dtau: config.dtau,
            e_crit: config.e_crit,
            sqrt_snn: config.snn,
            lambda: config.friction.lambda,
            formation_time: config.friction.formation_time,
            min_fireball_temperature: config.friction.min_fireball_temperature,
            criterion: config.freezeout.criterion.into(),
            eigen_selection: config.freezeout.eigen_selection.into(),
            finder_resolution: config.freezeout.finder_resolution,
            log_interval: config.run.log_interval,
            energy_density_interval: config.output.energy_density_interval,
        }
    }

    /// 检查参数
    pub fn validate(&self) -> PhysicsResult<()> {
        let positive = [("dtau", self.dtau), ("e_crit", self.e_crit)];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(MfError::invalid_config(key, value.to_string(), "必须为正").into());
            }
        }
        let non_negative = [
            ("lambda", self.lambda),
            ("formation_time", self.formation_time),
            ("min_fireball_temperature", self.min_fireball_temperature),
        ];
        for (key, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(MfError::invalid_config(key, value.to_string(), "不能为负").into());
            }
        }
        if self.finder_resolution == 0 {
            return Err(MfError::invalid_config("finder_resolution", "0", "至少为 1").into());
        }
        Ok(())
    }
}

// ============================================================
// 步报告
// ============================================================

/// 单步摘要
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StepReport {
    /// 步序号（从 1 开始）
    pub step: usize,
    /// 步末固有时
    pub tau: f64,
    /// 本步面元数
    pub surface_elements: usize,
    /// 含退化单元而跳过的超立方体
    pub degenerate_cubes: usize,
    /// 当前层退化单元数
    pub degenerate_cells: usize,
    /// Landau 标架退化而丢弃的面元
    pub dropped_elements: usize,
    /// 火球从摩擦获得的能量
    pub friction_energy: f64,
}

/// 冻结面扫描摘要
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FreezeoutSummary {
    /// 写出的面元
    pub elements: usize,
    /// 跳过的超立方体
    pub degenerate_cubes: usize,
    /// 丢弃的面元
    pub dropped_elements: usize,
}

enum CubeOutcome {
    Inactive,
    Degenerate,
    Elements {
        outcomes: Vec<ElementOutcome>,
        dropped: usize,
    },
}

// ============================================================
// 超立方体扫描（只读）
// ============================================================

struct CubeScan<'a> {
    geometry: GridGeometry,
    layers: [&'a [f64]; 2],
    snapshots: [[&'a [Cell]; 3]; 2],
    taus: [f64; 2],
    finder: &'a dyn SurfaceFinder,
    ctx: EvaluationContext<'a>,
    e_crit: f64,
}

impl CubeScan<'_> {
    fn evaluate(&self, cube_index: usize) -> PhysicsResult<CubeOutcome> {
        let dims = self.geometry.dims;
        let (cx, cy, _) = dims.cubes();
        let ix = cube_index % cx;
        let iy = (cube_index / cx) % cy;
        let iz = cube_index / (cx * cy);
        let step = |n: usize| usize::from(n > 1);
        let (sx, sy, sz) = (step(dims.nx()), step(dims.ny()), step(dims.nz()));

        let mut corners = [0usize; 8];
        for (bits, corner) in corners.iter_mut().enumerate() {
            let (ax, ay, az) = ((bits >> 2) & 1, (bits >> 1) & 1, bits & 1);
            *corner = dims.offset(ix + ax * sx, iy + ay * sy, iz + az * sz);
        }

        let mut values = [0.0; 16];
        for (idx, v) in values.iter_mut().enumerate() {
            *v = self.layers[idx >> 3][corners[idx & 7]];
        }
        let cube = Hypercube {
            values,
            extents: [
                self.taus[1] - self.taus[0],
                self.geometry.dx,
                self.geometry.dy,
                self.geometry.dz,
            ],
        };
        if !cube.is_finite() {
            return Ok(CubeOutcome::Degenerate);
        }
        if !cube.crosses(self.e_crit) {
            return Ok(CubeOutcome::Inactive);
        }

        let cells = CubeCells {
            snapshots: self.snapshots,
            corners,
            taus: self.taus,
        };
        let origin = [
            self.taus[0],
            self.geometry.x(ix),
            self.geometry.y(iy),
            self.geometry.z(iz),
        ];
        let mut outcomes = Vec::new();
        let mut dropped = 0;
        for element in self.finder.find(&cube, self.e_crit) {
            match evaluate_element(&element, &cube, &cells, origin, &self.ctx)? {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    warn!(ix, iy, iz, "冻结面元被丢弃: {err}");
                    dropped += 1;
                }
            }
        }
        Ok(CubeOutcome::Elements { outcomes, dropped })
    }
}

// ============================================================
// 三流体耦合
// ============================================================

/// 三流体耦合器
pub struct MultiHydro {
    hydros: [Box<dyn Hydro>; 3],
    eos: Box<dyn Eos>,
    transport: Box<dyn TransportCoeff>,
    friction: Box<dyn FrictionModel>,
    finder: Box<dyn SurfaceFinder>,
    retarded: RetardedFrictionBuffer,
    field: EnergyDensityField,
    /// `[上一层, 当前层][流体]`
    snapshots: [[Vec<Cell>; 3]; 2],
    snapshot_taus: [f64; 2],
    geometry: GridGeometry,
    coordinates: CoordinateSystem,
    settings: MultiHydroSettings,
    sinks: Option<FreezeoutSinks>,
    energy_writer: Option<EnergyDensityWriter>,
    totals: SurfaceTotals,
    step: usize,
}

/// 三个流体必须共享同一网格与坐标系
fn check_layout(hydros: &[Box<dyn Hydro>; 3]) -> PhysicsResult<(GridGeometry, CoordinateSystem)> {
    let reference = hydros[0].fluid();
    let geometry = *reference.geometry();
    let coordinates = reference.coordinates();
    for (kind, hydro) in FluidKind::ALL.iter().zip(hydros.iter()).skip(1) {
        let fluid = hydro.fluid();
        let other = fluid.geometry();
        if !geometry.same_layout(other) {
            return Err(PhysicsError::grid_mismatch(
                format!("{kind} 网格"),
                format!("{} (dx={}, dy={}, dz={})", geometry.dims, geometry.dx, geometry.dy, geometry.dz),
                format!("{} (dx={}, dy={}, dz={})", other.dims, other.dx, other.dy, other.dz),
            ));
        }
        if fluid.coordinates() != coordinates {
            return Err(PhysicsError::grid_mismatch(
                format!("{kind} 坐标系"),
                format!("{coordinates:?}"),
                format!("{:?}", fluid.coordinates()),
            ));
        }
    }
    Ok((geometry, coordinates))
}

fn sample(
    cell: &Cell,
    eos: &dyn Eos,
    tau: f64,
    coordinates: CoordinateSystem,
    with_thermo: bool,
) -> PhysicsResult<FluidSample> {
    let prim = cell.prim_var(eos, tau, coordinates)?;
    if prim.is_vacuum() {
        return Ok(FluidSample::vacuum());
    }
    let thermo = if with_thermo {
        eos.eos(prim.e, prim.nb, prim.nq, prim.ns)?
    } else {
        ThermoState::default()
    };
    Ok(FluidSample::from_primitive(&prim, thermo))
}

#[inline]
fn scaled(v: &[f64; 4], factor: f64) -> [f64; 4] {
    v.map(|x| x * factor)
}

impl MultiHydro {
    /// 创建耦合器
    ///
    /// 三个流体必须共享网格与坐标系，固有时与步长必须一致。
    /// 摩擦模型按 `lambda` 选择，曲面查找使用 [`ProjectionFinder`]。
    pub fn new(
        hydros: [Box<dyn Hydro>; 3],
        eos: Box<dyn Eos>,
        transport: Box<dyn TransportCoeff>,
        cross_sections: Box<dyn CrossSections>,
        settings: MultiHydroSettings,
    ) -> PhysicsResult<Self> {
        settings.validate()?;
        let (geometry, coordinates) = check_layout(&hydros)?;

        let tau = hydros[0].tau();
        for hydro in hydros.iter() {
            if (hydro.tau() - tau).abs() > 1e-12 * tau.abs().max(1.0) {
                return Err(PhysicsError::grid_mismatch("tau", tau, hydro.tau()));
            }
            if (hydro.dtau() - settings.dtau).abs() > 1e-12 * settings.dtau {
                return Err(MfError::invalid_config(
                    "dtau",
                    hydro.dtau().to_string(),
                    "与耦合步长不一致",
                )
                .into());
            }
        }

        let friction = select_model(
            settings.lambda,
            settings.sqrt_snn,
            settings.min_fireball_temperature,
            cross_sections,
        );
        let n = geometry.dims.len();
        let current: [Vec<Cell>; 3] = [
            hydros[0].fluid().cells().to_vec(),
            hydros[1].fluid().cells().to_vec(),
            hydros[2].fluid().cells().to_vec(),
        ];

        let mut multi = Self {
            retarded: RetardedFrictionBuffer::new(n, settings.formation_time, settings.dtau),
            field: EnergyDensityField::new(geometry.dims),
            snapshots: [current.clone(), current],
            snapshot_taus: [tau, tau],
            finder: Box::new(ProjectionFinder::new(settings.finder_resolution)),
            hydros,
            eos,
            transport,
            friction,
            geometry,
            coordinates,
            settings,
            sinks: None,
            energy_writer: None,
            totals: SurfaceTotals::default(),
            step: 0,
        };

        let values = multi.compute_energy_density(multi.settings.criterion)?;
        multi.field.set_current(values)?;
        multi.field.sync_previous();

        info!(
            grid = %multi.geometry.dims,
            tau,
            e_crit = multi.settings.e_crit,
            friction = multi.friction.name(),
            eos = multi.eos.name(),
            "三流体耦合初始化"
        );
        Ok(multi)
    }

    /// 替换曲面查找器
    pub fn with_surface_finder(mut self, finder: Box<dyn SurfaceFinder>) -> Self {
        self.finder = finder;
        self
    }

    /// 替换摩擦模型
    pub fn with_friction_model(mut self, friction: Box<dyn FrictionModel>) -> Self {
        self.friction = friction;
        self
    }

    /// 注入输出汇
    pub fn with_sinks(mut self, sinks: FreezeoutSinks) -> Self {
        self.sinks = Some(sinks);
        self
    }

    /// 在目录下打开冻结面输出（及能量密度切片输出）
    pub fn init_output(&mut self, dir: impl AsRef<Path>) -> PhysicsResult<()> {
        let dir = dir.as_ref();
        self.sinks = Some(FreezeoutSinks::init_output(dir)?);
        if self.settings.energy_density_interval > 0 {
            self.energy_writer = Some(EnergyDensityWriter::create(dir)?);
        }
        info!(dir = %dir.display(), "冻结面输出已打开");
        Ok(())
    }

    // ------------------------------------------------------------
    // 访问器
    // ------------------------------------------------------------

    /// 当前固有时
    pub fn tau(&self) -> f64 {
        self.hydros[0].tau()
    }

    /// 已完成的步数
    pub fn step(&self) -> usize {
        self.step
    }

    /// 参数
    pub fn settings(&self) -> &MultiHydroSettings {
        &self.settings
    }

    /// 网格几何
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// 坐标系
    pub fn coordinates(&self) -> CoordinateSystem {
        self.coordinates
    }

    /// 流体
    pub fn fluid(&self, kind: FluidKind) -> &Fluid {
        self.hydros[kind.index()].fluid()
    }

    /// 流体（可变）
    pub fn fluid_mut(&mut self, kind: FluidKind) -> &mut Fluid {
        self.hydros[kind.index()].fluid_mut()
    }

    /// 能量密度场
    pub fn energy_density(&self) -> &EnergyDensityField {
        &self.field
    }

    /// 冻结面累计量
    pub fn surface_totals(&self) -> &SurfaceTotals {
        &self.totals
    }

    /// 冻结面能量累计
    pub fn surface_energy(&self) -> &SurfaceEnergyTotals {
        &self.totals.energy
    }

    /// 摩擦模型名称
    pub fn friction_model(&self) -> &'static str {
        self.friction.name()
    }

    /// 当前守恒量快照
    pub fn conserved_totals(&self) -> ConservedTotals {
        ConservedTotals::compute(
            [self.fluid(FluidKind::Projectile), self.fluid(FluidKind::Target), self.fluid(FluidKind::Fireball)],
            self.tau(),
            self.field.current(),
            self.settings.e_crit,
        )
    }

    /// 已发射、尚未交付给火球的能量
    pub fn retarded_energy_in_flight(&self) -> f64 {
        self.retarded.in_flight(self.tau())[0] * self.settings.dtau * self.geometry.cell_volume()
    }

    fn viscous(&self) -> bool {
        self.transport.is_viscous()
    }

    fn cell_context(&self) -> CellContext<'_> {
        CellContext {
            eos: self.eos.as_ref(),
            tau: self.tau(),
            coordinates: self.coordinates,
            viscous: self.viscous(),
        }
    }

    // ------------------------------------------------------------
    // 时间步
    // ------------------------------------------------------------

    /// 推进一个全局时间步
    pub fn perform_step(&mut self) -> PhysicsResult<StepReport> {
        for hydro in self.hydros.iter_mut() {
            hydro.perform_step(self.eos.as_ref())?;
        }
        let friction_energy = self.friction_substep()?;
        let degenerate_cells = self.update_energy_density()?;
        let summary = self.find_freezeout()?;
        self.step += 1;

        let interval = self.settings.energy_density_interval;
        if interval > 0 && self.step % interval == 0 {
            self.output_energy_density()?;
        }

        let report = StepReport {
            step: self.step,
            tau: self.tau(),
            surface_elements: summary.elements,
            degenerate_cubes: summary.degenerate_cubes,
            degenerate_cells,
            dropped_elements: summary.dropped_elements,
            friction_energy,
        };
        debug!(
            step = report.step,
            tau = report.tau,
            elements = report.surface_elements,
            friction_energy = report.friction_energy,
            "步完成"
        );
        if self.step % self.settings.log_interval.max(1) == 0 {
            info!(
                "步 {} τ={:.4} 面元 {} 累计面元 {} 冻结面净能量 {:.6e} 推迟能量 {:.6e}",
                self.step,
                report.tau,
                report.surface_elements,
                self.totals.elements(),
                self.totals.energy.combined_net(),
                self.retarded_energy_in_flight()
            );
        }
        Ok(report)
    }

    /// 摩擦子步，返回火球获得的能量
    pub fn friction_substep(&mut self) -> PhysicsResult<f64> {
        let tau = self.tau();
        let dtau = self.settings.dtau;
        let weight = self.coordinates.weight(tau);
        let volume = self.geometry.cell_volume();
        let n = self.geometry.dims.len();

        // 并行计算
        let forces: Vec<FrictionForces> = {
            let eos = self.eos.as_ref();
            let friction = self.friction.as_ref();
            let coordinates = self.coordinates;
            let [p, t, f] = &self.hydros;
            let (fp, ft, ff) = (p.fluid(), t.fluid(), f.fluid());
            (0..n)
                .into_par_iter()
                .map(|i| -> PhysicsResult<FrictionForces> {
                    let input = FrictionInput {
                        projectile: sample(fp.cell_at(i), eos, tau, coordinates, false)?,
                        target: sample(ft.cell_at(i), eos, tau, coordinates, false)?,
                        fireball: sample(ff.cell_at(i), eos, tau, coordinates, true)?,
                    };
                    let forces = friction.compute(&input);
                    if !forces.is_valid() {
                        return Err(PhysicsError::NonPhysicalState {
                            cell: i,
                            reason: "摩擦力非有限".into(),
                        });
                    }
                    Ok(forces)
                })
                .collect::<PhysicsResult<Vec<_>>>()?
        };

        // 串行施加
        let mut exchanged = KahanSum::new();
        let mut fireball_rate = Vec::with_capacity(n);
        {
            let [p, t, _] = &mut self.hydros;
            let (fp, ft) = (p.fluid_mut(), t.fluid_mut());
            for (i, force) in forces.iter().enumerate() {
                fp.cell_at_mut(i)
                    .add_energy_momentum(&scaled(&force.projectile, weight * dtau));
                ft.cell_at_mut(i)
                    .add_energy_momentum(&scaled(&force.target, weight * dtau));
                fireball_rate.push(scaled(&force.fireball, weight));
                exchanged.add(force.fireball[0] * weight * dtau * volume);
            }
        }

        self.retarded.add_slice(tau, &fireball_rate)?;
        for i in 0..n {
            let delivered = self.calculate_retarded_friction(i, tau);
            self.hydros[FluidKind::Fireball.index()]
                .fluid_mut()
                .cell_at_mut(i)
                .add_energy_momentum(&scaled(&delivered, dtau));
        }
        self.clear_retarded_friction(tau);

        Ok(exchanged.value())
    }

    /// 登记单元的火球源项率
    pub fn add_retarded_friction(&mut self, flux: &[f64; 4], cell: usize, tau: f64) -> PhysicsResult<()> {
        self.retarded.add(flux, cell, tau)
    }

    /// τ 时交付给单元的火球源项率
    pub fn calculate_retarded_friction(&self, cell: usize, tau: f64) -> [f64; 4] {
        self.retarded.calculate(cell, tau)
    }

    /// 淘汰过期的推迟源项
    pub fn clear_retarded_friction(&mut self, tau: f64) {
        self.retarded.clear(tau);
    }

    // ------------------------------------------------------------
    // 能量密度
    // ------------------------------------------------------------

    /// 单元三流体能动张量之和
    pub fn energy_momentum_tensor(&self, ix: usize, iy: usize, iz: usize) -> PhysicsResult<Tensor4> {
        let i = self.geometry.dims.checked_offset(ix, iy, iz)?;
        let [p, t, f] = &self.hydros;
        energy_momentum_tensor(
            [p.fluid().cell_at(i), t.fluid().cell_at(i), f.fluid().cell_at(i)],
            &self.cell_context(),
        )
    }

    /// 按判据计算整个网格的能量密度（不写入场）
    pub fn compute_energy_density(&self, criterion: EnergyDensityCriterion) -> PhysicsResult<Vec<f64>> {
        let ctx = self.cell_context();
        let selection = self.settings.eigen_selection;
        let [p, t, f] = &self.hydros;
        let (cp, ct, cf) = (p.fluid().cells(), t.fluid().cells(), f.fluid().cells());
        (0..self.geometry.dims.len())
            .into_par_iter()
            .map(|i| cell_energy_density(criterion, selection, [&cp[i], &ct[i], &cf[i]], &ctx))
            .collect()
    }

    /// 交换双缓冲并重算当前层，返回退化单元数
    pub fn update_energy_density(&mut self) -> PhysicsResult<usize> {
        self.field.swap();
        self.snapshots.swap(0, 1);
        for (snapshot, hydro) in self.snapshots[1].iter_mut().zip(self.hydros.iter()) {
            snapshot.clear();
            snapshot.extend_from_slice(hydro.fluid().cells());
        }
        self.snapshot_taus = [self.snapshot_taus[1], self.tau()];

        let values = self.compute_energy_density(self.settings.criterion)?;
        self.field.set_current(values)?;

        let degenerate = self.field.degenerate_count();
        if degenerate > 0 {
            warn!(degenerate, tau = self.tau(), "Landau 标架退化的单元被跳过");
        }
        Ok(degenerate)
    }

    // ------------------------------------------------------------
    // 冻结面
    // ------------------------------------------------------------

    /// 扫描全部超立方体并记录面元
    pub fn find_freezeout(&mut self) -> PhysicsResult<FreezeoutSummary> {
        let mut summary = FreezeoutSummary::default();
        if self.snapshot_taus[1] <= self.snapshot_taus[0] {
            return Ok(summary);
        }

        let outcomes: Vec<CubeOutcome> = {
            let scan = CubeScan {
                geometry: self.geometry,
                layers: [self.field.previous(), self.field.current()],
                snapshots: [
                    [&self.snapshots[0][0][..], &self.snapshots[0][1][..], &self.snapshots[0][2][..]],
                    [&self.snapshots[1][0][..], &self.snapshots[1][1][..], &self.snapshots[1][2][..]],
                ],
                taus: self.snapshot_taus,
                finder: self.finder.as_ref(),
                ctx: EvaluationContext {
                    eos: self.eos.as_ref(),
                    coordinates: self.coordinates,
                    viscous: self.viscous(),
                    selection: self.settings.eigen_selection,
                },
                e_crit: self.settings.e_crit,
            };
            let (cx, cy, cz) = self.geometry.dims.cubes();
            (0..cx * cy * cz)
                .into_par_iter()
                .map(|c| scan.evaluate(c))
                .collect::<PhysicsResult<Vec<_>>>()?
        };

        for outcome in outcomes {
            match outcome {
                CubeOutcome::Inactive => {}
                CubeOutcome::Degenerate => summary.degenerate_cubes += 1,
                CubeOutcome::Elements { outcomes, dropped } => {
                    summary.dropped_elements += dropped;
                    for element in &outcomes {
                        self.record_element(element)?;
                        summary.elements += 1;
                    }
                }
            }
        }
        if summary.degenerate_cubes > 0 {
            debug!(skipped = summary.degenerate_cubes, "跳过含退化单元的超立方体");
        }
        Ok(summary)
    }

    fn record_element(&mut self, element: &ElementOutcome) -> PhysicsResult<()> {
        self.totals.record(element);
        self.print_freezeout(SurfaceCategory::All, &element.combined)?;
        for kind in FluidKind::ALL {
            if let Some(record) = &element.fluids[kind.index()] {
                self.print_freezeout(kind.into(), record)?;
            }
        }
        Ok(())
    }

    /// 写出一条冻结记录；未打开输出时丢弃
    pub fn print_freezeout(&mut self, category: SurfaceCategory, record: &FreezeoutRecord) -> PhysicsResult<()> {
        match self.sinks.as_mut() {
            Some(sinks) => sinks.write(category, record),
            None => Ok(()),
        }
    }

    /// 写出能量密度场的中心 z 切片
    pub fn output_energy_density(&mut self) -> PhysicsResult<()> {
        let Some(writer) = self.energy_writer.as_mut() else {
            return Ok(());
        };
        let dims = self.field.dims();
        let iz = dims.nz() / 2;
        let tau = self.hydros[0].tau();
        for iy in 0..dims.ny() {
            for ix in 0..dims.nx() {
                writer.write_point(
                    tau,
                    self.geometry.x(ix),
                    self.geometry.y(iy),
                    self.field.at(ix, iy, iz),
                )?;
            }
        }
        writer.end_slice()
    }

    // ------------------------------------------------------------
    // 网格变更
    // ------------------------------------------------------------

    /// 按流体当前网格调整能量密度场
    ///
    /// 旧值与尚未交付的推迟源项居中映射到新网格，新单元为 0，
    /// 落在新网格之外的单元被丢弃；快照重置为当前状态。
    pub fn resize_energy_density(&mut self) {
        let old = self.field.dims();
        let dims = self.hydros[0].fluid().dims();
        self.field.resize(dims);
        self.retarded.remap(old, dims);
        for (k, hydro) in self.hydros.iter().enumerate() {
            let cells = hydro.fluid().cells();
            self.snapshots[0][k] = cells.to_vec();
            self.snapshots[1][k] = cells.to_vec();
        }
        let tau = self.tau();
        self.snapshot_taus = [tau, tau];
        debug!(grid = %dims, "能量密度场已调整");
    }

    /// 替换三个流体
    pub fn set_fluids(&mut self, hydros: [Box<dyn Hydro>; 3]) -> PhysicsResult<()> {
        let (geometry, coordinates) = check_layout(&hydros)?;
        if coordinates != self.coordinates {
            return Err(PhysicsError::grid_mismatch(
                "坐标系",
                format!("{:?}", self.coordinates),
                format!("{coordinates:?}"),
            ));
        }
        self.hydros = hydros;
        self.geometry = geometry;
        self.resize_energy_density();

        // 两层都取新流体的场
        let values = self.compute_energy_density(self.settings.criterion)?;
        self.field.set_current(values)?;
        self.field.sync_previous();
        Ok(())
    }

    /// 刷新输出并返回冻结面累计量
    pub fn finish(mut self) -> PhysicsResult<SurfaceTotals> {
        if let Some(sinks) = self.sinks.as_mut() {
            sinks.flush()?;
        }
        info!(
            steps = self.step,
            elements = self.totals.elements(),
            v_eff = self.totals.v_eff(),
            "冻结面提取结束"
        );
        Ok(self.totals)
    }
}

impl std::fmt::Debug for MultiHydro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiHydro")
            .field("tau", &self.tau())
            .field("step", &self.step)
            .field("grid", &self.geometry.dims)
            .field("coordinates", &self.coordinates)
            .field("friction", &self.friction.name())
            .field("finder", &self.finder.name())
            .finish()
    }
}
