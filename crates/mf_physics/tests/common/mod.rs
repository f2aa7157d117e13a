// tests/common/mod.rs

//! 集成测试公共辅助

#![allow(dead_code)]

use mf_foundation::GridDims;
use mf_physics::eos::Eos;
use mf_physics::prelude::*;
use mf_physics::types::NPI;

// ============================================================================
// 按时间表演化的单流体
// ============================================================================

/// 每步把全部单元设为时间表中的下一个静止能量密度
pub struct ScheduledHydro {
    fluid: Fluid,
    tau: f64,
    dtau: f64,
    schedule: Vec<f64>,
    next: usize,
    viscous: Option<([f64; NPI], f64)>,
}

impl ScheduledHydro {
    /// `schedule[0]` 为初始值
    pub fn new(geometry: GridGeometry, coordinates: CoordinateSystem, tau0: f64, dtau: f64, schedule: &[f64]) -> Self {
        let eos = IdealGasEos::default();
        let mut fluid = Fluid::new(geometry, coordinates);
        let cell = Cell::from_primitive(schedule[0], [0.0; 3], [0.0; 3], &eos, coordinates.weight(tau0)).unwrap();
        fluid.cells_mut().fill(cell);
        Self {
            fluid,
            tau: tau0,
            dtau,
            schedule: schedule.to_vec(),
            next: 1,
            viscous: None,
        }
    }

    /// 每个单元带固定的剪切张量与体粘滞压强
    pub fn with_viscous(mut self, pi: [f64; NPI], bulk: f64) -> Self {
        for cell in self.fluid.cells_mut() {
            cell.set_pi(pi);
            cell.set_bulk(bulk);
        }
        self.viscous = Some((pi, bulk));
        self
    }
}

impl Hydro for ScheduledHydro {
    fn name(&self) -> &'static str {
        "Scheduled"
    }

    fn fluid(&self) -> &Fluid {
        &self.fluid
    }

    fn fluid_mut(&mut self) -> &mut Fluid {
        &mut self.fluid
    }

    fn tau(&self) -> f64 {
        self.tau
    }

    fn dtau(&self) -> f64 {
        self.dtau
    }

    fn perform_step(&mut self, eos: &dyn Eos) -> PhysicsResult<()> {
        self.tau += self.dtau;
        let e = self.schedule[self.next.min(self.schedule.len() - 1)];
        self.next += 1;
        let weight = self.fluid.coordinates().weight(self.tau);
        let mut cell = Cell::from_primitive(e, [0.0; 3], [0.0; 3], eos, weight)?;
        if let Some((pi, bulk)) = self.viscous {
            cell.set_pi(pi);
            cell.set_bulk(bulk);
        }
        self.fluid.cells_mut().fill(cell);
        Ok(())
    }
}

// ============================================================================
// 构造辅助
// ============================================================================

pub const TAU0: f64 = 1.0;
pub const DTAU: f64 = 0.05;

/// nx × 1 × 1 的笛卡尔网格
pub fn line(nx: usize, spacing: f64) -> GridGeometry {
    GridGeometry::new(GridDims::new(nx, 1, 1).unwrap(), [spacing; 3], [0.0; 3]).unwrap()
}

/// 空流体
pub fn empty(geometry: GridGeometry) -> Box<dyn Hydro> {
    Box::new(StaticHydro::new(
        Fluid::new(geometry, CoordinateSystem::Cartesian),
        TAU0,
        DTAU,
    ))
}

/// Milne 坐标下的空流体
pub fn empty_milne(geometry: GridGeometry) -> Box<dyn Hydro> {
    Box::new(StaticHydro::new(
        Fluid::new(geometry, CoordinateSystem::Milne),
        TAU0,
        DTAU,
    ))
}

/// 均匀重子流体，沿 z 运动
pub fn baryon_slab(geometry: GridGeometry, e: f64, nb: f64, vz: f64) -> Box<dyn Hydro> {
    let eos = IdealGasEos::default();
    let mut fluid = Fluid::new(geometry, CoordinateSystem::Cartesian);
    let cell = Cell::from_primitive(e, [nb, 0.0, 0.0], [0.0, 0.0, vz], &eos, 1.0).unwrap();
    fluid.cells_mut().fill(cell);
    Box::new(StaticHydro::new(fluid, TAU0, DTAU))
}

/// 火球按时间表衰减，弹核与靶核为空
pub fn decaying_fireball(geometry: GridGeometry, schedule: &[f64]) -> [Box<dyn Hydro>; 3] {
    [
        empty(geometry),
        empty(geometry),
        Box::new(ScheduledHydro::new(
            geometry,
            CoordinateSystem::Cartesian,
            TAU0,
            DTAU,
            schedule,
        )),
    ]
}

pub fn settings(e_crit: f64) -> MultiHydroSettings {
    MultiHydroSettings {
        dtau: DTAU,
        e_crit,
        ..MultiHydroSettings::default()
    }
}

pub fn build(hydros: [Box<dyn Hydro>; 3], settings: MultiHydroSettings) -> MultiHydro {
    build_with_transport(hydros, settings, ConstantTransport::inviscid())
}

pub fn build_with_transport(
    hydros: [Box<dyn Hydro>; 3],
    settings: MultiHydroSettings,
    transport: ConstantTransport,
) -> MultiHydro {
    MultiHydro::new(
        hydros,
        Box::new(IdealGasEos::default()),
        Box::new(transport),
        Box::new(ParametrizedCrossSections::default()),
        settings,
    )
    .unwrap()
}
