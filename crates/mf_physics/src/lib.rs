// crates/mf_physics/src/lib.rs

//! MultiFluid Physics Layer (Layer 3)
//!
//! 三流体（弹核、靶核、火球）相对论流体的摩擦耦合与冻结面提取。
//!
//! # 模块概览
//!
//! - [`types`]: 物理常数、流体种类、坐标系
//! - [`tensor`]: 四矢量、能动张量与 Landau 标架对角化
//! - [`eos`]: 状态方程接口与理想气体实现
//! - [`fluid`]: 单元守恒量与原始量反演、三维流体网格
//! - [`hydro`]: 单流体求解器接口
//! - [`cross_sections`]: 核子-核子与介子-核子截面
//! - [`friction`]: 微观/简化摩擦模型与推迟交付
//! - [`energy_density`]: 能量密度判据与双缓冲场
//! - [`surface`]: 超立方体与等值面查找
//! - [`freezeout`]: 面元上的冻结记录
//! - [`output`]: 冻结面与能量密度输出
//! - [`conservation`]: 能量收支诊断
//! - [`multi_hydro`]: 三流体耦合器
//!
//! # 示例
//!
//! ```
//! use mf_foundation::GridDims;
//! use mf_physics::prelude::*;
//!
//! let geometry = GridGeometry::new(GridDims::new(2, 1, 1).unwrap(), [0.5; 3], [0.0; 3]).unwrap();
//! let hydro = |_| -> Box<dyn Hydro> {
//!     Box::new(StaticHydro::new(Fluid::new(geometry, CoordinateSystem::Cartesian), 1.0, 0.05))
//! };
//! let mut multi = MultiHydro::new(
//!     [hydro(0), hydro(1), hydro(2)],
//!     Box::new(IdealGasEos::default()),
//!     Box::new(ConstantTransport::inviscid()),
//!     Box::new(ParametrizedCrossSections::default()),
//!     MultiHydroSettings::default(),
//! )
//! .unwrap();
//! let report = multi.perform_step().unwrap();
//! assert_eq!(report.surface_elements, 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod conservation;
pub mod cross_sections;
pub mod energy_density;
pub mod eos;
pub mod error;
pub mod fluid;
pub mod freezeout;
pub mod friction;
pub mod hydro;
pub mod multi_hydro;
pub mod output;
pub mod surface;
pub mod tensor;
pub mod transport;
pub mod types;

/// 层级标识
pub const LAYER: u8 = 3;

// 重导出核心类型
pub use conservation::{ConservationReport, ConservedTotals};
pub use cross_sections::{CrossSections, ParametrizedCrossSections, Species};
pub use energy_density::{EnergyDensityCriterion, EnergyDensityField};
pub use eos::{Eos, EosError, IdealGasEos, ThermoState};
pub use error::{PhysicsError, PhysicsResult};
pub use fluid::{Cell, Fluid, GridGeometry, PrimitiveState};
pub use freezeout::{FreezeoutRecord, SurfaceTotals};
pub use friction::{FrictionForces, FrictionModel, MicroscopicFriction, SimplifiedFriction};
pub use hydro::{BjorkenHydro, Hydro, StaticHydro};
pub use multi_hydro::{MultiHydro, MultiHydroSettings, StepReport};
pub use output::{FreezeoutSinks, SurfaceCategory};
pub use surface::{Hypercube, ProjectionFinder, SurfaceElement, SurfaceFinder};
pub use tensor::{EigenSelection, LandauFrame};
pub use transport::{ConstantTransport, TransportCoeff};
pub use types::{CoordinateSystem, FluidKind, PhysicalConstants};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::cross_sections::{CrossSections, ParametrizedCrossSections};
    pub use crate::eos::{Eos, IdealGasEos};
    pub use crate::error::{PhysicsError, PhysicsResult};
    pub use crate::fluid::{Cell, Fluid, GridGeometry};
    pub use crate::hydro::{BjorkenHydro, Hydro, StaticHydro};
    pub use crate::multi_hydro::{MultiHydro, MultiHydroSettings, StepReport};
    pub use crate::transport::{ConstantTransport, TransportCoeff};
    pub use crate::types::{CoordinateSystem, FluidKind};
}
