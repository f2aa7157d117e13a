// crates/mf_physics/src/freezeout.rs

//! 冻结记录与面元求值
//!
//! 面元质心处对三个流体的守恒量、剪切张量与体粘滞做多线性插值（两个时间层
//! × 8 个空间顶点），组合能动张量经 Landau 分解得到流速与能量密度，
//! 再由状态方程给出温度与化学势。

use std::fmt;

use mf_foundation::KahanSum;
use tracing::trace;

use crate::eos::{Eos, ThermoState};
use crate::error::PhysicsResult;
use crate::fluid::{Cell, PrimitiveState};
use crate::surface::{multilinear_weights, Hypercube, SurfaceElement};
use crate::tensor::{dot, landau_frame, EigenSelection, FourVector, LandauError, Tensor4};
use crate::types::{CoordinateSystem, FluidKind, NPI, NQ, PI_INDICES};

/// 记录字段数
pub const RECORD_FIELDS: usize = 28;

/// 单条冻结记录
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreezeoutRecord {
    /// 时间
    pub t: f64,
    /// x
    pub x: f64,
    /// y
    pub y: f64,
    /// z
    pub z: f64,
    /// 协变面元
    pub dsigma: [f64; 4],
    /// 四速度
    pub u: [f64; 4],
    /// 温度
    pub temperature: f64,
    /// 重子化学势
    pub mu_b: f64,
    /// 电荷化学势
    pub mu_q: f64,
    /// 奇异数化学势
    pub mu_s: f64,
    /// 剪切张量
    pub pi: [f64; NPI],
    /// 体粘滞压强
    pub bulk: f64,
    /// 有效体积 dσ_μ u^μ
    pub dv_eff: f64,
}

impl FreezeoutRecord {
    /// 按输出顺序展开
    pub fn to_array(&self) -> [f64; RECORD_FIELDS] {
        let mut out = [0.0; RECORD_FIELDS];
        out[..4].copy_from_slice(&[self.t, self.x, self.y, self.z]);
        out[4..8].copy_from_slice(&self.dsigma);
        out[8..12].copy_from_slice(&self.u);
        out[12..16].copy_from_slice(&[self.temperature, self.mu_b, self.mu_q, self.mu_s]);
        out[16..26].copy_from_slice(&self.pi);
        out[26] = self.bulk;
        out[27] = self.dv_eff;
        out
    }

    /// Milne (τ, x, y, η) 记录转换为笛卡尔 (t, x, y, z)
    pub fn to_cartesian(&self) -> Self {
        let (tau, eta) = (self.t, self.z);
        let (ch, sh) = (eta.cosh(), eta.sinh());
        let ds = self.dsigma;
        let u = self.u;

        let mut pi_full = [[0.0; 4]; 4];
        for (k, &(mu, nu)) in PI_INDICES.iter().enumerate() {
            pi_full[mu][nu] = self.pi[k];
            pi_full[nu][mu] = self.pi[k];
        }
        let lambda = [
            [ch, 0.0, 0.0, sh],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [sh, 0.0, 0.0, ch],
        ];
        let mut pi = [0.0; NPI];
        for (k, &(mu, nu)) in PI_INDICES.iter().enumerate() {
            let mut s = 0.0;
            for a in 0..4 {
                for b in 0..4 {
                    s += lambda[mu][a] * lambda[nu][b] * pi_full[a][b];
                }
            }
            pi[k] = s;
        }

        Self {
            t: tau * ch,
            z: tau * sh,
            dsigma: [
                ds[0] * ch - ds[3] * sh,
                ds[1],
                ds[2],
                -ds[0] * sh + ds[3] * ch,
            ],
            u: [u[0] * ch + u[3] * sh, u[1], u[2], u[0] * sh + u[3] * ch],
            pi,
            ..*self
        }
    }
}

impl fmt::Display for FreezeoutRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.to_array().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{v:>24.15e}")?;
        }
        Ok(())
    }
}

/// 穿过冻结面的能量（按流体）
///
/// `negative` 存内流量的绝对值，净流出为 `positive − negative`。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceEnergyTotals {
    total: [KahanSum; 3],
    positive: [KahanSum; 3],
    negative: [KahanSum; 3],
}

impl SurfaceEnergyTotals {
    /// 累加一个面元的能流
    pub fn add(&mut self, kind: FluidKind, flux: f64) {
        let i = kind.index();
        self.total[i].add(flux);
        if flux >= 0.0 {
            self.positive[i].add(flux);
        } else {
            self.negative[i].add(-flux);
        }
    }

    /// 有向总和
    pub fn total(&self, kind: FluidKind) -> f64 {
        self.total[kind.index()].value()
    }

    /// 外流
    pub fn positive(&self, kind: FluidKind) -> f64 {
        self.positive[kind.index()].value()
    }

    /// 内流（绝对值）
    pub fn negative(&self, kind: FluidKind) -> f64 {
        self.negative[kind.index()].value()
    }

    /// 净外流
    pub fn net(&self, kind: FluidKind) -> f64 {
        self.positive(kind) - self.negative(kind)
    }

    /// 三个流体的净外流之和
    pub fn combined_net(&self) -> f64 {
        FluidKind::ALL.iter().map(|&k| self.net(k)).sum()
    }
}

/// 冻结面累计量
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceTotals {
    /// 能量
    pub energy: SurfaceEnergyTotals,
    v_eff: KahanSum,
    v_eff_fluid: [KahanSum; 3],
    elements: usize,
}

impl SurfaceTotals {
    /// 累加一个面元
    pub fn record(&mut self, outcome: &ElementOutcome) {
        for kind in FluidKind::ALL {
            let i = kind.index();
            self.energy.add(kind, outcome.energy_flux[i]);
            self.v_eff_fluid[i].add(outcome.v_eff_fluid[i]);
        }
        self.v_eff.add(outcome.v_eff);
        self.elements += 1;
    }

    /// 组合流体有效体积
    pub fn v_eff(&self) -> f64 {
        self.v_eff.value()
    }

    /// 单流体有效体积
    pub fn v_eff_fluid(&self, kind: FluidKind) -> f64 {
        self.v_eff_fluid[kind.index()].value()
    }

    /// 面元数
    pub fn elements(&self) -> usize {
        self.elements
    }
}

/// 超立方体顶点处的单元
#[derive(Debug, Clone, Copy)]
pub struct CubeCells<'a> {
    /// `[时间层][流体]` 的单元数组，时间层 0 为上一步
    pub snapshots: [[&'a [Cell]; 3]; 2],
    /// 8 个空间顶点的扁平索引，顺序 `(a_x << 2) | (a_y << 1) | a_z`
    pub corners: [usize; 8],
    /// 两个时间层的 τ
    pub taus: [f64; 2],
}

/// 面元求值参数
#[derive(Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// 状态方程
    pub eos: &'a dyn Eos,
    /// 坐标系
    pub coordinates: CoordinateSystem,
    /// 是否带粘滞
    pub viscous: bool,
    /// 本征向量选择
    pub selection: EigenSelection,
}

/// 单个面元的求值结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementOutcome {
    /// 组合流体记录
    pub combined: FreezeoutRecord,
    /// 各流体记录（能量为零的流体为 `None`）
    pub fluids: [Option<FreezeoutRecord>; 3],
    /// `dσ_μ T_α^{μ0}`
    pub energy_flux: [f64; 3],
    /// 组合流体 `dσ_μ u^μ`
    pub v_eff: f64,
    /// 各流体 `dσ_μ u_α^μ`
    pub v_eff_fluid: [f64; 3],
}

/// 质心处插值后的单流体状态
struct Interpolated {
    tensor: Tensor4,
    prim: PrimitiveState,
    pi: [f64; NPI],
    bulk: f64,
}

/// 在去权重的守恒量上插值
fn interpolate_fluid(
    cells: &CubeCells<'_>,
    fluid: usize,
    weights: &[f64; 16],
    ctx: &EvaluationContext<'_>,
) -> PhysicsResult<Interpolated> {
    let mut q = [0.0; NQ];
    let mut pi = [0.0; NPI];
    let mut bulk = 0.0;
    for (idx, &w) in weights.iter().enumerate() {
        if w == 0.0 {
            continue;
        }
        let layer = idx >> 3;
        let cell = &cells.snapshots[layer][fluid][cells.corners[idx & 7]];
        let inv_weight = 1.0 / ctx.coordinates.weight(cells.taus[layer]);
        for (s, x) in q.iter_mut().zip(cell.q()) {
            *s += w * x * inv_weight;
        }
        for (s, x) in pi.iter_mut().zip(cell.pi()) {
            *s += w * x;
        }
        bulk += w * cell.bulk();
    }

    let mut cell = Cell::default();
    cell.set_q(q);
    cell.set_pi(pi);
    cell.set_bulk(bulk);
    let (tensor, prim) =
        cell.energy_momentum_tensor(ctx.eos, 1.0, CoordinateSystem::Cartesian, ctx.viscous)?;
    Ok(Interpolated {
        tensor,
        prim,
        pi,
        bulk,
    })
}

fn thermo_of(eos: &dyn Eos, e: f64, n: [f64; 3]) -> PhysicsResult<ThermoState> {
    Ok(eos.eos(e, n[0], n[1], n[2])?)
}

fn contract(dsigma: &[f64; 4], u: &FourVector) -> f64 {
    (0..4).map(|mu| dsigma[mu] * u[mu]).sum()
}

/// 面元求值
///
/// `origin` 为超立方体原点 (τ, x, y, z/η)。Landau 标架退化时返回内层 `Err`。
pub fn evaluate_element(
    element: &SurfaceElement,
    cube: &Hypercube,
    cells: &CubeCells<'_>,
    origin: [f64; 4],
    ctx: &EvaluationContext<'_>,
) -> PhysicsResult<Result<ElementOutcome, LandauError>> {
    let r = element.normalized_centroid(&cube.extents);
    let weights = multilinear_weights(r);
    let tau = origin[0] + element.centroid[0];

    let mut dsigma = element.dsigma;
    if ctx.coordinates == CoordinateSystem::Milne {
        for ds in dsigma.iter_mut().take(3) {
            *ds *= tau;
        }
    }

    let fluids = [
        interpolate_fluid(cells, 0, &weights, ctx)?,
        interpolate_fluid(cells, 1, &weights, ctx)?,
        interpolate_fluid(cells, 2, &weights, ctx)?,
    ];

    let mut total = Tensor4::zeros();
    for f in &fluids {
        total += f.tensor;
    }
    let total = (total + total.transpose()) * 0.5;
    let frame = match landau_frame(&total, ctx.selection) {
        Ok(frame) => frame,
        Err(err) => return Ok(Err(err)),
    };
    let u = frame.velocity;

    let mut n = [0.0; 3];
    for f in &fluids {
        let proj = dot(&u, &f.prim.velocity());
        n[0] += f.prim.nb * proj;
        n[1] += f.prim.nq * proj;
        n[2] += f.prim.ns * proj;
    }
    let thermo = thermo_of(ctx.eos, frame.energy_density, n)?;

    let (mut pi, mut bulk) = ([0.0; NPI], 0.0);
    if ctx.viscous {
        for f in &fluids {
            for (s, x) in pi.iter_mut().zip(&f.pi) {
                *s += x;
            }
            bulk += f.bulk;
        }
    }

    let position = [
        tau,
        origin[1] + element.centroid[1],
        origin[2] + element.centroid[2],
        origin[3] + element.centroid[3],
    ];
    let make_record = |u: &FourVector, thermo: &ThermoState, pi: [f64; NPI], bulk: f64| {
        let record = FreezeoutRecord {
            t: position[0],
            x: position[1],
            y: position[2],
            z: position[3],
            dsigma,
            u: [u[0], u[1], u[2], u[3]],
            temperature: thermo.temperature,
            mu_b: thermo.mu_b,
            mu_q: thermo.mu_q,
            mu_s: thermo.mu_s,
            pi,
            bulk,
            dv_eff: contract(&dsigma, u),
        };
        match ctx.coordinates {
            CoordinateSystem::Cartesian => record,
            CoordinateSystem::Milne => record.to_cartesian(),
        }
    };

    let combined = make_record(&u, &thermo, pi, bulk);
    let mut records = [None; 3];
    let mut energy_flux = [0.0; 3];
    let mut v_eff_fluid = [0.0; 3];
    for (i, f) in fluids.iter().enumerate() {
        energy_flux[i] = (0..4).map(|mu| dsigma[mu] * f.tensor[(mu, 0)]).sum();
        if f.prim.is_vacuum() {
            continue;
        }
        let u_f = f.prim.velocity();
        let thermo_f = thermo_of(ctx.eos, f.prim.e, [f.prim.nb, f.prim.nq, f.prim.ns])?;
        let (pi_f, bulk_f) = if ctx.viscous { (f.pi, f.bulk) } else { ([0.0; NPI], 0.0) };
        v_eff_fluid[i] = contract(&dsigma, &u_f);
        records[i] = Some(make_record(&u_f, &thermo_f, pi_f, bulk_f));
    }

    trace!(tau, e = frame.energy_density, "冻结面元");

    Ok(Ok(ElementOutcome {
        combined,
        fluids: records,
        energy_flux,
        v_eff: contract(&dsigma, &u),
        v_eff_fluid,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eos::IdealGasEos;

    fn record() -> FreezeoutRecord {
        FreezeoutRecord {
            t: 2.0,
            x: 0.5,
            y: -0.5,
            z: 0.3,
            dsigma: [1.0, 0.0, 0.0, 0.2],
            u: [1.2, 0.0, 0.0, 0.6633249580710799],
            temperature: 0.15,
            mu_b: 0.2,
            mu_q: 0.0,
            mu_s: 0.0,
            pi: [0.0; NPI],
            bulk: 0.0,
            dv_eff: 1.0,
        }
    }

    #[test]
    fn test_record_field_order() {
        let a = record().to_array();
        assert_eq!(a[0], 2.0);
        assert_eq!(a[7], 0.2);
        assert_eq!(a[12], 0.15);
        assert_eq!(a[27], 1.0);
        assert_eq!(record().to_string().split_whitespace().count(), RECORD_FIELDS);
    }

    #[test]
    fn test_cartesian_conversion_preserves_invariants() {
        let milne = record();
        let cart = milne.to_cartesian();
        // t² − z² = τ²
        assert!((cart.t * cart.t - cart.z * cart.z - 4.0).abs() < 1e-12);
        let norm = |u: [f64; 4]| u[0] * u[0] - u[1] * u[1] - u[2] * u[2] - u[3] * u[3];
        assert!((norm(cart.u) - norm(milne.u)).abs() < 1e-12);
        // dσ_μ u^μ 在 boost 下不变
        let dv = |r: &FreezeoutRecord| (0..4).map(|m| r.dsigma[m] * r.u[m]).sum::<f64>();
        assert!((dv(&milne) - dv(&cart)).abs() < 1e-12);
    }

    #[test]
    fn test_energy_totals_split() {
        let mut totals = SurfaceEnergyTotals::default();
        totals.add(FluidKind::Fireball, 2.0);
        totals.add(FluidKind::Fireball, -0.5);
        totals.add(FluidKind::Projectile, 1.0);
        assert_eq!(totals.positive(FluidKind::Fireball), 2.0);
        assert_eq!(totals.negative(FluidKind::Fireball), 0.5);
        assert_eq!(totals.net(FluidKind::Fireball), 1.5);
        assert_eq!(totals.total(FluidKind::Fireball), 1.5);
        assert_eq!(totals.combined_net(), 2.5);
    }

    #[test]
    fn test_evaluate_uniform_rest_cube() {
        let eos = IdealGasEos::default();
        let hot = Cell::from_primitive(1.0, [0.1, 0.0, 0.0], [0.0; 3], &eos, 1.0).unwrap();
        let cold = Cell::from_primitive(0.2, [0.02, 0.0, 0.0], [0.0; 3], &eos, 1.0).unwrap();
        let empty = [Cell::default()];
        let prev = [hot];
        let curr = [cold];
        let cells = CubeCells {
            snapshots: [[&prev[..], &empty[..], &empty[..]], [&curr[..], &empty[..], &empty[..]]],
            corners: [0; 8],
            taus: [1.0, 1.1],
        };
        let mut values = [1.0; 16];
        for v in values.iter_mut().skip(8) {
            *v = 0.2;
        }
        let cube = Hypercube {
            values,
            extents: [0.1, 0.5, 0.5, 0.5],
        };
        let element = SurfaceElement {
            dsigma: [0.125, 0.0, 0.0, 0.0],
            centroid: [0.05, 0.25, 0.25, 0.25],
        };
        let ctx = EvaluationContext {
            eos: &eos,
            coordinates: CoordinateSystem::Cartesian,
            viscous: false,
            selection: EigenSelection::default(),
        };
        let outcome = evaluate_element(&element, &cube, &cells, [1.0, 0.0, 0.0, 0.0], &ctx)
            .unwrap()
            .unwrap();
        assert!((outcome.combined.t - 1.05).abs() < 1e-12);
        assert!((outcome.combined.u[0] - 1.0).abs() < 1e-10);
        assert!((outcome.energy_flux[0] - 0.125 * 0.6).abs() < 1e-10);
        assert!((outcome.v_eff - 0.125).abs() < 1e-10);
        assert!(outcome.fluids[0].is_some());
        assert!(outcome.fluids[1].is_none());
        assert!(outcome.combined.mu_b > 0.0);
    }
}
