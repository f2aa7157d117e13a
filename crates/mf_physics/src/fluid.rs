// crates/mf_physics/src/fluid.rs

//! 流体网格与单元
//!
//! 每个 [`Fluid`] 在扁平缓冲区中保存 `nx × ny × nz` 个 [`Cell`]。单元存储
//! 守恒向量 Q（Milne 坐标下以 τ 加权）以及粘滞张量分量；原始变量
//! (e, p, n, v) 按需由 Q 与状态方程反演得到。

use mf_config::GridConfig;
use mf_foundation::GridDims;

use crate::eos::Eos;
use crate::error::{PhysicsError, PhysicsResult};
use crate::tensor::{four_velocity, perfect_fluid, viscous_part, FourVector, Tensor4};
use crate::types::{CoordinateSystem, NPI, NQ};

/// T^00 低于此值的单元按真空处理
const VACUUM_ENERGY: f64 = 1e-15;
/// 动量超过能量时的钳位比例
const MAX_SPEED_FRACTION: f64 = 1.0 - 1e-12;
/// 速度二分迭代次数
const BISECTION_STEPS: usize = 64;

/// 网格几何
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    /// 单元数
    pub dims: GridDims,
    /// x 方向间距
    pub dx: f64,
    /// y 方向间距
    pub dy: f64,
    /// z (η) 方向间距
    pub dz: f64,
    /// 第一个单元中心 x
    pub xmin: f64,
    /// 第一个单元中心 y
    pub ymin: f64,
    /// 第一个单元中心 z (η)
    pub zmin: f64,
}

impl GridGeometry {
    /// 创建几何，间距必须为正
    pub fn new(dims: GridDims, spacing: [f64; 3], origin: [f64; 3]) -> PhysicsResult<Self> {
        for (key, d) in [("dx", spacing[0]), ("dy", spacing[1]), ("dz", spacing[2])] {
            if !d.is_finite() || d <= 0.0 {
                return Err(mf_foundation::MfError::invalid_config(
                    key,
                    d.to_string(),
                    "网格间距必须为正",
                )
                .into());
            }
        }
        Ok(Self {
            dims,
            dx: spacing[0],
            dy: spacing[1],
            dz: spacing[2],
            xmin: origin[0],
            ymin: origin[1],
            zmin: origin[2],
        })
    }

    /// 从配置构造
    pub fn from_config(grid: &GridConfig) -> PhysicsResult<Self> {
        let dims = GridDims::new(grid.nx, grid.ny, grid.nz)?;
        let (xmin, ymin, zmin) = grid.origin();
        Self::new(dims, [grid.dx, grid.dy, grid.dz], [xmin, ymin, zmin])
    }

    /// 单元中心 x
    #[inline]
    pub fn x(&self, ix: usize) -> f64 {
        self.xmin + ix as f64 * self.dx
    }

    /// 单元中心 y
    #[inline]
    pub fn y(&self, iy: usize) -> f64 {
        self.ymin + iy as f64 * self.dy
    }

    /// 单元中心 z (η)
    #[inline]
    pub fn z(&self, iz: usize) -> f64 {
        self.zmin + iz as f64 * self.dz
    }

    /// 坐标空间单元体积 dx·dy·dz
    #[inline]
    pub fn cell_volume(&self) -> f64 {
        self.dx * self.dy * self.dz
    }

    /// 两个几何是否描述同一网格
    pub fn same_layout(&self, other: &GridGeometry) -> bool {
        const TOL: f64 = 1e-12;
        self.dims == other.dims
            && (self.dx - other.dx).abs() <= TOL * self.dx
            && (self.dy - other.dy).abs() <= TOL * self.dy
            && (self.dz - other.dz).abs() <= TOL * self.dz
    }
}

/// 原始变量
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrimitiveState {
    /// 静止系能量密度
    pub e: f64,
    /// 压强
    pub p: f64,
    /// 重子密度
    pub nb: f64,
    /// 电荷密度
    pub nq: f64,
    /// 奇异数密度
    pub ns: f64,
    /// 三速度 x
    pub vx: f64,
    /// 三速度 y
    pub vy: f64,
    /// 三速度 z (局域 η 方向)
    pub vz: f64,
}

impl PrimitiveState {
    /// 四速度
    #[inline]
    pub fn velocity(&self) -> FourVector {
        four_velocity(self.vx, self.vy, self.vz)
    }

    /// 是否为真空
    #[inline]
    pub fn is_vacuum(&self) -> bool {
        self.e <= VACUUM_ENERGY
    }

    /// 理想流体能动张量
    pub fn perfect_tensor(&self) -> Tensor4 {
        perfect_fluid(self.e, self.p, &self.velocity())
    }
}

/// 单个流体单元
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    q: [f64; NQ],
    pi: [f64; NPI],
    bulk: f64,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            q: [0.0; NQ],
            pi: [0.0; NPI],
            bulk: 0.0,
        }
    }
}

impl Cell {
    /// 由原始变量构造（weight 为坐标权重，Milne 下为 τ）
    pub fn from_primitive(
        e: f64,
        densities: [f64; 3],
        velocity: [f64; 3],
        eos: &dyn Eos,
        weight: f64,
    ) -> PhysicsResult<Self> {
        let p = eos.pressure(e, densities[0], densities[1], densities[2])?;
        let u = four_velocity(velocity[0], velocity[1], velocity[2]);
        let t = perfect_fluid(e, p, &u);
        let mut q = [0.0; NQ];
        for nu in 0..4 {
            q[nu] = weight * t[(0, nu)];
        }
        for k in 0..3 {
            q[4 + k] = weight * densities[k] * u[0];
        }
        Ok(Self {
            q,
            ..Self::default()
        })
    }

    /// 守恒向量
    #[inline]
    pub fn q(&self) -> &[f64; NQ] {
        &self.q
    }

    /// 设置守恒向量
    #[inline]
    pub fn set_q(&mut self, q: [f64; NQ]) {
        self.q = q;
    }

    /// 在能动分量 (0..4) 上叠加源项
    #[inline]
    pub fn add_energy_momentum(&mut self, dq: &[f64; 4]) {
        for (q, d) in self.q.iter_mut().zip(dq) {
            *q += d;
        }
    }

    /// 剪切张量
    #[inline]
    pub fn pi(&self) -> &[f64; NPI] {
        &self.pi
    }

    /// 设置剪切张量
    #[inline]
    pub fn set_pi(&mut self, pi: [f64; NPI]) {
        self.pi = pi;
    }

    /// 体粘滞压强
    #[inline]
    pub fn bulk(&self) -> f64 {
        self.bulk
    }

    /// 设置体粘滞压强
    #[inline]
    pub fn set_bulk(&mut self, bulk: f64) {
        self.bulk = bulk;
    }

    /// 单元原始变量
    pub fn prim_var(
        &self,
        eos: &dyn Eos,
        tau: f64,
        coordinates: CoordinateSystem,
    ) -> PhysicsResult<PrimitiveState> {
        let w = coordinates.weight(tau);
        let mut q = self.q;
        for x in q.iter_mut() {
            *x /= w;
        }
        conserved_to_primitive(&q, eos)
    }

    /// 单元能动张量及原始变量
    pub fn energy_momentum_tensor(
        &self,
        eos: &dyn Eos,
        tau: f64,
        coordinates: CoordinateSystem,
        viscous: bool,
    ) -> PhysicsResult<(Tensor4, PrimitiveState)> {
        let prim = self.prim_var(eos, tau, coordinates)?;
        let mut t = prim.perfect_tensor();
        if viscous && !prim.is_vacuum() {
            t += viscous_part(&self.pi, self.bulk, &prim.velocity());
        }
        Ok((t, prim))
    }
}

/// 理想流体守恒量反演
///
/// 给定 `T^{0ν}` 与 `J^0`，求解 `v = |M| / (T^00 + p(e, n))`，
/// 其中 `e = T^00 - v |M|`，`n = J^0 √(1 - v²)`。
pub fn conserved_to_primitive(q: &[f64; NQ], eos: &dyn Eos) -> PhysicsResult<PrimitiveState> {
    let t00 = q[0];
    if t00 <= VACUUM_ENERGY {
        return Ok(PrimitiveState::default());
    }

    let m_raw = (q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    let m = m_raw.min(MAX_SPEED_FRACTION * t00);

    let v = if m_raw == 0.0 {
        0.0
    } else {
        let residual = |v: f64| -> PhysicsResult<f64> {
            let g_inv = (1.0 - v * v).sqrt();
            let e = t00 - v * m;
            let p = eos.pressure(e, q[4] * g_inv, q[5] * g_inv, q[6] * g_inv)?;
            Ok(m / (t00 + p) - v)
        };
        let (mut lo, mut hi) = (0.0_f64, MAX_SPEED_FRACTION);
        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if residual(mid)? > 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    };

    let g_inv = (1.0 - v * v).sqrt();
    let e = t00 - v * m;
    let (nb, nq, ns) = (q[4] * g_inv, q[5] * g_inv, q[6] * g_inv);
    let p = eos.pressure(e, nb, nq, ns)?;
    let (vx, vy, vz) = if m_raw > 0.0 {
        (v * q[1] / m_raw, v * q[2] / m_raw, v * q[3] / m_raw)
    } else {
        (0.0, 0.0, 0.0)
    };

    Ok(PrimitiveState {
        e,
        p,
        nb,
        nq,
        ns,
        vx,
        vy,
        vz,
    })
}

/// 单个流体的网格
#[derive(Debug, Clone)]
pub struct Fluid {
    geometry: GridGeometry,
    coordinates: CoordinateSystem,
    cells: Vec<Cell>,
}

impl Fluid {
    /// 创建真空流体
    pub fn new(geometry: GridGeometry, coordinates: CoordinateSystem) -> Self {
        Self {
            geometry,
            coordinates,
            cells: vec![Cell::default(); geometry.dims.len()],
        }
    }

    /// 由单元数组创建
    pub fn from_cells(
        geometry: GridGeometry,
        coordinates: CoordinateSystem,
        cells: Vec<Cell>,
    ) -> PhysicsResult<Self> {
        if cells.len() != geometry.dims.len() {
            return Err(mf_foundation::MfError::size_mismatch(
                "fluid cells",
                geometry.dims.len(),
                cells.len(),
            )
            .into());
        }
        Ok(Self {
            geometry,
            coordinates,
            cells,
        })
    }

    /// 网格几何
    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// 网格尺寸
    #[inline]
    pub fn dims(&self) -> GridDims {
        self.geometry.dims
    }

    /// 坐标系
    #[inline]
    pub fn coordinates(&self) -> CoordinateSystem {
        self.coordinates
    }

    /// x 方向单元数
    pub fn nx(&self) -> usize {
        self.geometry.dims.nx()
    }

    /// y 方向单元数
    pub fn ny(&self) -> usize {
        self.geometry.dims.ny()
    }

    /// z 方向单元数
    pub fn nz(&self) -> usize {
        self.geometry.dims.nz()
    }

    /// x 间距
    pub fn dx(&self) -> f64 {
        self.geometry.dx
    }

    /// y 间距
    pub fn dy(&self) -> f64 {
        self.geometry.dy
    }

    /// z 间距
    pub fn dz(&self) -> f64 {
        self.geometry.dz
    }

    /// 按坐标访问单元
    #[inline]
    pub fn cell(&self, ix: usize, iy: usize, iz: usize) -> &Cell {
        &self.cells[self.geometry.dims.offset(ix, iy, iz)]
    }

    /// 按坐标可变访问单元
    #[inline]
    pub fn cell_mut(&mut self, ix: usize, iy: usize, iz: usize) -> &mut Cell {
        let i = self.geometry.dims.offset(ix, iy, iz);
        &mut self.cells[i]
    }

    /// 按扁平索引访问
    #[inline]
    pub fn cell_at(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    /// 按扁平索引可变访问
    #[inline]
    pub fn cell_at_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    /// 全部单元
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// 全部单元（可变）
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// 单元原始变量
    pub fn prim_var(&self, index: usize, eos: &dyn Eos, tau: f64) -> PhysicsResult<PrimitiveState> {
        self.cells
            .get(index)
            .ok_or_else(|| {
                PhysicsError::from(mf_foundation::MfError::index_out_of_bounds(
                    "cell",
                    index,
                    self.cells.len(),
                ))
            })?
            .prim_var(eos, tau, self.coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eos::IdealGasEos;

    fn geometry(nx: usize, ny: usize, nz: usize) -> GridGeometry {
        GridGeometry::new(
            GridDims::new(nx, ny, nz).unwrap(),
            [0.5, 0.5, 0.5],
            [0.0, 0.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn test_geometry_rejects_bad_spacing() {
        let dims = GridDims::new(2, 2, 2).unwrap();
        assert!(GridGeometry::new(dims, [0.0, 1.0, 1.0], [0.0; 3]).is_err());
        assert!(GridGeometry::new(dims, [1.0, f64::NAN, 1.0], [0.0; 3]).is_err());
    }

    #[test]
    fn test_primitive_roundtrip_moving_cell() {
        let eos = IdealGasEos::default();
        let cell =
            Cell::from_primitive(2.0, [0.3, 0.1, 0.0], [0.2, -0.3, 0.6], &eos, 1.0).unwrap();
        let prim = cell.prim_var(&eos, 1.0, CoordinateSystem::Cartesian).unwrap();
        assert!((prim.e - 2.0).abs() < 1e-10);
        assert!((prim.nb - 0.3).abs() < 1e-10);
        assert!((prim.nq - 0.1).abs() < 1e-10);
        assert!((prim.vx - 0.2).abs() < 1e-10);
        assert!((prim.vy + 0.3).abs() < 1e-10);
        assert!((prim.vz - 0.6).abs() < 1e-10);
    }

    #[test]
    fn test_milne_weight_removed() {
        let eos = IdealGasEos::default();
        let tau = 2.5;
        let cell = Cell::from_primitive(1.0, [0.1, 0.0, 0.0], [0.0, 0.0, 0.3], &eos, tau).unwrap();
        let prim = cell.prim_var(&eos, tau, CoordinateSystem::Milne).unwrap();
        assert!((prim.e - 1.0).abs() < 1e-10);
        assert!((prim.vz - 0.3).abs() < 1e-10);
    }

    #[test]
    fn test_vacuum_cell() {
        let eos = IdealGasEos::default();
        let prim = Cell::default()
            .prim_var(&eos, 1.0, CoordinateSystem::Cartesian)
            .unwrap();
        assert!(prim.is_vacuum());
        assert_eq!(prim.velocity(), FourVector::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_superluminal_momentum_clamped() {
        let eos = IdealGasEos::default();
        let q = [1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let prim = conserved_to_primitive(&q, &eos).unwrap();
        assert!(prim.vx < 1.0);
        assert!(prim.e >= 0.0);
    }

    #[test]
    fn test_tensor_matches_conserved() {
        let eos = IdealGasEos::default();
        let cell = Cell::from_primitive(1.5, [0.2, 0.0, 0.0], [0.4, 0.0, 0.1], &eos, 1.0).unwrap();
        let (t, _) = cell
            .energy_momentum_tensor(&eos, 1.0, CoordinateSystem::Cartesian, false)
            .unwrap();
        for nu in 0..4 {
            assert!((t[(0, nu)] - cell.q()[nu]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fluid_indexing() {
        let mut fluid = Fluid::new(geometry(3, 2, 2), CoordinateSystem::Cartesian);
        fluid.cell_mut(2, 1, 1).set_bulk(0.5);
        let idx = fluid.dims().offset(2, 1, 1);
        assert_eq!(fluid.cell_at(idx).bulk(), 0.5);
        assert_eq!(fluid.cells().len(), 12);
        assert_eq!((fluid.nx(), fluid.ny(), fluid.nz()), (3, 2, 2));
    }

    #[test]
    fn test_from_cells_size_check() {
        let result = Fluid::from_cells(
            geometry(2, 2, 2),
            CoordinateSystem::Cartesian,
            vec![Cell::default(); 3],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_same_layout() {
        let a = geometry(2, 2, 2);
        let mut b = a;
        b.xmin = 10.0;
        assert!(a.same_layout(&b));
        b.dx = 0.25;
        assert!(!a.same_layout(&b));
    }
}
