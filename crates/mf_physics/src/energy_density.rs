// crates/mf_physics/src/energy_density.rs

//! 组合能量密度场
//!
//! 当前与上一步两个扁平缓冲区，每步交换后重算当前层。
//! 判据失败（Landau 标架退化）的单元存 `NaN`，包含它们的超立方体被跳过。

use mf_config::CriterionKind;
use mf_foundation::GridDims;

use crate::eos::Eos;
use crate::error::PhysicsResult;
use crate::fluid::{conserved_to_primitive, Cell};
use crate::tensor::{landau_frame, EigenSelection, Tensor4};
use crate::types::{CoordinateSystem, NQ};

/// 能量密度判据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnergyDensityCriterion {
    /// 组合能动张量的 Landau 本征值
    #[default]
    Landau,
    /// 守恒量求和后的理想流体反演
    Effective,
    /// 三个流体能量密度的最大值
    Maximum,
    /// 三个流体能量密度之和
    Sum,
}

impl From<CriterionKind> for EnergyDensityCriterion {
    fn from(kind: CriterionKind) -> Self {
        match kind {
            CriterionKind::Landau => Self::Landau,
            CriterionKind::Effective => Self::Effective,
            CriterionKind::Maximum => Self::Maximum,
            CriterionKind::Sum => Self::Sum,
        }
    }
}

/// 单元求值上下文
#[derive(Clone, Copy)]
pub struct CellContext<'a> {
    /// 状态方程
    pub eos: &'a dyn Eos,
    /// 固有时
    pub tau: f64,
    /// 坐标系
    pub coordinates: CoordinateSystem,
    /// 是否计入粘滞部分
    pub viscous: bool,
}

/// 三个流体能动张量之和
pub fn energy_momentum_tensor(cells: [&Cell; 3], ctx: &CellContext<'_>) -> PhysicsResult<Tensor4> {
    let mut total = Tensor4::zeros();
    for cell in cells {
        let (t, _) = cell.energy_momentum_tensor(ctx.eos, ctx.tau, ctx.coordinates, ctx.viscous)?;
        total += t;
    }
    // 逐流体张量已对称，求和后再对称化以消除舍入
    Ok((total + total.transpose()) * 0.5)
}

/// 按判据计算单元能量密度；Landau 标架退化时返回 `NaN`
pub fn cell_energy_density(
    criterion: EnergyDensityCriterion,
    selection: EigenSelection,
    cells: [&Cell; 3],
    ctx: &CellContext<'_>,
) -> PhysicsResult<f64> {
    match criterion {
        EnergyDensityCriterion::Landau => {
            let t = energy_momentum_tensor(cells, ctx)?;
            Ok(landau_frame(&t, selection)
                .map(|f| f.energy_density)
                .unwrap_or(f64::NAN))
        }
        EnergyDensityCriterion::Effective => {
            let w = ctx.coordinates.weight(ctx.tau);
            let mut q = [0.0; NQ];
            for cell in cells {
                for (s, x) in q.iter_mut().zip(cell.q()) {
                    *s += x / w;
                }
            }
            Ok(conserved_to_primitive(&q, ctx.eos)?.e)
        }
        EnergyDensityCriterion::Maximum => {
            let mut e_max = 0.0_f64;
            for cell in cells {
                e_max = e_max.max(cell.prim_var(ctx.eos, ctx.tau, ctx.coordinates)?.e);
            }
            Ok(e_max)
        }
        EnergyDensityCriterion::Sum => {
            let mut sum = 0.0;
            for cell in cells {
                sum += cell.prim_var(ctx.eos, ctx.tau, ctx.coordinates)?.e;
            }
            Ok(sum)
        }
    }
}

/// 双缓冲能量密度场
#[derive(Debug, Clone)]
pub struct EnergyDensityField {
    dims: GridDims,
    current: Vec<f64>,
    previous: Vec<f64>,
}

impl EnergyDensityField {
    /// 全零场
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            current: vec![0.0; dims.len()],
            previous: vec![0.0; dims.len()],
        }
    }

    /// 网格尺寸
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// 当前层
    pub fn current(&self) -> &[f64] {
        &self.current
    }

    /// 上一层
    pub fn previous(&self) -> &[f64] {
        &self.previous
    }

    /// 当前层单元值
    #[inline]
    pub fn at(&self, ix: usize, iy: usize, iz: usize) -> f64 {
        self.current[self.dims.offset(ix, iy, iz)]
    }

    /// 上一层单元值
    #[inline]
    pub fn previous_at(&self, ix: usize, iy: usize, iz: usize) -> f64 {
        self.previous[self.dims.offset(ix, iy, iz)]
    }

    /// 交换当前层与上一层
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
    }

    /// 写入当前层
    pub fn set_current(&mut self, values: Vec<f64>) -> PhysicsResult<()> {
        if values.len() != self.dims.len() {
            return Err(mf_foundation::MfError::size_mismatch(
                "energy density",
                self.dims.len(),
                values.len(),
            )
            .into());
        }
        self.current = values;
        Ok(())
    }

    /// 上一层复制为当前层
    pub fn sync_previous(&mut self) {
        self.previous.clone_from(&self.current);
    }

    /// 当前层退化单元数
    pub fn degenerate_count(&self) -> usize {
        self.current.iter().filter(|e| !e.is_finite()).count()
    }

    /// 调整到新网格，旧值居中放置，新单元为 0
    pub fn resize(&mut self, dims: GridDims) {
        if dims == self.dims {
            return;
        }
        let remap = |old: &[f64]| -> Vec<f64> {
            let mut out = vec![0.0; dims.len()];
            for (i, &value) in old.iter().enumerate() {
                let (ix, iy, iz) = self.dims.coords(i);
                if let Some((jx, jy, jz)) = self.dims.map_centered(&dims, ix, iy, iz) {
                    out[dims.offset(jx, jy, jz)] = value;
                }
            }
            out
        };
        let current = remap(&self.current);
        let previous = remap(&self.previous);
        self.current = current;
        self.previous = previous;
        self.dims = dims;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eos::IdealGasEos;

    fn ctx(eos: &IdealGasEos) -> CellContext<'_> {
        CellContext {
            eos,
            tau: 1.0,
            coordinates: CoordinateSystem::Cartesian,
            viscous: false,
        }
    }

    fn cell(eos: &IdealGasEos, e: f64, vz: f64) -> Cell {
        Cell::from_primitive(e, [0.0; 3], [0.0, 0.0, vz], eos, 1.0).unwrap()
    }

    #[test]
    fn test_criteria_on_rest_fluids() {
        let eos = IdealGasEos::default();
        let (a, b, c) = (cell(&eos, 1.0, 0.0), cell(&eos, 0.5, 0.0), Cell::default());
        let ctx = ctx(&eos);
        let sel = EigenSelection::default();
        let get = |k| cell_energy_density(k, sel, [&a, &b, &c], &ctx).unwrap();
        assert!((get(EnergyDensityCriterion::Landau) - 1.5).abs() < 1e-10);
        assert!((get(EnergyDensityCriterion::Effective) - 1.5).abs() < 1e-10);
        assert!((get(EnergyDensityCriterion::Maximum) - 1.0).abs() < 1e-10);
        assert!((get(EnergyDensityCriterion::Sum) - 1.5).abs() < 1e-10);
    }

    #[test]
    fn test_counter_streams_landau_below_sum_of_lab_energy() {
        let eos = IdealGasEos::default();
        let (a, b) = (cell(&eos, 1.0, 0.6), cell(&eos, 1.0, -0.6));
        let c = Cell::default();
        let ctx = ctx(&eos);
        let t = energy_momentum_tensor([&a, &b, &c], &ctx).unwrap();
        let landau = cell_energy_density(
            EnergyDensityCriterion::Landau,
            EigenSelection::default(),
            [&a, &b, &c],
            &ctx,
        )
        .unwrap();
        // 对称对撞：静止系即实验室系
        assert!((landau - t[(0, 0)]).abs() < 1e-9);
        assert!(landau > 2.0);
    }

    #[test]
    fn test_combined_tensor_symmetric() {
        let eos = IdealGasEos::default();
        let a = Cell::from_primitive(1.0, [0.1, 0.0, 0.0], [0.3, 0.1, 0.2], &eos, 1.0).unwrap();
        let b = Cell::from_primitive(0.7, [0.0; 3], [-0.2, 0.4, -0.5], &eos, 1.0).unwrap();
        let c = Cell::from_primitive(0.2, [0.0; 3], [0.0, 0.0, 0.1], &eos, 1.0).unwrap();
        let t = energy_momentum_tensor([&a, &b, &c], &ctx(&eos)).unwrap();
        assert!(crate::tensor::is_symmetric(&t, 0.0));
    }

    #[test]
    fn test_field_swap_and_resize() {
        let dims = GridDims::new(2, 2, 1).unwrap();
        let mut field = EnergyDensityField::new(dims);
        field.set_current(vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        field.swap();
        assert_eq!(field.previous(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(field.current(), &[0.0; 4]);
        assert!(field.set_current(vec![0.0; 3]).is_err());

        field.resize(GridDims::new(4, 4, 1).unwrap());
        assert_eq!(field.previous_at(1, 1, 0), 1.0);
        assert_eq!(field.previous_at(2, 2, 0), 4.0);
        assert_eq!(field.previous_at(0, 0, 0), 0.0);
        assert_eq!(field.previous().len(), 16);
    }

    #[test]
    fn test_degenerate_count() {
        let dims = GridDims::new(3, 1, 1).unwrap();
        let mut field = EnergyDensityField::new(dims);
        field.set_current(vec![1.0, f64::NAN, 0.5]).unwrap();
        assert_eq!(field.degenerate_count(), 1);
    }
}
