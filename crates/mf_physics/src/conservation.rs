// crates/mf_physics/src/conservation.rs

//! 守恒诊断
//!
//! 比较阈值以上区域损失的流体能量与穿过冻结面的净能量。流体能量按
//! 超立方体覆盖的区域计：多于一个单元的轴上，两端单元权重为 1/2。

use mf_foundation::{GridDims, KahanSum};
use serde::Serialize;

use crate::fluid::Fluid;

/// 守恒量快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ConservedTotals {
    /// 固有时
    pub tau: f64,
    /// 三流体总能量 Σ Q⁰ ΔV
    pub total_energy: f64,
    /// 三流体总动量 Σ Q^i ΔV
    pub total_momentum: [f64; 3],
    /// 能量密度不低于阈值的单元中的能量
    pub fluid_energy: f64,
}

/// 单轴上的梯形权重
#[inline]
fn edge_weight(i: usize, n: usize) -> f64 {
    if n > 1 && (i == 0 || i == n - 1) {
        0.5
    } else {
        1.0
    }
}

/// 单元在超立方体覆盖区域中的权重
pub fn coverage_weight(dims: &GridDims, ix: usize, iy: usize, iz: usize) -> f64 {
    edge_weight(ix, dims.nx()) * edge_weight(iy, dims.ny()) * edge_weight(iz, dims.nz())
}

impl ConservedTotals {
    /// 由三个流体与当前能量密度场计算
    pub fn compute(fluids: [&Fluid; 3], tau: f64, field: &[f64], e_crit: f64) -> Self {
        let geometry = fluids[0].geometry();
        let dims = geometry.dims;
        let volume = geometry.cell_volume();

        let mut energy = KahanSum::new();
        let mut momentum = [KahanSum::new(); 3];
        let mut fluid_energy = KahanSum::new();

        for (i, (ix, iy, iz)) in dims.iter().enumerate() {
            let mut e_cell = 0.0;
            for fluid in fluids {
                let q = fluid.cell_at(i).q();
                e_cell += q[0];
                for k in 0..3 {
                    momentum[k].add(q[k + 1] * volume);
                }
            }
            energy.add(e_cell * volume);
            if field.get(i).is_some_and(|&e| e >= e_crit) {
                fluid_energy.add(e_cell * volume * coverage_weight(&dims, ix, iy, iz));
            }
        }

        Self {
            tau,
            total_energy: energy.value(),
            total_momentum: momentum.map(|m| m.value()),
            fluid_energy: fluid_energy.value(),
        }
    }
}

/// 两个快照之间的能量收支
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConservationReport {
    /// 阈值以上区域损失的能量
    pub fluid_energy_lost: f64,
    /// 冻结面净能量
    pub surface_energy: f64,
    /// 相对偏差
    pub relative_mismatch: f64,
}

impl ConservationReport {
    /// 比较
    pub fn between(before: &ConservedTotals, after: &ConservedTotals, surface_energy: f64) -> Self {
        let lost = before.fluid_energy - after.fluid_energy;
        let scale = lost.abs().max(surface_energy.abs()).max(1e-12);
        Self {
            fluid_energy_lost: lost,
            surface_energy,
            relative_mismatch: (lost - surface_energy).abs() / scale,
        }
    }

    /// 是否在容差内
    pub fn within_tolerance(&self, tol: f64) -> bool {
        self.relative_mismatch <= tol
    }
}
