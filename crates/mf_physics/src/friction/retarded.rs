// crates/mf_physics/src/friction/retarded.rs

//! 推迟摩擦缓冲
//!
//! 火球获得的能动量在形成时间 τ_f 之后才交付。缓冲按发射时间保存切片
//! `(τ_emit, 每单元源项率)`。每个切片恰好交付一次：在区间 `(τ − dτ, τ]`
//! 包含 `τ_emit + τ_f` 的那一步。历史不够早时交付 0。

use std::collections::VecDeque;

use mf_foundation::{GridDims, KahanSum, MfError};

use crate::error::PhysicsResult;

#[derive(Debug, Clone)]
struct Slice {
    tau: f64,
    flux: Vec<[f64; 4]>,
}

/// 推迟摩擦缓冲
#[derive(Debug, Clone)]
pub struct RetardedFrictionBuffer {
    formation_time: f64,
    dtau: f64,
    n_cells: usize,
    slices: VecDeque<Slice>,
}

impl RetardedFrictionBuffer {
    /// 创建
    pub fn new(n_cells: usize, formation_time: f64, dtau: f64) -> Self {
        Self {
            formation_time: formation_time.max(0.0),
            dtau,
            n_cells,
            slices: VecDeque::new(),
        }
    }

    /// 形成时间
    pub fn formation_time(&self) -> f64 {
        self.formation_time
    }

    /// 保存的切片数
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// 把尚未交付的切片居中映射到新网格，落在新网格之外的单元被丢弃
    pub fn remap(&mut self, from: GridDims, to: GridDims) {
        if from == to && self.n_cells == to.len() {
            return;
        }
        for slice in self.slices.iter_mut() {
            let mut flux = vec![[0.0; 4]; to.len()];
            for (i, f) in slice.flux.iter().enumerate() {
                let (ix, iy, iz) = from.coords(i);
                if let Some((jx, jy, jz)) = from.map_centered(&to, ix, iy, iz) {
                    flux[to.offset(jx, jy, jz)] = *f;
                }
            }
            slice.flux = flux;
        }
        self.n_cells = to.len();
    }

    #[inline]
    fn tolerance(tau: f64) -> f64 {
        1e-9 * tau.abs().max(1.0)
    }

    /// 找到或插入 τ 处的切片
    fn slice_mut(&mut self, tau: f64) -> &mut Slice {
        let eps = Self::tolerance(tau);
        let pos = self.slices.partition_point(|s| s.tau < tau - eps);
        let exists = self
            .slices
            .get(pos)
            .is_some_and(|s| (s.tau - tau).abs() <= eps);
        if !exists {
            self.slices.insert(
                pos,
                Slice {
                    tau,
                    flux: vec![[0.0; 4]; self.n_cells],
                },
            );
        }
        &mut self.slices[pos]
    }

    /// 登记单元在 τ 发射的源项率
    pub fn add(&mut self, flux: &[f64; 4], cell: usize, tau: f64) -> PhysicsResult<()> {
        if cell >= self.n_cells {
            return Err(MfError::index_out_of_bounds("cell", cell, self.n_cells).into());
        }
        let slot = &mut self.slice_mut(tau).flux[cell];
        for (s, f) in slot.iter_mut().zip(flux) {
            *s += f;
        }
        Ok(())
    }

    /// 登记整层源项率
    pub fn add_slice(&mut self, tau: f64, flux: &[[f64; 4]]) -> PhysicsResult<()> {
        if flux.len() != self.n_cells {
            return Err(MfError::size_mismatch("retarded flux", self.n_cells, flux.len()).into());
        }
        let slice = self.slice_mut(tau);
        for (slot, f) in slice.flux.iter_mut().zip(flux) {
            for mu in 0..4 {
                slot[mu] += f[mu];
            }
        }
        Ok(())
    }

    /// τ 时交付给单元的源项率
    ///
    /// 累加 `τ_emit + τ_f ∈ (τ − dτ, τ]` 的全部切片，每步调用一次时
    /// 每个切片只交付一次。
    pub fn calculate(&self, cell: usize, tau: f64) -> [f64; 4] {
        let mut out = [0.0; 4];
        if cell >= self.n_cells {
            return out;
        }
        let (lo, hi) = self.window(tau);
        for slice in self.slices.iter().filter(|s| s.tau > lo && s.tau <= hi) {
            for mu in 0..4 {
                out[mu] += slice.flux[cell][mu];
            }
        }
        out
    }

    /// τ 步交付的发射时间区间 `(lo, hi]`
    #[inline]
    fn window(&self, tau: f64) -> (f64, f64) {
        let eps = Self::tolerance(tau);
        let hi = tau - self.formation_time + eps;
        (hi - self.dtau, hi)
    }

    /// 淘汰 τ 及之前已交付的切片
    pub fn clear(&mut self, tau: f64) {
        let (_, delivered_up_to) = self.window(tau);
        while self.slices.front().is_some_and(|s| s.tau <= delivered_up_to) {
            self.slices.pop_front();
        }
    }

    /// τ 之后尚未交付的源项率之和（按单元求和）
    pub fn in_flight(&self, tau: f64) -> [f64; 4] {
        let (_, delivered_up_to) = self.window(tau);
        let mut sums = [KahanSum::new(); 4];
        for slice in self.slices.iter().filter(|s| s.tau > delivered_up_to) {
            for f in &slice.flux {
                for mu in 0..4 {
                    sums[mu].add(f[mu]);
                }
            }
        }
        sums.map(|s| s.value())
    }
}
