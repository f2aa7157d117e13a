// crates/mf_foundation/src/grid.rs

//! 规则网格索引
//!
//! 三个流体共享同一个 `nx × ny × nz` 网格。所有逐单元数据都存放在扁平缓冲区中，
//! 通过 `(ix, iy, iz) -> ix + nx * (iy + ny * iz)` 映射访问。

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MfError, MfResult};

/// 网格尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    nx: usize,
    ny: usize,
    nz: usize,
}

impl GridDims {
    /// 创建网格尺寸，任一方向为 0 时报错
    pub fn new(nx: usize, ny: usize, nz: usize) -> MfResult<Self> {
        for (key, n) in [("grid.nx", nx), ("grid.ny", ny), ("grid.nz", nz)] {
            if n == 0 {
                return Err(MfError::invalid_config(key, "0", "网格尺寸必须至少为 1"));
            }
        }
        Ok(Self { nx, ny, nz })
    }

    /// x 方向单元数
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// y 方向单元数
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// z 方向单元数
    #[inline]
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// 总单元数
    #[inline]
    pub fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// 网格是否为空（构造保证非空，始终返回 false）
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 扁平偏移
    #[inline]
    pub fn offset(&self, ix: usize, iy: usize, iz: usize) -> usize {
        debug_assert!(ix < self.nx && iy < self.ny && iz < self.nz);
        ix + self.nx * (iy + self.ny * iz)
    }

    /// 带越界检查的扁平偏移
    pub fn checked_offset(&self, ix: usize, iy: usize, iz: usize) -> MfResult<usize> {
        if ix >= self.nx {
            return Err(MfError::index_out_of_bounds("ix", ix, self.nx));
        }
        if iy >= self.ny {
            return Err(MfError::index_out_of_bounds("iy", iy, self.ny));
        }
        if iz >= self.nz {
            return Err(MfError::index_out_of_bounds("iz", iz, self.nz));
        }
        Ok(self.offset(ix, iy, iz))
    }

    /// 扁平偏移的逆映射
    #[inline]
    pub fn coords(&self, offset: usize) -> (usize, usize, usize) {
        let ix = offset % self.nx;
        let rest = offset / self.nx;
        (ix, rest % self.ny, rest / self.ny)
    }

    /// 按扁平顺序遍历所有 `(ix, iy, iz)`
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..self.len()).map(move |i| self.coords(i))
    }

    /// 某方向上的超立方体（相邻单元对）数量
    ///
    /// 单元数为 1 的方向仍提供一个退化的单元对。
    #[inline]
    pub fn cube_count(n: usize) -> usize {
        n.saturating_sub(1).max(1)
    }

    /// 所有方向超立方体数量
    pub fn cubes(&self) -> (usize, usize, usize) {
        (
            Self::cube_count(self.nx),
            Self::cube_count(self.ny),
            Self::cube_count(self.nz),
        )
    }

    /// 以居中方式把本网格的坐标映射到另一网格
    ///
    /// 返回 `None` 表示该单元在新网格之外。
    pub fn map_centered(
        &self,
        target: &GridDims,
        ix: usize,
        iy: usize,
        iz: usize,
    ) -> Option<(usize, usize, usize)> {
        fn shift(i: usize, from: usize, to: usize) -> Option<usize> {
            let j = i as isize + (to as isize - from as isize) / 2;
            (j >= 0 && (j as usize) < to).then_some(j as usize)
        }
        Some((
            shift(ix, self.nx, target.nx)?,
            shift(iy, self.ny, target.ny)?,
            shift(iz, self.nz, target.nz)?,
        ))
    }
}

impl fmt::Display for GridDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.nx, self.ny, self.nz)
    }
}
