// crates/mf_physics/src/types.rs

//! 核心类型与物理常量
//!
//! 单位约定：能量 GeV，长度 fm，截面 mb (1 mb = 0.1 fm²)。

use mf_config::CoordinateKind;
use std::fmt;

/// 物理常量
pub struct PhysicalConstants;

impl PhysicalConstants {
    /// ħc [GeV·fm]
    pub const HBARC: f64 = 0.197_326_980_4;
    /// 核子质量 [GeV]
    pub const NUCLEON_MASS: f64 = 0.938;
    /// π 介子质量 [GeV]
    pub const PION_MASS: f64 = 0.138;
    /// K 介子质量 [GeV]
    pub const KAON_MASS: f64 = 0.494;
    /// 核饱和密度 [fm⁻³]
    pub const SATURATION_DENSITY: f64 = 0.16;
    /// mb → fm²
    pub const MB_TO_FM2: f64 = 0.1;
}

/// 守恒向量的分量数：T^{0ν} (4) + J_B, J_Q, J_S
pub const NQ: usize = 7;

/// 剪切张量独立分量数
pub const NPI: usize = 10;

/// 剪切张量 10 个独立分量的 (μ, ν) 排列
pub const PI_INDICES: [(usize, usize); NPI] = [
    (0, 0),
    (0, 1),
    (0, 2),
    (0, 3),
    (1, 1),
    (1, 2),
    (1, 3),
    (2, 2),
    (2, 3),
    (3, 3),
];

/// (μ, ν) 在 10 分量剪切数组中的位置
#[inline]
pub fn pi_index(mu: usize, nu: usize) -> usize {
    let (a, b) = if mu <= nu { (mu, nu) } else { (nu, mu) };
    match (a, b) {
        (0, n) => n,
        (1, n) => 3 + n,
        (2, n) => 5 + n,
        _ => 9,
    }
}

/// 三个流体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FluidKind {
    /// 弹核流体
    Projectile,
    /// 靶核流体
    Target,
    /// 火球（相互作用产生的流体）
    Fireball,
}

impl FluidKind {
    /// 固定顺序
    pub const ALL: [FluidKind; 3] = [Self::Projectile, Self::Target, Self::Fireball];

    /// 在三元组中的位置
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Projectile => 0,
            Self::Target => 1,
            Self::Fireball => 2,
        }
    }

    /// 短标签，用于文件名和日志
    pub fn tag(self) -> &'static str {
        match self {
            Self::Projectile => "p",
            Self::Target => "t",
            Self::Fireball => "f",
        }
    }
}

impl fmt::Display for FluidKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Projectile => "projectile",
            Self::Target => "target",
            Self::Fireball => "fireball",
        };
        f.write_str(name)
    }
}

/// 坐标系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSystem {
    /// (t, x, y, z)，守恒量不加权
    #[default]
    Cartesian,
    /// (τ, x, y, η)，守恒量以 τ 加权存储，张量分量取局域正交标架
    Milne,
}

impl CoordinateSystem {
    /// 守恒量的存储权重（Milne 下为 τ）
    #[inline]
    pub fn weight(self, tau: f64) -> f64 {
        match self {
            Self::Cartesian => 1.0,
            Self::Milne => tau,
        }
    }
}

impl From<CoordinateKind> for CoordinateSystem {
    fn from(kind: CoordinateKind) -> Self {
        match kind {
            CoordinateKind::Cartesian => Self::Cartesian,
            CoordinateKind::Milne => Self::Milne,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pi_index_matches_table() {
        for (k, &(mu, nu)) in PI_INDICES.iter().enumerate() {
            assert_eq!(pi_index(mu, nu), k);
            assert_eq!(pi_index(nu, mu), k);
        }
    }

    #[test]
    fn test_fluid_kind_order() {
        for (i, kind) in FluidKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(FluidKind::Fireball.tag(), "f");
    }

    #[test]
    fn test_coordinate_weight() {
        assert_eq!(CoordinateSystem::Cartesian.weight(3.0), 1.0);
        assert_eq!(CoordinateSystem::Milne.weight(3.0), 3.0);
    }
}
