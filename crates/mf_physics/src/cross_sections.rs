// crates/mf_physics/src/cross_sections.rs

//! 强子截面参数化
//!
//! 所有截面以 mb 为单位，自变量为 Mandelstam s [GeV²]。

use crate::types::PhysicalConstants;

/// 火球中参与摩擦的介子种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// π 介子 (π⁺, π⁰, π⁻)
    Pion,
    /// K 介子 (K⁺, K⁰, K̄⁰, K⁻)
    Kaon,
}

impl Species {
    /// 火球成分
    pub const FIREBALL: [Species; 2] = [Self::Pion, Self::Kaon];

    /// 质量 [GeV]
    pub fn mass(self) -> f64 {
        match self {
            Self::Pion => PhysicalConstants::PION_MASS,
            Self::Kaon => PhysicalConstants::KAON_MASS,
        }
    }

    /// 简并度
    pub fn degeneracy(self) -> f64 {
        match self {
            Self::Pion => 3.0,
            Self::Kaon => 4.0,
        }
    }

    /// 是否携带奇异数
    pub fn is_strange(self) -> bool {
        matches!(self, Self::Kaon)
    }
}

/// 截面
pub trait CrossSections: Send + Sync {
    /// pp 总截面 [mb]
    fn pp_total(&self, s: f64) -> f64;

    /// pp 弹性截面 [mb]
    fn pp_elastic(&self, s: f64) -> f64;

    /// 介子-核子总截面 [mb]
    fn meson_nucleon(&self, species: Species, s: f64) -> f64;
}

/// 参数化截面
///
/// pp 总截面使用 PDG 高能拟合：
/// ```text
/// σ_tot = 35.45 + 0.308 ln²(s/28.94) + 42.53 s^-0.458 − 33.34 s^-0.545
/// ```
/// 弹性截面按实验室动量分段拟合，并以总截面封顶。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParametrizedCrossSections {
    /// Δ(1232) 峰值截面 [mb]
    pub delta_peak: f64,
    /// πN 非共振本底 [mb]
    pub pion_background: f64,
    /// KN 截面 [mb]
    pub kaon_nucleon: f64,
}

impl Default for ParametrizedCrossSections {
    fn default() -> Self {
        Self {
            delta_peak: 120.0,
            pion_background: 20.0,
            kaon_nucleon: 18.0,
        }
    }
}

const DELTA_MASS: f64 = 1.232;
const DELTA_WIDTH: f64 = 0.117;

/// 对心系 s 对应的实验室动量 [GeV]
pub fn lab_momentum(s: f64) -> f64 {
    let m = PhysicalConstants::NUCLEON_MASS;
    (s * (s - 4.0 * m * m)).max(0.0).sqrt() / (2.0 * m)
}

/// pp 总截面 PDG 拟合 [mb]
pub fn pp_total(s: f64) -> f64 {
    if s <= 0.0 {
        return 0.0;
    }
    let l = (s / 28.94).ln();
    35.45 + 0.308 * l * l + 42.53 * s.powf(-0.458) - 33.34 * s.powf(-0.545)
}

/// pp 弹性截面 [mb]
pub fn pp_elastic(s: f64) -> f64 {
    let m = PhysicalConstants::NUCLEON_MASS;
    let p = lab_momentum(s);
    let sigma = if p < 0.435 {
        5.12 * m / (s - 4.0 * m * m).max(1e-6) + 1.67
    } else if p < 0.8 {
        23.5 + 1000.0 * (p - 0.7).powi(4)
    } else if p <= 2.0 {
        77.0 / (p + 1.5)
    } else {
        let l = p.ln();
        11.9 + 26.9 * p.powf(-1.21) + 0.169 * l * l - 1.85 * l
    };
    sigma.min(pp_total(s))
}

/// Pauli 阻塞因子 `n_sat / (n_sat + n_B)`
#[inline]
pub fn fermi(nb: f64) -> f64 {
    let n_sat = PhysicalConstants::SATURATION_DENSITY;
    n_sat / (n_sat + nb.abs())
}

impl CrossSections for ParametrizedCrossSections {
    fn pp_total(&self, s: f64) -> f64 {
        pp_total(s)
    }

    fn pp_elastic(&self, s: f64) -> f64 {
        pp_elastic(s)
    }

    fn meson_nucleon(&self, species: Species, s: f64) -> f64 {
        match species {
            Species::Pion => {
                let sqrt_s = s.max(0.0).sqrt();
                let hw = 0.5 * DELTA_WIDTH;
                let bw = hw * hw / ((sqrt_s - DELTA_MASS).powi(2) + hw * hw);
                self.pion_background + self.delta_peak * bw
            }
            Species::Kaon => self.kaon_nucleon,
        }
    }
}
