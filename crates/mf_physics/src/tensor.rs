// crates/mf_physics/src/tensor.rs

//! 能动张量代数
//!
//! 度规 `g = diag(1, -1, -1, -1)`。张量以逆变分量 `T^{μν}` 存放在 `Matrix4` 中。
//!
//! # Landau 标架
//!
//! 静止系能量密度与四速度是本征问题
//!
//! ```text
//! T^μ_ν u^ν = e u^μ,   T^μ_ν = T^{μλ} g_{λν}
//! ```
//!
//! 的类时解。混合张量一般不对称，因此先由 Schur 分解求全部（复）本征值，
//! 再对每个实本征值用 SVD 求 `T^μ_ν - λ δ^μ_ν` 的零空间向量。

use nalgebra::{Matrix4, Vector4};
use thiserror::Error;

use crate::types::{NPI, PI_INDICES};

/// 四矢量（逆变分量）
pub type FourVector = Vector4<f64>;

/// 二阶张量（逆变分量）
pub type Tensor4 = Matrix4<f64>;

/// 度规分量
pub const GMUNU: [[f64; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, -1.0, 0.0, 0.0],
    [0.0, 0.0, -1.0, 0.0],
    [0.0, 0.0, 0.0, -1.0],
];

/// 张量元绝对值低于此值视为真空
const VACUUM_SCALE: f64 = 1e-14;
/// 实本征值判据（相对虚部）
const IMAG_TOLERANCE: f64 = 1e-9;
/// 类时判据（单位欧氏长度向量的 u·u）
const TIMELIKE_TOLERANCE: f64 = 1e-12;
/// 本征值去重
const DUPLICATE_TOLERANCE: f64 = 1e-10;

/// 度规矩阵
#[inline]
pub fn metric() -> Tensor4 {
    Tensor4::from_fn(|i, j| GMUNU[i][j])
}

/// Minkowski 内积 a·b
#[inline]
pub fn dot(a: &FourVector, b: &FourVector) -> f64 {
    a[0] * b[0] - a[1] * b[1] - a[2] * b[2] - a[3] * b[3]
}

/// 降指标
#[inline]
pub fn lower(u: &FourVector) -> FourVector {
    FourVector::new(u[0], -u[1], -u[2], -u[3])
}

/// 由三速度构造四速度
#[inline]
pub fn four_velocity(vx: f64, vy: f64, vz: f64) -> FourVector {
    let v2 = vx * vx + vy * vy + vz * vz;
    let gamma = 1.0 / (1.0 - v2).max(f64::MIN_POSITIVE).sqrt();
    FourVector::new(gamma, gamma * vx, gamma * vy, gamma * vz)
}

/// 四速度对应的三速度大小
#[inline]
pub fn speed(u: &FourVector) -> f64 {
    (u[1] * u[1] + u[2] * u[2] + u[3] * u[3]).sqrt() / u[0]
}

/// 理想流体能动张量 `(e + p) u^μ u^ν - p g^{μν}`
pub fn perfect_fluid(e: f64, p: f64, u: &FourVector) -> Tensor4 {
    Tensor4::from_fn(|i, j| (e + p) * u[i] * u[j] - p * GMUNU[i][j])
}

/// 粘滞修正 `π^{μν} - Π Δ^{μν}`，`Δ^{μν} = g^{μν} - u^μ u^ν`
pub fn viscous_part(pi: &[f64; NPI], bulk: f64, u: &FourVector) -> Tensor4 {
    let mut t = Tensor4::from_fn(|i, j| -bulk * (GMUNU[i][j] - u[i] * u[j]));
    for (k, &(mu, nu)) in PI_INDICES.iter().enumerate() {
        t[(mu, nu)] += pi[k];
        if mu != nu {
            t[(nu, mu)] += pi[k];
        }
    }
    t
}

/// 检查 `T^{μν} = T^{νμ}`
pub fn is_symmetric(t: &Tensor4, tolerance: f64) -> bool {
    (0..4).all(|i| (0..4).all(|j| (t[(i, j)] - t[(j, i)]).abs() <= tolerance))
}

/// 穿过面元的能动流 `dσ_μ T^{μν}`
#[inline]
pub fn flux_through(dsigma: &[f64; 4], t: &Tensor4, nu: usize) -> f64 {
    (0..4).map(|mu| dsigma[mu] * t[(mu, nu)]).sum()
}

/// 多个类时本征向量时的选择规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EigenSelection {
    /// 最大本征值
    #[default]
    LargestEigenvalue,
    /// 三速度最小（最接近实验室静止）的本征向量
    SmallestVelocity,
}

impl From<mf_config::EigenSelectionKind> for EigenSelection {
    fn from(kind: mf_config::EigenSelectionKind) -> Self {
        match kind {
            mf_config::EigenSelectionKind::LargestEigenvalue => Self::LargestEigenvalue,
            mf_config::EigenSelectionKind::SmallestVelocity => Self::SmallestVelocity,
        }
    }
}

/// Landau 标架
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandauFrame {
    /// 静止系能量密度
    pub energy_density: f64,
    /// 四速度，u·u = 1，u⁰ > 0
    pub velocity: FourVector,
}

impl LandauFrame {
    /// 真空（静止、零能量）
    pub fn vacuum() -> Self {
        Self {
            energy_density: 0.0,
            velocity: FourVector::new(1.0, 0.0, 0.0, 0.0),
        }
    }
}

/// Landau 对角化失败（单元级，可恢复）
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LandauError {
    /// 没有实本征值对应类时本征向量
    #[error("不存在类时本征向量 (T^00={t00:.6e})")]
    NoTimelikeEigenvector {
        /// 张量的 00 分量
        t00: f64,
    },
    /// 张量含非有限分量
    #[error("能动张量含非有限分量")]
    NonFinite,
}

/// 对能动张量做 Landau 分解
pub fn landau_frame(t: &Tensor4, selection: EigenSelection) -> Result<LandauFrame, LandauError> {
    if t.iter().any(|x| !x.is_finite()) {
        return Err(LandauError::NonFinite);
    }
    let scale = t.amax();
    if scale < VACUUM_SCALE {
        return Ok(LandauFrame::vacuum());
    }

    let mixed = t * metric();
    let eigenvalues = mixed.complex_eigenvalues();

    let mut best: Option<(f64, FourVector)> = None;
    let mut seen: Vec<f64> = Vec::with_capacity(4);

    for ev in eigenvalues.iter() {
        if ev.im.abs() > IMAG_TOLERANCE * scale {
            continue;
        }
        let lambda = ev.re;
        if seen.iter().any(|&s| (s - lambda).abs() <= DUPLICATE_TOLERANCE * scale) {
            continue;
        }
        seen.push(lambda);

        let Some(u) = null_vector(&(mixed - Tensor4::identity() * lambda)) else {
            continue;
        };
        let norm2 = dot(&u, &u);
        if norm2 <= TIMELIKE_TOLERANCE {
            continue;
        }
        let mut u = u / norm2.sqrt();
        if u[0] < 0.0 {
            u = -u;
        }
        let ul = lower(&u);
        let e = ul.dot(&(t * ul));

        let better = match (&best, selection) {
            (None, _) => true,
            (Some((e_best, _)), EigenSelection::LargestEigenvalue) => e > *e_best,
            (Some((e_best, u_best)), EigenSelection::SmallestVelocity) => {
                let (s, s_best) = (speed(&u), speed(u_best));
                s < s_best - DUPLICATE_TOLERANCE
                    || ((s - s_best).abs() <= DUPLICATE_TOLERANCE && e > *e_best)
            }
        };
        if better {
            best = Some((e, u));
        }
    }

    best.map(|(energy_density, velocity)| LandauFrame {
        energy_density,
        velocity,
    })
    .ok_or(LandauError::NoTimelikeEigenvector { t00: t[(0, 0)] })
}

/// 最小奇异值对应的右奇异向量
fn null_vector(a: &Tensor4) -> Option<FourVector> {
    let svd = a.svd(false, true);
    let v_t = svd.v_t?;
    let k = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|x, y| x.1.total_cmp(y.1))
        .map(|(k, _)| k)?;
    Some(v_t.row(k).transpose())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_frame(frame: &LandauFrame) {
        let u = frame.velocity;
        assert!((dot(&u, &u) - 1.0).abs() < 1e-10);
        assert!(u[0] > 0.0);
    }

    #[test]
    fn test_perfect_fluid_symmetric() {
        let u = four_velocity(0.3, -0.2, 0.5);
        let t = perfect_fluid(2.0, 0.6, &u);
        assert!(is_symmetric(&t, 0.0));
        // T^{μν} u_ν = e u^μ
        let tu = t * lower(&u);
        for mu in 0..4 {
            assert!((tu[mu] - 2.0 * u[mu]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_landau_rest_frame() {
        let t = perfect_fluid(1.5, 0.5, &FourVector::new(1.0, 0.0, 0.0, 0.0));
        let frame = landau_frame(&t, EigenSelection::default()).unwrap();
        assert!((frame.energy_density - 1.5).abs() < 1e-10);
        check_frame(&frame);
        assert!(speed(&frame.velocity) < 1e-10);
    }

    #[test]
    fn test_landau_boosted_fluid() {
        let u = four_velocity(0.1, 0.4, -0.6);
        let t = perfect_fluid(3.0, 1.0, &u);
        let frame = landau_frame(&t, EigenSelection::default()).unwrap();
        assert!((frame.energy_density - 3.0).abs() < 1e-9);
        check_frame(&frame);
        for mu in 0..4 {
            assert!((frame.velocity[mu] - u[mu]).abs() < 1e-8);
        }
    }

    #[test]
    fn test_landau_two_counter_streams() {
        // 两束对撞的尘埃：合成静止系位于中心
        let u1 = four_velocity(0.0, 0.0, 0.8);
        let u2 = four_velocity(0.0, 0.0, -0.8);
        let t = perfect_fluid(1.0, 0.0, &u1) + perfect_fluid(1.0, 0.0, &u2);
        assert!(is_symmetric(&t, 1e-15));
        let frame = landau_frame(&t, EigenSelection::SmallestVelocity).unwrap();
        check_frame(&frame);
        assert!(speed(&frame.velocity) < 1e-8);
        // 静止系能量 = T^00
        assert!((frame.energy_density - t[(0, 0)]).abs() < 1e-9);
    }

    #[test]
    fn test_landau_asymmetric_streams_unit_norm() {
        let u1 = four_velocity(0.2, 0.0, 0.9);
        let u2 = four_velocity(-0.1, 0.1, -0.7);
        let t = perfect_fluid(2.0, 0.2, &u1)
            + perfect_fluid(0.5, 0.1, &u2)
            + perfect_fluid(0.3, 0.1, &four_velocity(0.0, 0.0, 0.0));
        let frame = landau_frame(&t, EigenSelection::LargestEigenvalue).unwrap();
        check_frame(&frame);
        assert!(frame.energy_density > 0.0);
        // 本征关系
        let tu = t * lower(&frame.velocity);
        for mu in 0..4 {
            assert!((tu[mu] - frame.energy_density * frame.velocity[mu]).abs() < 1e-8);
        }
    }

    #[test]
    fn test_landau_vacuum() {
        let frame = landau_frame(&Tensor4::zeros(), EigenSelection::default()).unwrap();
        assert_eq!(frame, LandauFrame::vacuum());
    }

    #[test]
    fn test_landau_no_rest_frame() {
        // 纯空间应力，没有能量：没有类时本征向量
        let mut t = Tensor4::zeros();
        t[(1, 1)] = 1.0;
        t[(2, 2)] = 2.0;
        t[(0, 1)] = 3.0;
        t[(1, 0)] = 3.0;
        assert!(matches!(
            landau_frame(&t, EigenSelection::default()),
            Err(LandauError::NoTimelikeEigenvector { .. })
        ));
    }

    #[test]
    fn test_landau_non_finite() {
        let mut t = Tensor4::identity();
        t[(2, 3)] = f64::NAN;
        assert_eq!(
            landau_frame(&t, EigenSelection::default()),
            Err(LandauError::NonFinite)
        );
    }

    #[test]
    fn test_viscous_part_traceless_shear() {
        let u = FourVector::new(1.0, 0.0, 0.0, 0.0);
        let mut pi = [0.0; NPI];
        pi[4] = 0.1; // xx
        pi[7] = -0.1; // yy
        pi[5] = 0.05; // xy
        let t = viscous_part(&pi, 0.02, &u);
        assert!(is_symmetric(&t, 0.0));
        assert!((t[(1, 2)] - 0.05).abs() < 1e-15);
        // 静止系中 Π 只出现在空间对角元，符号为 +Π
        assert!((t[(3, 3)] - 0.02).abs() < 1e-15);
        assert!(t[(0, 0)].abs() < 1e-15);
    }

    #[test]
    fn test_flux_through_time_surface() {
        let t = perfect_fluid(1.2, 0.4, &FourVector::new(1.0, 0.0, 0.0, 0.0));
        let dsigma = [2.0, 0.0, 0.0, 0.0];
        assert!((flux_through(&dsigma, &t, 0) - 2.4).abs() < 1e-14);
    }
}
