// crates/mf_physics/src/friction/microscopic.rs

//! 微观 (Ivanov) 摩擦
//!
//! # 弹核-靶核
//!
//! ```text
//! s     = 2 m_N² (1 + u_p·u_t)
//! V_rel = √(s (s − 4 m_N²)) / (2 m_N²)
//! D_P   = m_N V_rel σ_el(s)
//! D_E   = m_N V_rel (σ_tot(s) − σ_el(s))
//! F_p   = −n_p n_t B [D_P (u_p − u_t) + D_E (u_p + u_t)]
//! F_t   = −n_p n_t B [D_P (u_t − u_p) + D_E (u_p + u_t)]
//! B     = Fermi(n_p) Fermi(n_t)
//! ```
//!
//! # 火球-重子
//!
//! 核子在火球静止系中的散射率
//! `Γ = Σ_i g_i/(2π)³ ∫ d³k f_i(k) σ_iN(s) v_Møller`，
//! 受力 `F_α −= n_α Γ m_N (u_α − u_f)`，火球得到反作用。

use std::f64::consts::PI;

use crate::cross_sections::{fermi, CrossSections, Species};
use crate::tensor::{dot, FourVector};
use crate::types::PhysicalConstants;

use super::traits::{FluidSample, FrictionForces, FrictionInput, FrictionModel};

/// 动量积分的截断 (以温度为单位)
const MOMENTUM_CUTOFF: f64 = 30.0;
/// 动量积分点数
const MOMENTUM_POINTS: usize = 48;
/// 角度积分点数
const ANGLE_POINTS: usize = 12;
/// 忽略的重子密度
const MIN_DENSITY: f64 = 1e-12;
/// u_p·u_t − 1 低于此值视为共动
const COMOVING_TOLERANCE: f64 = 1e-12;

/// 微观摩擦模型
pub struct MicroscopicFriction {
    cross_sections: Box<dyn CrossSections>,
    min_fireball_temperature: f64,
}

impl MicroscopicFriction {
    /// 创建
    pub fn new(cross_sections: Box<dyn CrossSections>, min_fireball_temperature: f64) -> Self {
        Self {
            cross_sections,
            min_fireball_temperature,
        }
    }

    /// 截面
    pub fn cross_sections(&self) -> &dyn CrossSections {
        self.cross_sections.as_ref()
    }

    /// 弹核-靶核摩擦力
    pub fn baryon_forces(&self, p: &FluidSample, t: &FluidSample) -> ([f64; 4], [f64; 4]) {
        let (np, nt) = (p.baryon_density, t.baryon_density);
        if np < MIN_DENSITY || nt < MIN_DENSITY {
            return ([0.0; 4], [0.0; 4]);
        }
        let m = PhysicalConstants::NUCLEON_MASS;
        let (up, ut) = (&p.velocity, &t.velocity);
        let gamma_rel = dot(up, ut);
        if gamma_rel - 1.0 <= COMOVING_TOLERANCE {
            return ([0.0; 4], [0.0; 4]);
        }
        let s = 2.0 * m * m * (1.0 + gamma_rel);
        let v_rel = relative_velocity(s);

        let mb = PhysicalConstants::MB_TO_FM2;
        let sigma_tot = self.cross_sections.pp_total(s) * mb;
        let sigma_el = self.cross_sections.pp_elastic(s) * mb;
        let d_p = m * v_rel * sigma_el;
        let d_e = m * v_rel * (sigma_tot - sigma_el).max(0.0);
        let pre = np * nt * fermi(np) * fermi(nt);

        let mut fp = [0.0; 4];
        let mut ft = [0.0; 4];
        for mu in 0..4 {
            let sum = d_e * (up[mu] + ut[mu]);
            fp[mu] = -pre * (d_p * (up[mu] - ut[mu]) + sum);
            ft[mu] = -pre * (d_p * (ut[mu] - up[mu]) + sum);
        }
        (fp, ft)
    }

    /// 核子在火球静止系中动量 `p` 时的总散射率 [fm⁻¹]
    pub fn total_scat_rate(&self, p: f64, temperature: f64, mu_s: f64) -> f64 {
        Species::FIREBALL
            .iter()
            .map(|&species| self.calculate_scat_rates(p, temperature, mu_s, species))
            .sum()
    }

    /// 单一介子种类的散射率 [fm⁻¹]
    ///
    /// 玻尔兹曼分布，奇异介子带 `cosh(μ_S/T)` 逸度。
    pub fn calculate_scat_rates(&self, p: f64, temperature: f64, mu_s: f64, species: Species) -> f64 {
        if temperature <= 0.0 {
            return 0.0;
        }
        let mn = PhysicalConstants::NUCLEON_MASS;
        let m = species.mass();
        let e_n = (p * p + mn * mn).sqrt();
        let fugacity = if species.is_strange() {
            (mu_s / temperature).cosh()
        } else {
            1.0
        };

        let k_max = MOMENTUM_CUTOFF * temperature;
        let dk = k_max / MOMENTUM_POINTS as f64;
        let dc = 2.0 / ANGLE_POINTS as f64;

        let mut integral = 0.0;
        for ik in 0..MOMENTUM_POINTS {
            let k = (ik as f64 + 0.5) * dk;
            let e_k = (k * k + m * m).sqrt();
            let weight = k * k * (-e_k / temperature).exp();
            let mut angular = 0.0;
            for ic in 0..ANGLE_POINTS {
                let cos = -1.0 + (ic as f64 + 0.5) * dc;
                let pk = e_n * e_k - p * k * cos;
                let s = mn * mn + m * m + 2.0 * pk;
                let v = ((pk * pk - mn * mn * m * m).max(0.0)).sqrt() / (e_n * e_k);
                angular += self.cross_sections.meson_nucleon(species, s) * v;
            }
            integral += weight * angular * dc;
        }
        integral *= dk;

        // g/(2π)³ · 2π ∫ k² dk d(cosθ)，GeV³ → fm⁻³，mb → fm²
        let hc3 = PhysicalConstants::HBARC.powi(3);
        species.degeneracy() * fugacity * integral / (4.0 * PI * PI) / hc3
            * PhysicalConstants::MB_TO_FM2
    }

    /// 火球对单个重子流体的摩擦力
    fn fireball_force(&self, baryon: &FluidSample, fireball: &FluidSample) -> [f64; 4] {
        let n = baryon.baryon_density;
        if n < MIN_DENSITY || fireball.is_empty() {
            return [0.0; 4];
        }
        let temperature = fireball.thermo.temperature;
        if temperature < self.min_fireball_temperature {
            return [0.0; 4];
        }
        let m = PhysicalConstants::NUCLEON_MASS;
        let gamma = dot(&baryon.velocity, &fireball.velocity).max(1.0);
        let p = m * (gamma * gamma - 1.0).sqrt();
        let rate = self.total_scat_rate(p, temperature, fireball.thermo.mu_s);
        let du: FourVector = baryon.velocity - fireball.velocity;
        let mut f = [0.0; 4];
        for mu in 0..4 {
            f[mu] = -n * rate * m * du[mu];
        }
        f
    }
}

/// 两核子的相对速度参数 `√(s (s − 4m²)) / (2m²)`
#[inline]
pub fn relative_velocity(s: f64) -> f64 {
    let m2 = PhysicalConstants::NUCLEON_MASS.powi(2);
    (s * (s - 4.0 * m2)).max(0.0).sqrt() / (2.0 * m2)
}

impl FrictionModel for MicroscopicFriction {
    fn name(&self) -> &'static str {
        "Microscopic"
    }

    fn compute(&self, input: &FrictionInput) -> FrictionForces {
        let (mut fp, mut ft) = self.baryon_forces(&input.projectile, &input.target);
        let fpf = self.fireball_force(&input.projectile, &input.fireball);
        let ftf = self.fireball_force(&input.target, &input.fireball);
        for mu in 0..4 {
            fp[mu] += fpf[mu];
            ft[mu] += ftf[mu];
        }
        FrictionForces::balanced(fp, ft)
    }
}

impl std::fmt::Debug for MicroscopicFriction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicroscopicFriction")
            .field("min_fireball_temperature", &self.min_fireball_temperature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cross_sections::ParametrizedCrossSections;
    use crate::eos::ThermoState;
    use crate::tensor::four_velocity;

    fn model() -> MicroscopicFriction {
        MicroscopicFriction::new(Box::new(ParametrizedCrossSections::default()), 0.01)
    }

    fn baryons(nb: f64, vz: f64) -> FluidSample {
        FluidSample {
            energy_density: nb * PhysicalConstants::NUCLEON_MASS,
            baryon_density: nb,
            velocity: four_velocity(0.0, 0.0, vz),
            thermo: ThermoState::default(),
        }
    }

    fn fireball(temperature: f64) -> FluidSample {
        FluidSample {
            energy_density: 1.0,
            baryon_density: 0.0,
            velocity: four_velocity(0.0, 0.0, 0.0),
            thermo: ThermoState {
                temperature,
                ..ThermoState::default()
            },
        }
    }

    struct ConstantSigma(f64);

    impl CrossSections for ConstantSigma {
        fn pp_total(&self, _s: f64) -> f64 {
            self.0
        }
        fn pp_elastic(&self, _s: f64) -> f64 {
            0.5 * self.0
        }
        fn meson_nucleon(&self, species: Species, _s: f64) -> f64 {
            match species {
                Species::Pion => self.0,
                Species::Kaon => 0.0,
            }
        }
    }

    #[test]
    fn test_relative_velocity_at_threshold() {
        let m = PhysicalConstants::NUCLEON_MASS;
        assert_eq!(relative_velocity(4.0 * m * m), 0.0);
        // s = 2m²(1 + γ) 时 V_rel = √(γ² − 1)
        let gamma: f64 = 2.0;
        let s = 2.0 * m * m * (1.0 + gamma);
        assert!((relative_velocity(s) - (gamma * gamma - 1.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_comoving_baryons_no_friction() {
        let f = model().compute(&FrictionInput {
            projectile: baryons(0.16, 0.3),
            target: baryons(0.16, 0.3),
            fireball: FluidSample::vacuum(),
        });
        assert_eq!(f, FrictionForces::ZERO);
    }

    #[test]
    fn test_counter_streaming_decelerates() {
        let f = model().compute(&FrictionInput {
            projectile: baryons(0.16, 0.6),
            target: baryons(0.16, -0.6),
            fireball: FluidSample::vacuum(),
        });
        // 弹核沿 +z 运动，受到 −z 方向力；两者都损失能量
        assert!(f.projectile[3] < 0.0);
        assert!(f.target[3] > 0.0);
        assert!(f.projectile[0] < 0.0);
        assert!(f.target[0] < 0.0);
        assert!(f.fireball[0] > 0.0);
        for (mu, x) in f.net().iter().enumerate() {
            assert!(x.abs() <= 1e-14 * f.fireball[0].abs().max(1.0), "mu={mu}");
        }
    }

    #[test]
    fn test_cold_fireball_skipped() {
        let input = FrictionInput {
            projectile: baryons(0.16, 0.5),
            target: FluidSample::vacuum(),
            fireball: fireball(0.005),
        };
        assert_eq!(model().compute(&input), FrictionForces::ZERO);
    }

    #[test]
    fn test_hot_fireball_drags_baryons() {
        let input = FrictionInput {
            projectile: baryons(0.16, 0.5),
            target: FluidSample::vacuum(),
            fireball: fireball(0.15),
        };
        let f = model().compute(&input);
        assert!(f.projectile[3] < 0.0);
        assert!(f.fireball[3] > 0.0);
        assert!(f.is_valid());
    }

    #[test]
    fn test_scat_rate_massless_limit() {
        // T ≫ m_π 且核子静止时 Γ ≈ n_π σ
        let model = MicroscopicFriction::new(Box::new(ConstantSigma(10.0)), 0.0);
        let t = 1.0;
        let rate = model.total_scat_rate(0.0, t, 0.0);
        let hc3 = PhysicalConstants::HBARC.powi(3);
        let density = 3.0 * t.powi(3) / (PI * PI) / hc3;
        let expected = density * 10.0 * PhysicalConstants::MB_TO_FM2;
        assert!((rate / expected - 1.0).abs() < 0.05, "rate={rate} expected={expected}");
    }

    #[test]
    fn test_scat_rate_grows_with_temperature() {
        let model = model();
        let cold = model.total_scat_rate(0.3, 0.08, 0.0);
        let hot = model.total_scat_rate(0.3, 0.16, 0.0);
        assert!(cold > 0.0);
        assert!(hot > cold);
        assert_eq!(model.total_scat_rate(0.3, 0.0, 0.0), 0.0);
    }
}
