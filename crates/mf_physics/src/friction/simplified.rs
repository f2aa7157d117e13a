// crates/mf_physics/src/friction/simplified.rs

//! 简化摩擦闭合
//!
//! ```text
//! F_α = −λ n_p n_t V_rel m_N σ_pp(s_NN) u_α,   α ∈ {p, t}
//! ```
//!
//! 截面在碰撞能量 `s_NN` 处取常数，λ 为整体强度。

use crate::cross_sections::CrossSections;
use crate::tensor::dot;
use crate::types::PhysicalConstants;

use super::microscopic::relative_velocity;
use super::traits::{FrictionForces, FrictionInput, FrictionModel};

/// 简化摩擦
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplifiedFriction {
    lambda: f64,
    /// σ_pp(s_NN) [fm²]
    sigma: f64,
}

impl SimplifiedFriction {
    /// 由强度、√s_NN [GeV] 与截面模型创建
    pub fn new(lambda: f64, sqrt_snn: f64, cross_sections: &dyn CrossSections) -> Self {
        let sigma = cross_sections.pp_total(sqrt_snn * sqrt_snn) * PhysicalConstants::MB_TO_FM2;
        Self { lambda, sigma }
    }

    /// 强度
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// 使用的截面 [fm²]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl FrictionModel for SimplifiedFriction {
    fn name(&self) -> &'static str {
        "Simplified"
    }

    fn compute(&self, input: &FrictionInput) -> FrictionForces {
        let (p, t) = (&input.projectile, &input.target);
        let (np, nt) = (p.baryon_density, t.baryon_density);
        if np <= 0.0 || nt <= 0.0 {
            return FrictionForces::ZERO;
        }
        let m = PhysicalConstants::NUCLEON_MASS;
        let s = 2.0 * m * m * (1.0 + dot(&p.velocity, &t.velocity));
        let v_rel = relative_velocity(s);
        if v_rel <= 1e-6 {
            return FrictionForces::ZERO;
        }
        let c = -self.lambda * np * nt * v_rel * m * self.sigma;
        let mut fp = [0.0; 4];
        let mut ft = [0.0; 4];
        for mu in 0..4 {
            fp[mu] = c * p.velocity[mu];
            ft[mu] = c * t.velocity[mu];
        }
        FrictionForces::balanced(fp, ft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cross_sections::{ParametrizedCrossSections, Species};
    use crate::eos::ThermoState;
    use crate::friction::traits::FluidSample;
    use crate::tensor::four_velocity;

    fn baryons(nb: f64, vz: f64) -> FluidSample {
        FluidSample {
            energy_density: nb * PhysicalConstants::NUCLEON_MASS,
            baryon_density: nb,
            velocity: four_velocity(0.0, 0.0, vz),
            thermo: ThermoState::default(),
        }
    }

    /// pp 总截面固定的模型
    struct FixedCrossSections(f64);

    impl CrossSections for FixedCrossSections {
        fn pp_total(&self, _s: f64) -> f64 {
            self.0
        }

        fn pp_elastic(&self, _s: f64) -> f64 {
            self.0
        }

        fn meson_nucleon(&self, _species: Species, _s: f64) -> f64 {
            0.0
        }
    }

    fn model(lambda: f64) -> SimplifiedFriction {
        SimplifiedFriction::new(lambda, 8.8, &ParametrizedCrossSections::default())
    }

    #[test]
    fn test_at_rest_no_friction() {
        let f = model(1.0).compute(&FrictionInput {
            projectile: baryons(0.16, 0.0),
            target: baryons(0.16, 0.0),
            fireball: FluidSample::vacuum(),
        });
        assert_eq!(f, FrictionForces::ZERO);
    }

    #[test]
    fn test_scales_with_lambda() {
        let input = FrictionInput {
            projectile: baryons(0.16, 0.5),
            target: baryons(0.1, -0.5),
            fireball: FluidSample::vacuum(),
        };
        let f1 = model(1.0).compute(&input);
        let f2 = model(2.0).compute(&input);
        assert!(f1.projectile[0] < 0.0);
        assert!((f2.projectile[0] / f1.projectile[0] - 2.0).abs() < 1e-12);
        assert!(f1.fireball[0] > 0.0);
        for x in f1.net() {
            assert!(x.abs() < 1e-15);
        }
    }

    #[test]
    fn test_uses_injected_cross_sections() {
        let input = FrictionInput {
            projectile: baryons(0.16, 0.5),
            target: baryons(0.16, -0.5),
            fireball: FluidSample::vacuum(),
        };
        let small = SimplifiedFriction::new(1.0, 8.8, &FixedCrossSections(10.0));
        let large = SimplifiedFriction::new(1.0, 8.8, &FixedCrossSections(30.0));
        assert!((small.sigma() - 10.0 * PhysicalConstants::MB_TO_FM2).abs() < 1e-14);
        let (f1, f3) = (small.compute(&input), large.compute(&input));
        assert!((f3.projectile[0] / f1.projectile[0] - 3.0).abs() < 1e-12);
    }
}
