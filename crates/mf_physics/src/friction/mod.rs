// crates/mf_physics/src/friction/mod.rs

//! 流体间摩擦
//!
//! - [`MicroscopicFriction`]: 基于截面的微观摩擦 (λ = 0)
//! - [`SimplifiedFriction`]: 常数截面闭合 (λ > 0)
//! - [`RetardedFrictionBuffer`]: 火球源项的推迟交付

pub mod microscopic;
pub mod retarded;
pub mod simplified;
pub mod traits;

pub use microscopic::{relative_velocity, MicroscopicFriction};
pub use retarded::RetardedFrictionBuffer;
pub use simplified::SimplifiedFriction;
pub use traits::{FluidSample, FrictionForces, FrictionInput, FrictionModel};

use crate::cross_sections::CrossSections;

/// 按 λ 选择摩擦模型
pub fn select_model(
    lambda: f64,
    sqrt_snn: f64,
    min_fireball_temperature: f64,
    cross_sections: Box<dyn CrossSections>,
) -> Box<dyn FrictionModel> {
    if lambda > 0.0 {
        Box::new(SimplifiedFriction::new(lambda, sqrt_snn, cross_sections.as_ref()))
    } else {
        Box::new(MicroscopicFriction::new(
            cross_sections,
            min_fireball_temperature,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cross_sections::ParametrizedCrossSections;

    #[test]
    fn test_select_model() {
        let xs = || Box::new(ParametrizedCrossSections::default());
        assert_eq!(select_model(0.0, 8.8, 0.01, xs()).name(), "Microscopic");
        assert_eq!(select_model(0.5, 8.8, 0.01, xs()).name(), "Simplified");
    }
}
