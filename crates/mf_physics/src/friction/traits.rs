// crates/mf_physics/src/friction/traits.rs

//! 摩擦模型接口
//!
//! 摩擦力为逆变四矢量 `F^μ = dT^{0μ}/dτ`（实验室系单位体积），单位 GeV/fm⁴。

use crate::eos::ThermoState;
use crate::fluid::PrimitiveState;
use crate::tensor::FourVector;

/// 摩擦计算所需的单流体局域状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidSample {
    /// 静止系能量密度
    pub energy_density: f64,
    /// 静止系重子密度
    pub baryon_density: f64,
    /// 四速度
    pub velocity: FourVector,
    /// 热力学状态（仅火球需要）
    pub thermo: ThermoState,
}

impl FluidSample {
    /// 真空
    pub fn vacuum() -> Self {
        Self {
            energy_density: 0.0,
            baryon_density: 0.0,
            velocity: FourVector::new(1.0, 0.0, 0.0, 0.0),
            thermo: ThermoState::default(),
        }
    }

    /// 由原始变量构造
    pub fn from_primitive(prim: &PrimitiveState, thermo: ThermoState) -> Self {
        Self {
            energy_density: prim.e,
            baryon_density: prim.nb.abs(),
            velocity: prim.velocity(),
            thermo,
        }
    }

    /// 是否有物质
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.energy_density <= 0.0
    }
}

/// 单元内三流体的状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrictionInput {
    /// 弹核流体
    pub projectile: FluidSample,
    /// 靶核流体
    pub target: FluidSample,
    /// 火球
    pub fireball: FluidSample,
}

/// 单元内三流体受到的摩擦力
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrictionForces {
    /// 弹核受力
    pub projectile: [f64; 4],
    /// 靶核受力
    pub target: [f64; 4],
    /// 火球受力
    pub fireball: [f64; 4],
}

impl FrictionForces {
    /// 零
    pub const ZERO: Self = Self {
        projectile: [0.0; 4],
        target: [0.0; 4],
        fireball: [0.0; 4],
    };

    /// 由两个重子流体的受力构造，火球得到反作用 `-(F_p + F_t)`
    pub fn balanced(projectile: [f64; 4], target: [f64; 4]) -> Self {
        let mut fireball = [0.0; 4];
        for mu in 0..4 {
            fireball[mu] = -(projectile[mu] + target[mu]);
        }
        Self {
            projectile,
            target,
            fireball,
        }
    }

    /// 三个流体受力之和（应为舍入量级）
    pub fn net(&self) -> [f64; 4] {
        let mut net = [0.0; 4];
        for mu in 0..4 {
            net[mu] = self.projectile[mu] + self.target[mu] + self.fireball[mu];
        }
        net
    }

    /// 所有分量是否有限
    pub fn is_valid(&self) -> bool {
        self.projectile
            .iter()
            .chain(&self.target)
            .chain(&self.fireball)
            .all(|x| x.is_finite())
    }
}

/// 摩擦模型
pub trait FrictionModel: Send + Sync {
    /// 名称
    fn name(&self) -> &'static str;

    /// 计算单元内的摩擦力
    fn compute(&self, input: &FrictionInput) -> FrictionForces;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_conserves() {
        let f = FrictionForces::balanced([1.0, -2.0, 0.5, 3.0], [-0.25, 1.0, 0.0, -1.0]);
        assert_eq!(f.net(), [0.0; 4]);
        assert!(f.is_valid());
    }

    #[test]
    fn test_invalid_forces() {
        let f = FrictionForces::balanced([f64::NAN, 0.0, 0.0, 0.0], [0.0; 4]);
        assert!(!f.is_valid());
    }
}
