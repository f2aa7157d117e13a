// crates/mf_physics/src/hydro.rs

//! 单流体演化接口
//!
//! 三流体核心只通过 [`Hydro`] 推进各流体；守恒律的数值格式不在本 crate 内。
//! 这里提供两个解析实现：
//!
//! - [`StaticHydro`]: 只推进 τ，单元保持不变
//! - [`BjorkenHydro`]: Milne 坐标下的 boost 不变共形膨胀，
//!   `τ e ∝ τ^{-1/3}`，`τ n` 守恒

use mf_foundation::MfError;

use crate::eos::Eos;
use crate::error::PhysicsResult;
use crate::fluid::Fluid;
use crate::types::CoordinateSystem;

/// 单流体求解器
pub trait Hydro: Send {
    /// 名称
    fn name(&self) -> &'static str;

    /// 流体
    fn fluid(&self) -> &Fluid;

    /// 流体（可变）
    fn fluid_mut(&mut self) -> &mut Fluid;

    /// 当前固有时
    fn tau(&self) -> f64;

    /// 时间步长
    fn dtau(&self) -> f64;

    /// 推进一个时间步
    fn perform_step(&mut self, eos: &dyn Eos) -> PhysicsResult<()>;
}

/// 静态演化：单元不变，只推进 τ
#[derive(Debug, Clone)]
pub struct StaticHydro {
    fluid: Fluid,
    tau: f64,
    dtau: f64,
}

impl StaticHydro {
    /// 创建
    pub fn new(fluid: Fluid, tau0: f64, dtau: f64) -> Self {
        Self {
            fluid,
            tau: tau0,
            dtau,
        }
    }
}

impl Hydro for StaticHydro {
    fn name(&self) -> &'static str {
        "Static"
    }

    fn fluid(&self) -> &Fluid {
        &self.fluid
    }

    fn fluid_mut(&mut self) -> &mut Fluid {
        &mut self.fluid
    }

    fn tau(&self) -> f64 {
        self.tau
    }

    fn dtau(&self) -> f64 {
        self.dtau
    }

    fn perform_step(&mut self, _eos: &dyn Eos) -> PhysicsResult<()> {
        self.tau += self.dtau;
        Ok(())
    }
}

/// Bjorken 共形膨胀
///
/// ```text
/// e(τ) = e(τ₀) (τ₀/τ)^{4/3},  n(τ) = n(τ₀) τ₀/τ
/// Q = τ T^{0ν}  =>  Q^{ν}(τ') = Q^{ν}(τ) (τ/τ')^{1/3},  τ J^0 不变
/// ```
#[derive(Debug, Clone)]
pub struct BjorkenHydro {
    fluid: Fluid,
    tau: f64,
    dtau: f64,
}

impl BjorkenHydro {
    /// 创建，流体必须使用 Milne 坐标
    pub fn new(fluid: Fluid, tau0: f64, dtau: f64) -> PhysicsResult<Self> {
        if fluid.coordinates() != CoordinateSystem::Milne {
            return Err(MfError::invalid_config(
                "coordinates",
                "cartesian",
                "Bjorken 膨胀需要 Milne 坐标",
            )
            .into());
        }
        if tau0 <= 0.0 {
            return Err(MfError::invalid_config("tau0", tau0.to_string(), "必须为正").into());
        }
        Ok(Self { fluid, tau: tau0, dtau })
    }
}

impl Hydro for BjorkenHydro {
    fn name(&self) -> &'static str {
        "Bjorken"
    }

    fn fluid(&self) -> &Fluid {
        &self.fluid
    }

    fn fluid_mut(&mut self) -> &mut Fluid {
        &mut self.fluid
    }

    fn tau(&self) -> f64 {
        self.tau
    }

    fn dtau(&self) -> f64 {
        self.dtau
    }

    fn perform_step(&mut self, _eos: &dyn Eos) -> PhysicsResult<()> {
        let next = self.tau + self.dtau;
        let factor = (self.tau / next).cbrt();
        for cell in self.fluid.cells_mut() {
            let mut q = *cell.q();
            for x in q.iter_mut().take(4) {
                *x *= factor;
            }
            cell.set_q(q);
        }
        self.tau = next;
        Ok(())
    }
}
