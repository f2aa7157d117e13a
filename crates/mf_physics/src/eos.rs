// crates/mf_physics/src/eos.rs

//! 状态方程接口
//!
//! EoS 把局域静止系的能量密度与荷密度映射为温度、三个化学势与压强。
//! 核心代码只依赖 [`Eos`] trait；[`IdealGasEos`] 是一个无质量理想气体实现，
//! 用于测试与命令行演示。

use std::f64::consts::PI;
use thiserror::Error;

use crate::types::PhysicalConstants;

/// 允许的舍入负能量密度
const NEGATIVE_ROUNDOFF: f64 = 1e-12;

/// 热力学状态
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThermoState {
    /// 温度 [GeV]
    pub temperature: f64,
    /// 重子化学势 [GeV]
    pub mu_b: f64,
    /// 电荷化学势 [GeV]
    pub mu_q: f64,
    /// 奇异数化学势 [GeV]
    pub mu_s: f64,
    /// 压强 [GeV/fm³]
    pub pressure: f64,
}

/// 状态方程定义域错误
#[derive(Debug, Error, PartialEq)]
pub enum EosError {
    /// 能量密度为负
    #[error("能量密度为负: e={e}")]
    NegativeEnergy {
        /// 能量密度
        e: f64,
    },
    /// 输入不是有限数
    #[error("输入非有限: e={e}, nb={nb}, nq={nq}, ns={ns}")]
    NonFinite {
        /// 能量密度
        e: f64,
        /// 重子密度
        nb: f64,
        /// 电荷密度
        nq: f64,
        /// 奇异数密度
        ns: f64,
    },
    /// 超出表格范围
    #[error("超出状态方程表范围: {quantity}={value}")]
    OutOfRange {
        /// 越界的量
        quantity: &'static str,
        /// 数值
        value: f64,
    },
}

/// 状态方程
pub trait Eos: Send + Sync {
    /// 名称
    fn name(&self) -> &'static str;

    /// 由 (e, nb, nq, ns) 计算热力学状态
    fn eos(&self, e: f64, nb: f64, nq: f64, ns: f64) -> Result<ThermoState, EosError>;

    /// 压强
    fn pressure(&self, e: f64, nb: f64, nq: f64, ns: f64) -> Result<f64, EosError> {
        Ok(self.eos(e, nb, nq, ns)?.pressure)
    }
}

/// 无质量理想气体状态方程
///
/// ```text
/// p = e / 3
/// e = g π² T⁴ / (30 (ħc)³)
/// n = g_c T³ / (π² (ħc)³) · 2 sinh(μ / T)
/// ```
#[derive(Debug, Clone)]
pub struct IdealGasEos {
    /// 有效自由度
    pub degeneracy: f64,
    /// 荷载体自由度
    pub charge_degeneracy: f64,
}

impl Default for IdealGasEos {
    fn default() -> Self {
        Self {
            degeneracy: 24.0,
            charge_degeneracy: 4.0,
        }
    }
}

impl IdealGasEos {
    /// 创建理想气体
    pub fn new(degeneracy: f64, charge_degeneracy: f64) -> Self {
        Self {
            degeneracy,
            charge_degeneracy,
        }
    }

    /// 温度 [GeV]
    pub fn temperature(&self, e: f64) -> f64 {
        let hc3 = PhysicalConstants::HBARC.powi(3);
        (30.0 * e * hc3 / (self.degeneracy * PI * PI)).max(0.0).powf(0.25)
    }

    /// 由净荷密度反解化学势
    fn chemical_potential(&self, n: f64, t: f64) -> f64 {
        if t <= 0.0 || n == 0.0 {
            return 0.0;
        }
        let hc3 = PhysicalConstants::HBARC.powi(3);
        let scale = self.charge_degeneracy * t.powi(3) / (PI * PI * hc3);
        t * (n / (2.0 * scale)).asinh()
    }
}

impl Eos for IdealGasEos {
    fn name(&self) -> &'static str {
        "IdealGas"
    }

    fn eos(&self, e: f64, nb: f64, nq: f64, ns: f64) -> Result<ThermoState, EosError> {
        if !(e.is_finite() && nb.is_finite() && nq.is_finite() && ns.is_finite()) {
            return Err(EosError::NonFinite { e, nb, nq, ns });
        }
        if e < -NEGATIVE_ROUNDOFF {
            return Err(EosError::NegativeEnergy { e });
        }
        let e = e.max(0.0);
        let t = self.temperature(e);
        Ok(ThermoState {
            temperature: t,
            mu_b: self.chemical_potential(nb, t),
            mu_q: self.chemical_potential(nq, t),
            mu_s: self.chemical_potential(ns, t),
            pressure: e / 3.0,
        })
    }

    fn pressure(&self, e: f64, _nb: f64, _nq: f64, _ns: f64) -> Result<f64, EosError> {
        if !e.is_finite() {
            return Err(EosError::NonFinite { e, nb: 0.0, nq: 0.0, ns: 0.0 });
        }
        if e < -NEGATIVE_ROUNDOFF {
            return Err(EosError::NegativeEnergy { e });
        }
        Ok(e.max(0.0) / 3.0)
    }
}
