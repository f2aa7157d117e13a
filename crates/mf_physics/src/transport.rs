// crates/mf_physics/src/transport.rs

//! 输运系数接口
//!
//! 冻结记录只关心流体是否带粘滞：非粘滞时剪切与体粘滞分量一律写 0。

/// 输运系数
pub trait TransportCoeff: Send + Sync {
    /// 剪切粘滞与熵密度之比 η/s
    fn eta_s(&self, temperature: f64, mu_b: f64) -> f64;

    /// 体粘滞与熵密度之比 ζ/s
    fn zeta_s(&self, temperature: f64, mu_b: f64) -> f64;

    /// 是否带粘滞
    fn is_viscous(&self) -> bool;
}

/// 常数输运系数
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConstantTransport {
    /// η/s
    pub eta_s: f64,
    /// ζ/s
    pub zeta_s: f64,
}

impl ConstantTransport {
    /// 创建常数输运系数
    pub fn new(eta_s: f64, zeta_s: f64) -> Self {
        Self { eta_s, zeta_s }
    }

    /// 理想流体
    pub fn inviscid() -> Self {
        Self::default()
    }
}

impl TransportCoeff for ConstantTransport {
    fn eta_s(&self, _temperature: f64, _mu_b: f64) -> f64 {
        self.eta_s
    }

    fn zeta_s(&self, _temperature: f64, _mu_b: f64) -> f64 {
        self.zeta_s
    }

    fn is_viscous(&self) -> bool {
        self.eta_s > 0.0 || self.zeta_s > 0.0
    }
}
