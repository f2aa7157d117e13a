// crates/mf_physics/src/error.rs

//! 物理层错误类型
//!
//! 致命错误（配置、网格不一致、EoS 定义域、输出）以 `PhysicsError` 向上传播；
//! 单元级的退化（无类时本征向量）使用 `tensor::LandauError` 在本地恢复。

use mf_config::ConfigError;
use mf_foundation::MfError;
use thiserror::Error;

use crate::eos::EosError;

/// 物理层结果类型
pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// 物理层错误
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 状态方程定义域错误
    #[error("状态方程错误: {0}")]
    Eos(#[from] EosError),

    /// 流体网格不一致
    #[error("网格不一致: {what}: 期望 {expected}, 实际 {actual}")]
    GridMismatch {
        /// 不一致的对象
        what: String,
        /// 期望描述
        expected: String,
        /// 实际描述
        actual: String,
    },

    /// 非物理状态（能量密度为负、超光速等）
    #[error("非物理状态 (单元 {cell}): {reason}")]
    NonPhysicalState {
        /// 扁平单元索引
        cell: usize,
        /// 原因
        reason: String,
    },

    /// 输出错误
    #[error("输出错误: {context}")]
    Output {
        /// 出错的输出对象
        context: String,
        #[source]
        /// 底层 IO 错误
        source: std::io::Error,
    },

    /// 基础层错误
    #[error("基础层错误: {0}")]
    Foundation(#[from] MfError),
}

impl PhysicsError {
    /// 网格不一致
    pub fn grid_mismatch(
        what: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::GridMismatch {
            what: what.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// 输出错误
    pub fn output(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Output {
            context: context.into(),
            source,
        }
    }
}
