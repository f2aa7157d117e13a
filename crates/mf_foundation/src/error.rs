// crates/mf_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `MfError` 枚举和 `MfResult` 类型别名。
//! 物理计算相关的错误在 `mf_physics` 中扩展。
//!
//! # 示例
//!
//! ```
//! use mf_foundation::error::{MfError, MfResult};
//!
//! fn check_step(dtau: f64) -> MfResult<()> {
//!     if dtau <= 0.0 {
//!         return Err(MfError::invalid_config("dtau", dtau.to_string(), "必须为正"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_step(-1.0).is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type MfResult<T> = Result<T, MfError>;

/// MultiFluid 基础错误类型
#[derive(Error, Debug)]
pub enum MfError {
    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },
}

impl MfError {
    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }
}
