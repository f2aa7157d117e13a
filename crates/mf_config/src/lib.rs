// crates/mf_config/src/lib.rs

//! MultiFluid Config Layer (Layer 2)
//!
//! 配置层，提供三流体运行配置的反序列化与验证。
//! 本层不依赖物理层，所有数值使用 f64 存储，枚举选项在物理层中映射为策略对象。
//!
//! # 模块概览
//!
//! - [`run_config`]: `MultiHydroConfig` 及各子配置
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 4: mf_cli        ─> 读取 JSON 并构建 MultiHydro
//! Layer 3: mf_physics    ─> MultiHydroSettings::from_config
//! Layer 2: mf_config     ─> MultiHydroConfig (本层)
//! Layer 1: mf_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod run_config;

/// 层级标识
pub const LAYER: u8 = 2;

// 重导出核心类型
pub use error::ConfigError;
pub use run_config::{
    CoordinateKind, CriterionKind, EigenSelectionKind, FreezeoutConfig, FrictionConfig,
    GridConfig, MultiHydroConfig, OutputConfig, RunConfig,
};
