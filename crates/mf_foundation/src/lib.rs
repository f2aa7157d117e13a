// crates/mf_foundation/src/lib.rs

//! MultiFluid Foundation Layer
//!
//! 基础层，为三流体耦合求解器提供公共抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`grid`]: 三维规则网格的尺寸与扁平索引
//! - [`numerics`]: 补偿求和等数值工具
//!
//! # 示例
//!
//! ```
//! use mf_foundation::{GridDims, KahanSum, MfResult};
//!
//! fn total(values: &[f64]) -> f64 {
//!     KahanSum::sum_iter(values.iter().copied())
//! }
//!
//! let dims: MfResult<GridDims> = GridDims::new(4, 3, 2);
//! let dims = dims.unwrap();
//! assert_eq!(dims.len(), 24);
//! assert_eq!(dims.offset(1, 2, 1), 1 + 4 * (2 + 3 * 1));
//! assert!((total(&[0.1; 10]) - 1.0).abs() < 1e-15);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod grid;
pub mod numerics;

// 重导出常用类型
pub use error::{MfError, MfResult};
pub use grid::GridDims;
pub use numerics::KahanSum;

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{MfError, MfResult};
    pub use crate::grid::GridDims;
    pub use crate::numerics::KahanSum;
}
