// crates/gv_foundation/src/lib.rs

//! GeoViz Foundation Layer
//!
//! 基础层，提供整个项目共享的错误类型和数值工具。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`range`]: 有限值范围计算

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod range;

// 重导出常用类型
pub use error::{GvError, GvResult};
pub use range::{finite_range, merge_ranges};
