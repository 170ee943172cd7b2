// crates/gv_terrain/src/interpolation/mod.rs

//! 插值模块
//!
//! 把散点标量场重采样到任意目标点集。目前只提供最近邻方法。
//!
//! - [`nearest`]: 基于 R-tree 的最近邻重采样，平局取最小源索引

pub mod nearest;

pub use nearest::{resample, InterpolatorConfig, NearestInterpolator};
