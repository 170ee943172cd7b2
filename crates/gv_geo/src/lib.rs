// crates/gv_geo/src/lib.rs
//! GeoViz 地理空间基础模块
//!
//! 提供坐标参考系统 (CRS) 标识、几何类型、栅格地理变换与空间索引。
//!
//! # 模块
//!
//! - `crs`: CRS 定义解析与一致性比较
//! - `geometry`: 几何类型 (Point2D, Point3D)
//! - `transform`: 仿射变换与栅格地理变换
//! - `spatial_index`: 基于 R-tree 的空间索引
//!
//! # 示例
//!
//! ```
//! use gv_geo::prelude::*;
//!
//! let dem_crs = CrsDefinition::parse("EPSG:2154").unwrap();
//! assert!(dem_crs.same_reference(&CrsDefinition::lambert93()));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod crs;
pub mod error;
pub mod geometry;
pub mod spatial_index;
pub mod transform;

/// 预导入模块
pub mod prelude {
    pub use crate::crs::CrsDefinition;
    pub use crate::error::{GeoError, GeoResult};
    pub use crate::geometry::{Point2D, Point3D};
    pub use crate::spatial_index::{BoundingBox, SpatialIndex};
    pub use crate::transform::{AffineTransform, GeoTransform};
}

// 重导出常用类型
pub use crs::CrsDefinition;
pub use error::{GeoError, GeoResult};
pub use geometry::{Point2D, Point3D};
pub use spatial_index::{BoundingBox, SpatialIndex};
pub use transform::{AffineTransform, GeoTransform};
