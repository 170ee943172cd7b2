// crates/gv_terrain/src/lib.rs

//! GeoViz 空间融合
//!
//! 提供栅格场、表面网格、最近邻重采样与影像披覆。
//!
//! # 模块
//!
//! - `raster`: 栅格场（带地理变换、CRS、无数据值的单属性网格）
//! - `imagery`: 地理参考 RGB 影像
//! - `mesh`: 表面网格与其变换（变形、平移、删除单元）
//! - `interpolation`: 散点到目标点集的最近邻重采样
//! - `drape`: 影像到高程表面的披覆投影

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod drape;
pub mod error;
pub mod imagery;
pub mod interpolation;
pub mod mesh;
pub mod raster;

// 重导出常用类型
pub use drape::{drape, DrapeProjector, DrapedSurface};
pub use error::{TerrainError, TerrainResult};
pub use imagery::ImageRaster;
pub use interpolation::{resample, InterpolatorConfig, NearestInterpolator};
pub use mesh::SurfaceMesh;
pub use raster::{RasterField, RasterGrid};
