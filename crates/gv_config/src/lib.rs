// crates/gv_config/src/lib.rs

//! GeoViz Config Layer
//!
//! 配置层，提供场景融合与显示参数。
//!
//! # 模块概览
//!
//! - [`scene_config`]: SceneConfig 场景配置（JSON，全部字段带默认值）
//! - [`error`]: 配置错误类型
//!
//! # 示例
//!
//! ```
//! use gv_config::SceneConfig;
//!
//! let config = SceneConfig::from_json(r#"{ "fusion": { "z_shift": 2.0 } }"#).unwrap();
//! assert_eq!(config.fusion.z_shift, 2.0);
//! assert_eq!(config.georeference.crs, "EPSG:2154");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod scene_config;

// 重导出核心类型
pub use error::ConfigError;
pub use scene_config::{
    AttributeNames, ColormapConfig, DisplayConfig, FusionConfig, GeoreferenceConfig, SceneConfig,
};
