// crates/gv_scene/src/lib.rs

//! GeoViz 场景层
//!
//! 提供图层模型、注册表、状态同步和融合流程。
//!
//! # 模块结构
//!
//! - [`layer`]: 图层、图层组、色标范围
//! - [`registry`]: 图层注册表
//! - [`events`]: 重绘信号与分发
//! - [`manager`]: 场景状态管理器
//! - [`fusion`]: 融合流程
//!
//! 状态只沿一个方向传播：意图 → 管理器 → 注册表 → 重绘信号。
//!
//! # 示例
//!
//! ```rust,ignore
//! use gv_scene::{LayerGroup, LayerKind, SceneFusion, SceneStateManager};
//!
//! let registry = SceneFusion::new(config)?.fuse(&inputs)?;
//! let mut manager = SceneStateManager::new(registry);
//! manager.dispatcher().add_listener(Arc::new(LoggingListener::new("scene")));
//!
//! manager.toggle_group(LayerGroup::Kind(LayerKind::Profile), false)?;
//! manager.set_color_range("dem", (100.0, 400.0))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod events;
pub mod fusion;
pub mod layer;
pub mod manager;
pub mod registry;

// 重导出核心类型
pub use error::{SceneError, SceneResult};
pub use events::{
    ActorMutation, FnListener, LoggingListener, RedrawDispatcher, RedrawListener, RedrawSignal,
};
pub use fusion::{profile_id_from_path, ProfileInput, SceneFusion, SceneInputs};
pub use layer::{ColorRange, Layer, LayerGeometry, LayerGroup, LayerId, LayerKind};
pub use manager::{SceneIntent, SceneStateManager};
pub use registry::LayerRegistry;
