// crates/gv_scene/src/manager.rs

//! 场景状态管理器
//!
//! 接收控制意图，应用到注册表，并为每个生效的意图发出恰好一个重绘信号。
//! 不改变任何状态的意图不发信号；失败的意图不改变任何状态。
//!
//! # 示例
//!
//! ```
//! use gv_scene::{LayerRegistry, SceneStateManager};
//!
//! let mut manager = SceneStateManager::new(LayerRegistry::new());
//! assert!(manager.toggle_layer("dem", false).is_err());
//! assert_eq!(manager.redraw_count(), 0);
//! ```

use crate::error::{SceneError, SceneResult};
use crate::events::{ActorMutation, RedrawDispatcher, RedrawSignal};
use crate::layer::{ColorRange, LayerGroup, LayerId};
use crate::registry::LayerRegistry;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// 控制意图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum SceneIntent {
    /// 切换单个图层可见性
    ToggleLayer {
        /// 图层 id
        id: String,
        /// 目标可见性
        visible: bool,
    },
    /// 切换整组可见性
    ToggleGroup {
        /// 图层组
        group: LayerGroup,
        /// 目标可见性
        visible: bool,
    },
    /// 设置不透明度
    SetOpacity {
        /// 图层 id
        id: String,
        /// 不透明度
        opacity: f64,
    },
    /// 设置单个图层的色标范围
    SetColorRange {
        /// 图层 id
        id: String,
        /// (min, max)
        range: (f64, f64),
    },
    /// 为映射同一属性的全部图层设置色标范围
    SetAttributeColorRange {
        /// 属性名
        attribute: String,
        /// (min, max)
        range: (f64, f64),
    },
}

/// 场景状态管理器
#[derive(Debug)]
pub struct SceneStateManager {
    registry: LayerRegistry,
    dispatcher: RedrawDispatcher,
    sequence: u64,
}

impl SceneStateManager {
    /// 接管注册表创建管理器
    pub fn new(registry: LayerRegistry) -> Self {
        Self {
            registry,
            dispatcher: RedrawDispatcher::new(),
            sequence: 0,
        }
    }

    /// 只读注册表
    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    /// 重绘分发器（用于注册监听器）
    pub fn dispatcher(&self) -> &RedrawDispatcher {
        &self.dispatcher
    }

    /// 已发出的重绘信号数
    pub fn redraw_count(&self) -> u64 {
        self.sequence
    }

    /// 交还注册表
    pub fn into_registry(self) -> LayerRegistry {
        self.registry
    }

    /// 切换单个图层可见性
    ///
    /// # Errors
    /// 图层不存在时返回 [`SceneError::NotFound`]
    pub fn toggle_layer(&mut self, id: &str, visible: bool) -> SceneResult<bool> {
        let changed = self.registry.set_visible(id, visible)?;
        let mutations = changed
            .then(|| ActorMutation::Visibility {
                layer: LayerId::from(id),
                visible,
            })
            .into_iter()
            .collect();
        Ok(self.commit(mutations))
    }

    /// 按注册表顺序切换整组可见性，最多一个重绘信号
    ///
    /// 组内没有图层时为无操作。
    pub fn toggle_group(&mut self, group: LayerGroup, visible: bool) -> SceneResult<bool> {
        let members = self.registry.group_members(group);
        let mut mutations = Vec::with_capacity(members.len());
        for id in members {
            if self.registry.set_visible(id.as_str(), visible)? {
                mutations.push(ActorMutation::Visibility { layer: id, visible });
            }
        }
        debug!(?group, visible, changed = mutations.len(), "切换图层组");
        Ok(self.commit(mutations))
    }

    /// 设置不透明度（夹到 [0,1]，NaN 为无操作）
    ///
    /// # Errors
    /// 图层不存在时返回 [`SceneError::NotFound`]
    pub fn set_opacity(&mut self, id: &str, opacity: f64) -> SceneResult<bool> {
        let changed = self.registry.set_opacity(id, opacity)?;
        let mutations = if changed {
            let opacity = self.registry.get(id)?.opacity();
            vec![ActorMutation::Opacity {
                layer: LayerId::from(id),
                opacity,
            }]
        } else {
            Vec::new()
        };
        Ok(self.commit(mutations))
    }

    /// 设置单个图层的色标范围
    ///
    /// 范围在查找图层之前校验。
    ///
    /// # Errors
    /// 见 [`LayerRegistry::set_color_range`]
    pub fn set_color_range(&mut self, id: &str, range: (f64, f64)) -> SceneResult<bool> {
        let validated = ColorRange::try_from(range)?;
        let changed = self.registry.set_color_range(id, validated.as_tuple())?;
        let mutations = if changed {
            vec![ActorMutation::ColorRange {
                layer: LayerId::from(id),
                range: validated,
            }]
        } else {
            Vec::new()
        };
        Ok(self.commit(mutations))
    }

    /// 为映射该属性的全部图层设置同一色标范围
    ///
    /// 范围在任何修改之前校验。
    ///
    /// # Errors
    /// - 范围无效：[`SceneError::InvalidRange`]
    /// - 没有图层映射该属性：[`SceneError::UnknownAttribute`]
    pub fn set_attribute_color_range(&mut self, attribute: &str, range: (f64, f64)) -> SceneResult<bool> {
        let validated = ColorRange::try_from(range)?;
        let members = self.registry.layers_with_attribute(attribute);
        if members.is_empty() {
            return Err(SceneError::UnknownAttribute(attribute.to_string()));
        }

        let mut mutations = Vec::with_capacity(members.len());
        for id in members {
            if self.registry.set_color_range(id.as_str(), validated.as_tuple())? {
                mutations.push(ActorMutation::ColorRange {
                    layer: id,
                    range: validated,
                });
            }
        }
        debug!(attribute, range = %validated, changed = mutations.len(), "设置属性色标范围");
        Ok(self.commit(mutations))
    }

    /// 分派意图
    ///
    /// # Errors
    /// 与对应的方法相同
    pub fn apply(&mut self, intent: SceneIntent) -> SceneResult<bool> {
        match intent {
            SceneIntent::ToggleLayer { id, visible } => self.toggle_layer(&id, visible),
            SceneIntent::ToggleGroup { group, visible } => self.toggle_group(group, visible),
            SceneIntent::SetOpacity { id, opacity } => self.set_opacity(&id, opacity),
            SceneIntent::SetColorRange { id, range } => self.set_color_range(&id, range),
            SceneIntent::SetAttributeColorRange { attribute, range } => {
                self.set_attribute_color_range(&attribute, range)
            }
        }
    }

    /// 有变更时发出一个重绘信号
    fn commit(&mut self, mutations: Vec<ActorMutation>) -> bool {
        if mutations.is_empty() {
            trace!(sequence = self.sequence, "无状态变化，不重绘");
            return false;
        }
        self.sequence += 1;
        let signal = RedrawSignal {
            sequence: self.sequence,
            mutations,
        };
        self.dispatcher.emit(&signal, self.registry.all());
        true
    }
}
