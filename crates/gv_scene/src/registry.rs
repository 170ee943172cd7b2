// crates/gv_scene/src/registry.rs

//! 图层注册表
//!
//! 按插入顺序保存图层，以 id 索引。设置方法是修改图层的唯一途径，
//! 返回值表示状态是否真的改变；失败的调用不改变图层。

use crate::error::{SceneError, SceneResult};
use crate::layer::{ColorRange, Layer, LayerGroup, LayerId};
use std::collections::HashMap;
use tracing::{debug, trace};

/// 图层注册表
#[derive(Debug, Default)]
pub struct LayerRegistry {
    layers: Vec<Layer>,
    index: HashMap<LayerId, usize>,
}

impl LayerRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册图层
    ///
    /// # Errors
    /// id 已存在时返回 [`SceneError::DuplicateId`]
    pub fn register(&mut self, layer: Layer) -> SceneResult<LayerId> {
        let id = layer.id().clone();
        if self.index.contains_key(&id) {
            return Err(SceneError::DuplicateId(id.to_string()));
        }
        debug!(layer = %id, kind = %layer.kind(), "注册图层");
        self.index.insert(id.clone(), self.layers.len());
        self.layers.push(layer);
        Ok(id)
    }

    /// 按 id 获取图层
    ///
    /// # Errors
    /// id 不存在时返回 [`SceneError::NotFound`]
    pub fn get(&self, id: &str) -> SceneResult<&Layer> {
        self.position(id).map(|i| &self.layers[i])
    }

    /// 全部图层（插入顺序）
    pub fn all(&self) -> &[Layer] {
        &self.layers
    }

    /// 全部 id（插入顺序）
    pub fn ids(&self) -> impl Iterator<Item = &LayerId> + '_ {
        self.layers.iter().map(Layer::id)
    }

    /// 是否包含该 id
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// 图层数量
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// 组内图层的 id（注册表顺序）
    pub fn group_members(&self, group: LayerGroup) -> Vec<LayerId> {
        self.layers
            .iter()
            .filter(|l| group.contains(l.kind()))
            .map(|l| l.id().clone())
            .collect()
    }

    /// 以该属性着色的图层 id（注册表顺序）
    pub fn layers_with_attribute(&self, attribute: &str) -> Vec<LayerId> {
        self.layers
            .iter()
            .filter(|l| l.attribute() == Some(attribute))
            .map(|l| l.id().clone())
            .collect()
    }

    /// 设置可见性
    ///
    /// # Errors
    /// id 不存在时返回 [`SceneError::NotFound`]
    pub fn set_visible(&mut self, id: &str, visible: bool) -> SceneResult<bool> {
        let layer = self.layer_mut(id)?;
        let changed = layer.set_visible(visible);
        trace!(layer = id, visible, changed, "设置可见性");
        Ok(changed)
    }

    /// 设置不透明度，夹到 [0,1]；NaN 视为无操作
    ///
    /// # Errors
    /// id 不存在时返回 [`SceneError::NotFound`]
    pub fn set_opacity(&mut self, id: &str, opacity: f64) -> SceneResult<bool> {
        let layer = self.layer_mut(id)?;
        let changed = layer.set_opacity(opacity);
        trace!(layer = id, opacity, changed, "设置不透明度");
        Ok(changed)
    }

    /// 设置色标范围
    ///
    /// # Errors
    /// - id 不存在：[`SceneError::NotFound`]
    /// - 任一端非有限或 `min > max`：[`SceneError::InvalidRange`]
    /// - 图层没有标量属性：[`SceneError::NotColorMapped`]
    pub fn set_color_range(&mut self, id: &str, range: (f64, f64)) -> SceneResult<bool> {
        let pos = self.position(id)?;
        let range = ColorRange::try_from(range)?;
        let changed = self.layers[pos].set_color_range(range)?;
        trace!(layer = id, range = %range, changed, "设置色标范围");
        Ok(changed)
    }

    fn position(&self, id: &str) -> SceneResult<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| SceneError::NotFound(id.to_string()))
    }

    fn layer_mut(&mut self, id: &str) -> SceneResult<&mut Layer> {
        let pos = self.position(id)?;
        Ok(&mut self.layers[pos])
    }
}
