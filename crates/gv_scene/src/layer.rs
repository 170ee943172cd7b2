// crates/gv_scene/src/layer.rs

//! 图层定义
//!
//! 图层在融合时一次性创建、永不销毁；几何体独占且创建后不可变。
//! 之后只有可见性、不透明度与色标范围会改变，且只能经由
//! [`LayerRegistry`](crate::registry::LayerRegistry) 的设置方法修改。

use crate::error::{SceneError, SceneResult};
use gv_terrain::{DrapedSurface, SurfaceMesh, TerrainError};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

// ============================================================================
// LayerId
// ============================================================================

/// 稳定的图层标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    /// 创建图层标识
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 字符串形式
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for LayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for LayerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for LayerId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LayerId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ============================================================================
// LayerKind / LayerGroup
// ============================================================================

/// 图层类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// 地震速度剖面
    Profile,
    /// 高程面 + 航拍影像
    ElevationImage,
    /// 电阻率图
    ResistivityMap,
}

impl LayerKind {
    /// 类别名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::ElevationImage => "elevation_image",
            Self::ResistivityMap => "resistivity_map",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 可整体切换可见性的图层组
///
/// 组只是成员规则，不是持久实体。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerGroup {
    /// 某一类别的全部图层
    Kind(LayerKind),
    /// 影像与地图：高程影像和电阻率图
    ImagesAndMaps,
}

impl LayerGroup {
    /// 是否包含该类别
    pub fn contains(&self, kind: LayerKind) -> bool {
        match self {
            Self::Kind(k) => *k == kind,
            Self::ImagesAndMaps => {
                matches!(kind, LayerKind::ElevationImage | LayerKind::ResistivityMap)
            }
        }
    }
}

// ============================================================================
// ColorRange
// ============================================================================

/// 色标范围，保证 `min <= max` 且两端有限
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRange {
    min: f64,
    max: f64,
}

impl ColorRange {
    /// 创建色标范围
    ///
    /// # Errors
    /// 任一端非有限或 `min > max` 时返回 [`SceneError::InvalidRange`]
    pub fn new(min: f64, max: f64) -> SceneResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(SceneError::InvalidRange {
                min,
                max,
                reason: "边界必须为有限值",
            });
        }
        if min > max {
            return Err(SceneError::InvalidRange {
                min,
                max,
                reason: "下界大于上界",
            });
        }
        Ok(Self { min, max })
    }

    /// 下界
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 上界
    pub fn max(&self) -> f64 {
        self.max
    }

    /// 范围宽度
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// 滑块步长：宽度均分为 `steps` 段
    ///
    /// ```
    /// use gv_scene::layer::ColorRange;
    ///
    /// let range = ColorRange::new(300.0, 2800.0).unwrap();
    /// assert_eq!(range.step(50), 50.0);
    /// ```
    pub fn step(&self, steps: u32) -> f64 {
        if steps == 0 {
            self.width()
        } else {
            self.width() / f64::from(steps)
        }
    }

    /// 元组形式
    pub fn as_tuple(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

impl TryFrom<(f64, f64)> for ColorRange {
    type Error = SceneError;

    fn try_from((min, max): (f64, f64)) -> SceneResult<Self> {
        Self::new(min, max)
    }
}

impl fmt::Display for ColorRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}, {:.3}]", self.min, self.max)
    }
}

// ============================================================================
// Layer
// ============================================================================

/// 图层几何体
#[derive(Debug, Clone)]
pub enum LayerGeometry {
    /// 普通表面网格（剖面、电阻率图）
    Mesh(SurfaceMesh),
    /// 披覆影像的高程面
    Draped(DrapedSurface),
}

impl LayerGeometry {
    /// 底层网格
    pub fn mesh(&self) -> &SurfaceMesh {
        match self {
            Self::Mesh(mesh) => mesh,
            Self::Draped(surface) => &surface.mesh,
        }
    }

    /// 是否带纹理
    pub fn is_textured(&self) -> bool {
        matches!(self, Self::Draped(_))
    }
}

/// 图层
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    kind: LayerKind,
    label: String,
    geometry: LayerGeometry,
    visible: bool,
    opacity: f64,
    color_range: Option<ColorRange>,
    data_range: Option<ColorRange>,
    attribute: Option<String>,
    colormap: Option<String>,
}

impl Layer {
    /// 创建图层：可见、完全不透明、无标量属性
    pub fn new(
        id: impl Into<LayerId>,
        kind: LayerKind,
        label: impl Into<String>,
        geometry: LayerGeometry,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            geometry,
            visible: true,
            opacity: 1.0,
            color_range: None,
            data_range: None,
            attribute: None,
            colormap: None,
        }
    }

    /// 以几何体上的标量属性着色，色标范围初始化为该属性的有限值范围
    ///
    /// # Errors
    /// 几何体没有该属性时返回 [`SceneError::Terrain`]（`MissingAttribute`）
    pub fn with_attribute(
        mut self,
        attribute: impl Into<String>,
        colormap: impl Into<String>,
    ) -> SceneResult<Self> {
        let attribute = attribute.into();
        let mesh = self.geometry.mesh();
        if mesh.attribute(&attribute).is_none() {
            return Err(TerrainError::missing_attribute(attribute).into());
        }
        self.data_range = mesh
            .data_range(&attribute)
            .and_then(|(lo, hi)| ColorRange::new(lo, hi).ok());
        self.color_range = self.data_range;
        self.attribute = Some(attribute);
        self.colormap = Some(colormap.into());
        Ok(self)
    }

    /// 覆盖初始色标范围
    #[must_use]
    pub fn with_color_range(mut self, range: ColorRange) -> Self {
        if self.attribute.is_some() {
            self.color_range = Some(range);
        }
        self
    }

    /// 初始不透明度（夹到 [0,1]，NaN 忽略）
    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        if !opacity.is_nan() {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
        self
    }

    /// 初始可见性
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// 标识
    pub fn id(&self) -> &LayerId {
        &self.id
    }

    /// 类别
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    /// 显示名
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 几何体
    pub fn geometry(&self) -> &LayerGeometry {
        &self.geometry
    }

    /// 是否可见
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// 不透明度
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// 当前色标范围
    pub fn color_range(&self) -> Option<ColorRange> {
        self.color_range
    }

    /// 属性的完整有限值范围
    pub fn data_range(&self) -> Option<ColorRange> {
        self.data_range
    }

    /// 着色属性名
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// 色表名
    pub fn colormap(&self) -> Option<&str> {
        self.colormap.as_deref()
    }

    /// 是否按标量属性着色
    pub fn is_color_mapped(&self) -> bool {
        self.attribute.is_some()
    }

    // 以下修改只对注册表开放

    pub(crate) fn set_visible(&mut self, visible: bool) -> bool {
        let changed = self.visible != visible;
        self.visible = visible;
        changed
    }

    pub(crate) fn set_opacity(&mut self, opacity: f64) -> bool {
        if opacity.is_nan() {
            return false;
        }
        let opacity = opacity.clamp(0.0, 1.0);
        let changed = self.opacity != opacity;
        self.opacity = opacity;
        changed
    }

    pub(crate) fn set_color_range(&mut self, range: ColorRange) -> SceneResult<bool> {
        if !self.is_color_mapped() {
            return Err(SceneError::NotColorMapped(self.id.to_string()));
        }
        let changed = self.color_range != Some(range);
        self.color_range = Some(range);
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gv_geo::{CrsDefinition, Point3D};

    fn profile_mesh() -> SurfaceMesh {
        let vertices = vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(0.0, 0.0, -1.0),
        ];
        SurfaceMesh::new(vertices, &[vec![0, 1, 2]], CrsDefinition::lambert93())
            .unwrap()
            .with_point_data("Velocity", vec![400.0, f64::NAN, 1800.0])
            .unwrap()
    }

    #[test]
    fn test_color_range_validation() {
        assert!(ColorRange::new(1.0, 1.0).is_ok());
        assert!(matches!(
            ColorRange::new(10.0, 5.0),
            Err(SceneError::InvalidRange { .. })
        ));
        assert!(matches!(
            ColorRange::try_from((0.0, f64::INFINITY)),
            Err(SceneError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_color_range_step() {
        let range = ColorRange::new(-1.0, 1.0).unwrap();
        assert_eq!(range.step(4), 0.5);
        assert_eq!(range.step(0), 2.0);
    }

    #[test]
    fn test_with_attribute_sets_ranges() {
        let layer = Layer::new("profA", LayerKind::Profile, "profA", LayerGeometry::Mesh(profile_mesh()))
            .with_attribute("Velocity", "plasma")
            .unwrap();
        let expected = ColorRange::new(400.0, 1800.0).unwrap();
        assert_eq!(layer.data_range(), Some(expected));
        assert_eq!(layer.color_range(), Some(expected));
        assert_eq!(layer.colormap(), Some("plasma"));
        assert!(layer.visible());
        assert_eq!(layer.opacity(), 1.0);
    }

    #[test]
    fn test_with_missing_attribute() {
        let result = Layer::new("profA", LayerKind::Profile, "profA", LayerGeometry::Mesh(profile_mesh()))
            .with_attribute("Resistivity", "viridis");
        assert!(matches!(
            result,
            Err(SceneError::Terrain(TerrainError::MissingAttribute { .. }))
        ));
    }

    #[test]
    fn test_setters_report_change() {
        let mut layer = Layer::new("profA", LayerKind::Profile, "profA", LayerGeometry::Mesh(profile_mesh()));
        assert!(!layer.set_visible(true));
        assert!(layer.set_visible(false));
        assert!(!layer.set_opacity(2.0));
        assert_eq!(layer.opacity(), 1.0);
        assert!(layer.set_opacity(0.4));
        assert_eq!(layer.opacity(), 0.4);
        assert!(layer.set_opacity(-3.0));
        assert_eq!(layer.opacity(), 0.0);
        assert!(!layer.set_opacity(f64::NAN));
        assert!(matches!(
            layer.set_color_range(ColorRange::new(0.0, 1.0).unwrap()),
            Err(SceneError::NotColorMapped(_))
        ));
    }

    #[test]
    fn test_group_membership() {
        assert!(LayerGroup::ImagesAndMaps.contains(LayerKind::ElevationImage));
        assert!(LayerGroup::ImagesAndMaps.contains(LayerKind::ResistivityMap));
        assert!(!LayerGroup::ImagesAndMaps.contains(LayerKind::Profile));
        assert!(LayerGroup::Kind(LayerKind::Profile).contains(LayerKind::Profile));
    }

    #[test]
    fn test_layer_id_comparisons() {
        let id = LayerId::from("dem");
        assert_eq!(id, "dem");
        assert_eq!(id.to_string(), "dem");
    }
}
