// crates/gv_config/src/scene_config.rs

//! SceneConfig - 场景融合与显示配置
//!
//! 所有字段都有默认值，JSON 中缺省的字段取默认值。
//! 默认值对应 Lambert-93 下的一个野外测区。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use gv_geo::{BoundingBox, CrsDefinition};

/// 场景配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// 地理参考
    #[serde(default)]
    pub georeference: GeoreferenceConfig,

    /// 融合参数
    #[serde(default)]
    pub fusion: FusionConfig,

    /// 属性名
    #[serde(default)]
    pub attributes: AttributeNames,

    /// 色表
    #[serde(default)]
    pub colormaps: ColormapConfig,

    /// 显示参数
    #[serde(default)]
    pub display: DisplayConfig,
}

// ============================================================================
// 地理参考
// ============================================================================

/// 地理参考配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoreferenceConfig {
    /// 所有数据集共享的 CRS 标识
    #[serde(default = "default_crs")]
    pub crs: String,

    /// 测区范围 `[min_x, min_y, max_x, max_y]`
    #[serde(default = "default_bounds")]
    pub bounds: [f64; 4],
}

fn default_crs() -> String { "EPSG:2154".to_string() }
fn default_bounds() -> [f64; 4] { [966_860.0, 6_446_505.0, 967_275.0, 6_446_800.0] }

impl Default for GeoreferenceConfig {
    fn default() -> Self {
        Self {
            crs: default_crs(),
            bounds: default_bounds(),
        }
    }
}

// ============================================================================
// 融合参数
// ============================================================================

/// 融合参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    /// 高程面与影像的整体抬升 [m]
    #[serde(default)]
    pub z_shift: f64,

    /// 电阻率图相对高程面的额外抬升 [m]
    #[serde(default = "default_resistivity_offset")]
    pub resistivity_offset: f64,

    /// 披覆高程上限 [m]
    #[serde(default = "default_max_elevation")]
    pub max_elevation: f64,

    /// 栅格无数据值
    #[serde(default = "default_nodata")]
    pub nodata: f64,

    /// 高程变形系数
    #[serde(default = "default_warp_factor")]
    pub warp_factor: f64,

    /// 剖面 id 最大字符数（取文件名主干的前若干字符）
    #[serde(default = "default_profile_name_len")]
    pub profile_name_len: usize,

    /// 重采样目标点数达到该值时并行
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_resistivity_offset() -> f64 { 0.25 }
fn default_max_elevation() -> f64 { 3000.0 }
fn default_nodata() -> f64 { 9999.0 }
fn default_warp_factor() -> f64 { 1.0 }
fn default_profile_name_len() -> usize { 15 }
fn default_parallel_threshold() -> usize { 10_000 }

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            z_shift: 0.0,
            resistivity_offset: default_resistivity_offset(),
            max_elevation: default_max_elevation(),
            nodata: default_nodata(),
            warp_factor: default_warp_factor(),
            profile_name_len: default_profile_name_len(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

// ============================================================================
// 属性名与色表
// ============================================================================

/// 数据集中的属性名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeNames {
    /// 高程
    #[serde(default = "default_elevation_attr")]
    pub elevation: String,
    /// 电阻率
    #[serde(default = "default_resistivity_attr")]
    pub resistivity: String,
    /// 地震波速
    #[serde(default = "default_velocity_attr")]
    pub velocity: String,
    /// 射线覆盖度（为 0 的剖面单元被剔除）
    #[serde(default = "default_coverage_attr")]
    pub coverage: String,
}

fn default_elevation_attr() -> String { "Elevation [m]".to_string() }
fn default_resistivity_attr() -> String { "Resistivity".to_string() }
fn default_velocity_attr() -> String { "Velocity".to_string() }
fn default_coverage_attr() -> String { "S_Coverage".to_string() }

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            elevation: default_elevation_attr(),
            resistivity: default_resistivity_attr(),
            velocity: default_velocity_attr(),
            coverage: default_coverage_attr(),
        }
    }
}

/// 各类图层的色表名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColormapConfig {
    /// 地震剖面
    #[serde(default = "default_seismic_cmap")]
    pub seismic: String,
    /// 电阻率图
    #[serde(default = "default_resistivity_cmap")]
    pub resistivity: String,
    /// 高程
    #[serde(default = "default_elevation_cmap")]
    pub elevation: String,
}

fn default_seismic_cmap() -> String { "plasma".to_string() }
fn default_resistivity_cmap() -> String { "viridis".to_string() }
fn default_elevation_cmap() -> String { "gist_earth".to_string() }

impl Default for ColormapConfig {
    fn default() -> Self {
        Self {
            seismic: default_seismic_cmap(),
            resistivity: default_resistivity_cmap(),
            elevation: default_elevation_cmap(),
        }
    }
}

// ============================================================================
// 显示参数
// ============================================================================

/// 图层初始显示参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// 剖面初始不透明度
    #[serde(default = "default_opacity")]
    pub profile_opacity: f64,
    /// 高程影像初始不透明度
    #[serde(default = "default_opacity")]
    pub elevation_opacity: f64,
    /// 电阻率图初始不透明度
    #[serde(default = "default_opacity")]
    pub resistivity_opacity: f64,
    /// 色标范围滑块的分段数
    #[serde(default = "default_color_range_steps")]
    pub color_range_steps: u32,
}

fn default_opacity() -> f64 { 1.0 }
fn default_color_range_steps() -> u32 { 50 }

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            profile_opacity: default_opacity(),
            elevation_opacity: default_opacity(),
            resistivity_opacity: default_opacity(),
            color_range_steps: default_color_range_steps(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            georeference: GeoreferenceConfig::default(),
            fusion: FusionConfig::default(),
            attributes: AttributeNames::default(),
            colormaps: ColormapConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl SceneConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// 从 JSON 字符串加载配置
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 解析后的 CRS
    pub fn crs(&self) -> Result<CrsDefinition, ConfigError> {
        CrsDefinition::parse(&self.georeference.crs)
            .map_err(|e| ConfigError::invalid_value("georeference.crs", &self.georeference.crs, e.to_string()))
    }

    /// 测区范围
    pub fn bounds(&self) -> BoundingBox {
        let [min_x, min_y, max_x, max_y] = self.georeference.bounds;
        BoundingBox::new(min_x, min_y, max_x, max_y)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.crs()?;

        let [min_x, min_y, max_x, max_y] = self.georeference.bounds;
        if self.georeference.bounds.iter().any(|v| !v.is_finite()) || min_x >= max_x || min_y >= max_y {
            return Err(ConfigError::invalid_value(
                "georeference.bounds",
                format!("{:?}", self.georeference.bounds),
                "范围必须为有限值且 min < max",
            ));
        }

        let fusion = &self.fusion;
        for (key, value) in [
            ("fusion.z_shift", fusion.z_shift),
            ("fusion.resistivity_offset", fusion.resistivity_offset),
            ("fusion.max_elevation", fusion.max_elevation),
            ("fusion.nodata", fusion.nodata),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::invalid_value(key, value, "必须为有限值"));
            }
        }

        if !fusion.warp_factor.is_finite() || fusion.warp_factor <= 0.0 {
            return Err(ConfigError::invalid_value(
                "fusion.warp_factor",
                fusion.warp_factor,
                "变形系数必须为正",
            ));
        }

        if fusion.profile_name_len == 0 {
            return Err(ConfigError::invalid_value(
                "fusion.profile_name_len",
                fusion.profile_name_len,
                "剖面名长度必须为正",
            ));
        }

        let display = &self.display;
        for (key, value) in [
            ("display.profile_opacity", display.profile_opacity),
            ("display.elevation_opacity", display.elevation_opacity),
            ("display.resistivity_opacity", display.resistivity_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid_value(key, value, "不透明度必须在 [0, 1] 范围内"));
            }
        }

        if display.color_range_steps == 0 {
            return Err(ConfigError::invalid_value(
                "display.color_range_steps",
                display.color_range_steps,
                "分段数必须为正",
            ));
        }

        let attrs = &self.attributes;
        for (key, name) in [
            ("attributes.elevation", &attrs.elevation),
            ("attributes.resistivity", &attrs.resistivity),
            ("attributes.velocity", &attrs.velocity),
            ("attributes.coverage", &attrs.coverage),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::invalid_value(key, name, "属性名不能为空"));
            }
        }

        Ok(())
    }
}
