// crates/gv_scene/src/fusion.rs

//! 场景融合流程
//!
//! 把剖面网格、高程栅格、电阻率栅格和航拍影像融合为一组图层：
//!
//! 1. 校验全部输入的 CRS 与配置一致；
//! 2. 高程栅格 → 结构化网格 → 按高程变形；
//! 3. 航拍影像披覆到高程面（高程上限夹取），整体抬升 `z_shift`；
//! 4. 电阻率有效采样最近邻重采样到高程面顶点，
//!    抬升 `z_shift + resistivity_offset`；
//! 5. 剖面剔除覆盖度为 0 的单元，全部剖面共享同一速度色标范围；
//! 6. 按 剖面 → "dem" → "cmd" 的顺序注册图层。

use crate::error::SceneResult;
use crate::layer::{ColorRange, Layer, LayerGeometry, LayerKind};
use crate::registry::LayerRegistry;
use gv_config::SceneConfig;
use gv_foundation::merge_ranges;
use gv_geo::CrsDefinition;
use gv_terrain::{
    DrapeProjector, ImageRaster, InterpolatorConfig, NearestInterpolator, RasterField,
    SurfaceMesh, TerrainError,
};
use std::path::Path;
use tracing::{debug, info};

/// 高程影像图层 id
pub const ELEVATION_LAYER_ID: &str = "dem";
/// 电阻率图层 id
pub const RESISTIVITY_LAYER_ID: &str = "cmd";

/// 由文件路径得到剖面 id：文件名主干的前 `max_len` 个字符
///
/// ```
/// use gv_scene::fusion::profile_id_from_path;
///
/// assert_eq!(profile_id_from_path("data/Profile_North_01_final.vtk", 15), "Profile_North_0");
/// assert_eq!(profile_id_from_path("P2.vtu", 15), "P2");
/// ```
pub fn profile_id_from_path(path: impl AsRef<Path>, max_len: usize) -> String {
    path.as_ref()
        .file_stem()
        .map(|stem| stem.to_string_lossy().chars().take(max_len).collect())
        .unwrap_or_default()
}

/// 单条地震剖面输入
#[derive(Debug, Clone)]
pub struct ProfileInput {
    /// 图层 id
    pub id: String,
    /// 剖面网格
    pub mesh: SurfaceMesh,
}

impl ProfileInput {
    /// 指定 id
    pub fn new(id: impl Into<String>, mesh: SurfaceMesh) -> Self {
        Self { id: id.into(), mesh }
    }

    /// 由来源文件路径推出 id
    pub fn from_path(path: impl AsRef<Path>, mesh: SurfaceMesh, max_len: usize) -> Self {
        Self::new(profile_id_from_path(path, max_len), mesh)
    }
}

/// 融合输入（由外部读取模块提供，均已在内存中）
#[derive(Debug, Clone)]
pub struct SceneInputs {
    /// 地震剖面（可为空）
    pub profiles: Vec<ProfileInput>,
    /// 高程栅格
    pub elevation: RasterField,
    /// 电阻率栅格
    pub resistivity: RasterField,
    /// 航拍影像
    pub aerial: ImageRaster,
}

/// 场景融合器
#[derive(Debug, Clone)]
pub struct SceneFusion {
    config: SceneConfig,
    crs: CrsDefinition,
}

impl SceneFusion {
    /// 创建融合器
    ///
    /// # Errors
    /// 配置无效时返回 [`SceneError::Config`](crate::SceneError::Config)
    pub fn new(config: SceneConfig) -> SceneResult<Self> {
        config.validate()?;
        let crs = config.crs()?;
        Ok(Self { config, crs })
    }

    /// 配置
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// 执行融合，返回按顺序注册好的图层
    ///
    /// # Errors
    /// - 任一输入 CRS 与配置不一致：`GeoreferenceMismatch`
    /// - 电阻率没有有效采样：`InvalidInput`
    /// - 输入缺少配置中的属性：`MissingAttribute`
    /// - 剖面 id 重复：`DuplicateId`
    pub fn fuse(&self, inputs: &SceneInputs) -> SceneResult<LayerRegistry> {
        self.check_crs(inputs)?;

        let fusion = &self.config.fusion;
        let attrs = &self.config.attributes;
        let display = &self.config.display;
        let cmaps = &self.config.colormaps;

        // 高程面
        let elevation = SurfaceMesh::from_raster(&inputs.elevation)
            .warp_by_scalar(&attrs.elevation, fusion.warp_factor)?;
        debug!(
            n_vertices = elevation.n_vertices(),
            n_cells = elevation.n_cells(),
            "高程面已构建"
        );

        // 影像披覆
        let draped = DrapeProjector::new(fusion.max_elevation)?
            .project(&inputs.aerial, &elevation)?
            .translated(0.0, 0.0, fusion.z_shift);

        // 电阻率重采样
        let (points, values) = inputs.resistivity.valid_samples();
        let interpolator = NearestInterpolator::with_config(
            &points,
            &values,
            InterpolatorConfig::with_parallel_threshold(fusion.parallel_threshold),
        )?;
        let resampled = interpolator.resample(&elevation.planar_points())?;
        let resistivity = elevation
            .clone()
            .with_point_data(attrs.resistivity.clone(), resampled)?
            .translated(0.0, 0.0, fusion.z_shift + fusion.resistivity_offset);
        debug!(
            n_sources = interpolator.n_sources(),
            n_targets = resistivity.n_vertices(),
            "电阻率已重采样到高程面"
        );

        // 剖面
        let profiles = inputs
            .profiles
            .iter()
            .map(|p| self.clean_profile(p))
            .collect::<SceneResult<Vec<_>>>()?;
        let shared_range = profiles
            .iter()
            .map(|p| p.mesh.data_range(&attrs.velocity))
            .fold(None, merge_ranges)
            .and_then(|(lo, hi)| ColorRange::new(lo, hi).ok());

        let mut registry = LayerRegistry::new();
        for profile in profiles {
            let mut layer = Layer::new(
                profile.id.clone(),
                LayerKind::Profile,
                profile.id,
                LayerGeometry::Mesh(profile.mesh),
            )
            .with_attribute(&attrs.velocity, &cmaps.seismic)?
            .with_opacity(display.profile_opacity);
            if let Some(range) = shared_range {
                layer = layer.with_color_range(range);
            }
            registry.register(layer)?;
        }

        registry.register(
            Layer::new(
                ELEVATION_LAYER_ID,
                LayerKind::ElevationImage,
                "DEM",
                LayerGeometry::Draped(draped),
            )
            .with_attribute(&attrs.elevation, &cmaps.elevation)?
            .with_opacity(display.elevation_opacity),
        )?;

        registry.register(
            Layer::new(
                RESISTIVITY_LAYER_ID,
                LayerKind::ResistivityMap,
                "CMD",
                LayerGeometry::Mesh(resistivity),
            )
            .with_attribute(&attrs.resistivity, &cmaps.resistivity)?
            .with_opacity(display.resistivity_opacity),
        )?;

        info!(
            n_layers = registry.len(),
            n_profiles = inputs.profiles.len(),
            "场景融合完成"
        );
        Ok(registry)
    }

    fn check_crs(&self, inputs: &SceneInputs) -> SceneResult<()> {
        let sources = inputs
            .profiles
            .iter()
            .map(|p| p.mesh.crs())
            .chain([
                inputs.elevation.crs(),
                inputs.resistivity.crs(),
                inputs.aerial.crs(),
            ]);
        for crs in sources {
            if !crs.same_reference(&self.crs) {
                return Err(TerrainError::georeference_mismatch("场景融合", &self.crs, crs).into());
            }
        }
        Ok(())
    }

    /// 剔除覆盖度为 0 的单元；网格没有覆盖度数据时原样保留
    fn clean_profile(&self, profile: &ProfileInput) -> SceneResult<ProfileInput> {
        let coverage = &self.config.attributes.coverage;
        if profile.mesh.cell_data(coverage).is_none() {
            debug!(profile = %profile.id, "剖面没有覆盖度数据，跳过清理");
            return Ok(profile.clone());
        }
        let mesh = profile.mesh.remove_cells_where(coverage, |c| c == 0.0)?;
        debug!(
            profile = %profile.id,
            removed = profile.mesh.n_cells() - mesh.n_cells(),
            "剖面已清理"
        );
        Ok(ProfileInput::new(profile.id.clone(), mesh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gv_geo::{GeoTransform, Point3D};
    use gv_terrain::RasterGrid;
    use image::RgbImage;

    fn grid(crs: CrsDefinition) -> RasterGrid {
        RasterGrid::new(3, 3, GeoTransform::new(0.0, 30.0, 10.0, -10.0).unwrap(), crs)
    }

    fn profile(id: &str, velocities: [f64; 4]) -> ProfileInput {
        let vertices = vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(10.0, 0.0, 0.0),
            Point3D::new(10.0, 0.0, -5.0),
            Point3D::new(0.0, 0.0, -5.0),
        ];
        let mesh = SurfaceMesh::new(vertices, &[vec![0, 1, 2], vec![0, 2, 3]], CrsDefinition::lambert93())
            .unwrap()
            .with_point_data("Velocity", velocities.to_vec())
            .unwrap()
            .with_cell_data("S_Coverage", vec![3.0, 0.0])
            .unwrap();
        ProfileInput::new(id, mesh)
    }

    fn inputs() -> SceneInputs {
        let crs = CrsDefinition::lambert93();
        let elevation = RasterField::from_data(
            grid(crs.clone()),
            "Elevation [m]",
            vec![10.0, 20.0, 30.0, 40.0, 9999.0, 60.0, 70.0, 80.0, 5000.0],
            9999.0,
        )
        .unwrap();
        let resistivity = RasterField::from_data(
            grid(crs.clone()),
            "Resistivity",
            vec![1.0, 9999.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
            9999.0,
        )
        .unwrap();
        let aerial = gv_terrain::ImageRaster::new(
            RgbImage::new(3, 3),
            GeoTransform::new(0.0, 30.0, 10.0, -10.0).unwrap(),
            crs,
        );
        SceneInputs {
            profiles: vec![
                profile("profA", [300.0, 500.0, 700.0, 900.0]),
                profile("profB", [1200.0, 1500.0, 2100.0, 9000.0]),
            ],
            elevation,
            resistivity,
            aerial,
        }
    }

    #[test]
    fn test_registration_order() {
        let registry = SceneFusion::new(SceneConfig::default())
            .unwrap()
            .fuse(&inputs())
            .unwrap();
        let ids: Vec<&str> = registry.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["profA", "profB", "dem", "cmd"]);
    }

    #[test]
    fn test_profiles_cleaned_and_share_range() {
        let registry = SceneFusion::new(SceneConfig::default())
            .unwrap()
            .fuse(&inputs())
            .unwrap();
        let prof_a = registry.get("profA").unwrap();
        // 第二个单元覆盖度为 0，被剔除，顶点 3 不再被引用
        assert_eq!(prof_a.geometry().mesh().n_cells(), 1);
        assert_eq!(prof_a.geometry().mesh().n_vertices(), 3);

        // 共享范围取清理后的全部剖面：A 为 [300, 700]，B 为 [1200, 2100]
        let shared = ColorRange::new(300.0, 2100.0).unwrap();
        assert_eq!(prof_a.color_range(), Some(shared));
        assert_eq!(registry.get("profB").unwrap().color_range(), Some(shared));
        // 数据范围仍是各自的
        assert_eq!(prof_a.data_range(), Some(ColorRange::new(300.0, 700.0).unwrap()));
    }

    #[test]
    fn test_dem_clamped_and_shifted() {
        let mut config = SceneConfig::default();
        config.fusion.z_shift = 2.0;
        config.fusion.max_elevation = 100.0;
        let registry = SceneFusion::new(config).unwrap().fuse(&inputs()).unwrap();

        let dem = registry.get("dem").unwrap();
        assert!(dem.geometry().is_textured());
        let z: Vec<f64> = dem.geometry().mesh().vertices().iter().map(|v| v.z).collect();
        assert_eq!(z[0], 12.0);
        assert!(z[4].is_nan());
        // 5000 被夹到 100 后再抬升
        assert_eq!(z[8], 102.0);
    }

    #[test]
    fn test_resistivity_resampled_and_lifted() {
        let registry = SceneFusion::new(SceneConfig::default())
            .unwrap()
            .fuse(&inputs())
            .unwrap();
        let cmd = registry.get("cmd").unwrap();
        let mesh = cmd.geometry().mesh();
        let values = mesh.point_data("Resistivity").unwrap();
        // 顶点 1 对应的电阻率像素为无数据，取最近的有效像素（平局取最小索引 0）
        assert_eq!(values[0], 1.0);
        assert_eq!(values[1], 1.0);
        assert_eq!(values[2], 3.0);
        assert_eq!(values[8], 9.0);
        assert_eq!(mesh.vertices()[0].z, 10.25);
        assert_eq!(cmd.colormap(), Some("viridis"));
    }

    #[test]
    fn test_crs_mismatch() {
        let mut inputs = inputs();
        inputs.aerial = gv_terrain::ImageRaster::new(
            RgbImage::new(1, 1),
            GeoTransform::new(0.0, 30.0, 10.0, -10.0).unwrap(),
            CrsDefinition::wgs84(),
        );
        let result = SceneFusion::new(SceneConfig::default()).unwrap().fuse(&inputs);
        assert!(matches!(
            result,
            Err(crate::SceneError::Terrain(TerrainError::GeoreferenceMismatch { .. }))
        ));
    }

    #[test]
    fn test_duplicate_profile_ids() {
        let mut inputs = inputs();
        inputs.profiles[1].id = "profA".to_string();
        let result = SceneFusion::new(SceneConfig::default()).unwrap().fuse(&inputs);
        assert!(matches!(result, Err(crate::SceneError::DuplicateId(_))));
    }

    #[test]
    fn test_profile_id_from_path() {
        assert_eq!(profile_id_from_path("/tmp/abc.vtk", 15), "abc");
        assert_eq!(profile_id_from_path("/tmp/ProfileLongName123.vtk", 4), "Prof");
        assert_eq!(profile_id_from_path("", 15), "");
    }
}
