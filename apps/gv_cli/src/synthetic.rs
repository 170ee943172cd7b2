// apps/gv_cli/src/synthetic.rs

//! 合成场景
//!
//! 在配置的测区范围内生成高程、电阻率、航拍影像和若干条地震剖面，
//! 用于在没有外部数据的情况下演示融合流程。

use gv_config::SceneConfig;
use gv_foundation::{GvError, GvResult};
use gv_geo::{CrsDefinition, GeoTransform, Point3D};
use gv_scene::{ProfileInput, SceneInputs};
use gv_terrain::{ImageRaster, RasterField, RasterGrid, SurfaceMesh};

/// 剖面水平方向的节点数
const PROFILE_COLUMNS: usize = 12;
/// 剖面深度方向的节点数
const PROFILE_LAYERS: usize = 6;
/// 剖面总深度 [m]
const PROFILE_DEPTH: f64 = 40.0;

/// 合成场景参数
#[derive(Debug, Clone, Copy)]
pub struct SyntheticScene {
    /// 栅格边长（像素）
    pub size: usize,
    /// 剖面条数
    pub profiles: usize,
}

impl SyntheticScene {
    /// 生成融合输入
    ///
    /// # Errors
    /// 栅格边长小于 2、配置 CRS 无法解析或生成的数据尺寸不一致时返回错误
    pub fn build(&self, config: &SceneConfig) -> GvResult<SceneInputs> {
        if self.size < 2 {
            return Err(GvError::invalid_input(format!("栅格边长至少为 2，当前 {}", self.size)));
        }

        let crs = config.crs()?;
        let bounds = config.bounds();
        let n = self.size;
        let pixel_w = bounds.width() / n as f64;
        let pixel_h = bounds.height() / n as f64;
        let transform = GeoTransform::new(bounds.min_x, bounds.max_y, pixel_w, -pixel_h)?;
        let grid = RasterGrid::new(n, n, transform, crs.clone());
        let nodata = config.fusion.nodata;

        // 起伏地形，中心一个像素为无数据
        let elevation: Vec<f64> = (0..n * n)
            .map(|i| {
                let (col, row) = (i % n, i / n);
                if col == n / 2 && row == n / 2 {
                    nodata
                } else {
                    terrain_height(col as f64 / n as f64, row as f64 / n as f64)
                }
            })
            .collect();

        // 电阻率：低阻带沿对角线，首行为无数据
        let resistivity: Vec<f64> = (0..n * n)
            .map(|i| {
                let (col, row) = (i % n, i / n);
                if row == 0 {
                    nodata
                } else {
                    let d = (col as f64 - row as f64).abs() / n as f64;
                    20.0 + 180.0 * d
                }
            })
            .collect();

        let mut rgba = Vec::with_capacity(n * n * 4);
        for i in 0..n * n {
            let (col, row) = (i % n, i / n);
            rgba.extend_from_slice(&[
                channel(col, n),
                channel(row, n),
                channel(col + row, 2 * n),
                255,
            ]);
        }
        let side = u32::try_from(n)
            .map_err(|_| GvError::invalid_input(format!("栅格边长超出范围: {n}")))?;
        let aerial = ImageRaster::from_rgba8(side, side, rgba, transform, crs.clone())?;

        let profiles = (0..self.profiles)
            .map(|k| {
                let fraction = (k as f64 + 1.0) / (self.profiles as f64 + 1.0);
                let y = bounds.min_y + fraction * bounds.height();
                let mesh = profile_mesh(bounds.min_x, bounds.max_x, y, k, &crs, config)?;
                let path = format!("synthetic/profile_{:02}_line.vtk", k + 1);
                Ok(ProfileInput::from_path(path, mesh, config.fusion.profile_name_len))
            })
            .collect::<GvResult<Vec<_>>>()?;

        Ok(SceneInputs {
            profiles,
            elevation: RasterField::from_data(grid.clone(), &config.attributes.elevation, elevation, nodata)?,
            resistivity: RasterField::from_data(grid, &config.attributes.resistivity, resistivity, nodata)?,
            aerial,
        })
    }
}

fn terrain_height(u: f64, v: f64) -> f64 {
    use std::f64::consts::PI;
    180.0 + 25.0 * (2.0 * PI * u).sin() * (PI * v).cos() + 10.0 * v
}

fn channel(value: usize, span: usize) -> u8 {
    u8::try_from(value * 255 / span.max(1)).unwrap_or(u8::MAX)
}

/// 沿 x 方向的竖直剖面，速度随深度增加；最底一排单元覆盖度为 0
fn profile_mesh(
    min_x: f64,
    max_x: f64,
    y: f64,
    index: usize,
    crs: &CrsDefinition,
    config: &SceneConfig,
) -> GvResult<SurfaceMesh> {
    let dx = (max_x - min_x) / (PROFILE_COLUMNS - 1) as f64;
    let dz = PROFILE_DEPTH / (PROFILE_LAYERS - 1) as f64;
    let top = terrain_height(0.5, 0.5);

    let mut vertices = Vec::with_capacity(PROFILE_COLUMNS * PROFILE_LAYERS);
    let mut velocity = Vec::with_capacity(PROFILE_COLUMNS * PROFILE_LAYERS);
    for j in 0..PROFILE_LAYERS {
        for i in 0..PROFILE_COLUMNS {
            vertices.push(Point3D::new(min_x + i as f64 * dx, y, top - j as f64 * dz));
            velocity.push(400.0 + 250.0 * j as f64 + 15.0 * i as f64 + 100.0 * index as f64);
        }
    }

    let node = |i: usize, j: usize| j * PROFILE_COLUMNS + i;
    let mut cells = Vec::new();
    let mut coverage = Vec::new();
    for j in 0..PROFILE_LAYERS - 1 {
        for i in 0..PROFILE_COLUMNS - 1 {
            cells.push(vec![node(i, j), node(i + 1, j), node(i + 1, j + 1), node(i, j + 1)]);
            coverage.push(if j == PROFILE_LAYERS - 2 { 0.0 } else { 1.0 + i as f64 });
        }
    }

    let mesh = SurfaceMesh::new(vertices, &cells, crs.clone())?
        .with_point_data(config.attributes.velocity.clone(), velocity)?
        .with_cell_data(config.attributes.coverage.clone(), coverage)?;
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gv_scene::SceneFusion;

    #[test]
    fn test_synthetic_scene_fuses() {
        let config = SceneConfig::default();
        let inputs = SyntheticScene { size: 8, profiles: 2 }.build(&config).unwrap();
        assert_eq!(inputs.profiles[0].id, "profile_01_line");
        assert_eq!(inputs.aerial.width(), 8);

        let registry = SceneFusion::new(config).unwrap().fuse(&inputs).unwrap();
        assert_eq!(registry.len(), 4);

        // 覆盖度为 0 的底排被剔除
        let profile = registry.get("profile_01_line").unwrap();
        let mesh = profile.geometry().mesh();
        assert_eq!(mesh.n_cells(), (PROFILE_COLUMNS - 1) * (PROFILE_LAYERS - 2));
        assert_eq!(mesh.n_vertices(), PROFILE_COLUMNS * (PROFILE_LAYERS - 1));
    }

    #[test]
    fn test_rejects_tiny_grid() {
        let config = SceneConfig::default();
        assert!(matches!(
            SyntheticScene { size: 1, profiles: 0 }.build(&config),
            Err(GvError::InvalidInput { .. })
        ));
    }
}
