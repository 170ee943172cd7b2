// crates/gv_terrain/src/drape.rs

//! 影像披覆
//!
//! 把 2D 彩色影像按平面坐标对应关系投影到 3D 高程表面上：
//!
//! 1. 每个顶点的 (x, y) 经影像地理变换的逆变换得到像素索引，
//!    向下取整后夹到影像边缘，记录该像素颜色；
//! 2. 高程超过 `max_elevation` 的顶点被压到 `max_elevation`，NaN 保持 NaN；
//! 3. 纹理坐标按影像外包框归一化并夹到 [0,1]，v = 0 对应 `min_y`。
//!
//! 输入相同则输出逐位相同。

use crate::error::{TerrainError, TerrainResult};
use crate::imagery::ImageRaster;
use crate::mesh::SurfaceMesh;
use gv_geo::Point3D;
use image::RgbImage;
use tracing::debug;

/// 披覆结果：夹取后的网格 + 纹理 + 逐顶点纹理坐标与颜色
#[derive(Debug, Clone)]
pub struct DrapedSurface {
    /// 高程已夹取的网格
    pub mesh: SurfaceMesh,
    /// 纹理影像
    pub texture: RgbImage,
    /// 逐顶点 (u, v)
    pub texture_coords: Vec<[f64; 2]>,
    /// 逐顶点采样颜色
    pub vertex_colors: Vec<[u8; 3]>,
}

impl DrapedSurface {
    /// 整体平移几何，纹理分配不变
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            mesh: self.mesh.translated(dx, dy, dz),
            texture: self.texture.clone(),
            texture_coords: self.texture_coords.clone(),
            vertex_colors: self.vertex_colors.clone(),
        }
    }
}

/// 影像披覆投影器
#[derive(Debug, Clone, Copy)]
pub struct DrapeProjector {
    max_elevation: f64,
}

impl DrapeProjector {
    /// 创建投影器
    ///
    /// # Errors
    /// `max_elevation` 非有限时返回 [`TerrainError::InvalidInput`]
    pub fn new(max_elevation: f64) -> TerrainResult<Self> {
        if !max_elevation.is_finite() {
            return Err(TerrainError::invalid_input(format!(
                "最大高程必须为有限值: {max_elevation}"
            )));
        }
        Ok(Self { max_elevation })
    }

    /// 高程上限
    pub fn max_elevation(&self) -> f64 {
        self.max_elevation
    }

    /// 把影像披覆到网格上
    ///
    /// # Errors
    /// - 影像与网格 CRS 不一致：[`TerrainError::GeoreferenceMismatch`]
    /// - 空影像：[`TerrainError::InvalidInput`]
    pub fn project(&self, image: &ImageRaster, mesh: &SurfaceMesh) -> TerrainResult<DrapedSurface> {
        if !image.crs().same_reference(mesh.crs()) {
            return Err(TerrainError::georeference_mismatch(
                "影像披覆",
                mesh.crs(),
                image.crs(),
            ));
        }
        if image.is_empty() {
            return Err(TerrainError::invalid_input(format!(
                "影像为空: {}×{}",
                image.width(),
                image.height()
            )));
        }

        let bbox = image.footprint();
        let n = mesh.n_vertices();
        let mut vertices = Vec::with_capacity(n);
        let mut texture_coords = Vec::with_capacity(n);
        let mut vertex_colors = Vec::with_capacity(n);
        let mut clamped = 0usize;

        for vertex in mesh.vertices() {
            let xy = vertex.xy();
            let color = image
                .color_at(&xy)
                .ok_or_else(|| TerrainError::invalid_input("影像为空"))?;
            vertex_colors.push(color);

            let (u, v) = bbox.normalize_clamped(&xy);
            texture_coords.push([u, v]);

            // NaN > max 为 false，NaN 原样保留
            let z = if vertex.z > self.max_elevation {
                clamped += 1;
                self.max_elevation
            } else {
                vertex.z
            };
            vertices.push(Point3D::from_xy_z(xy, z));
        }

        debug!(
            n_vertices = n,
            n_clamped = clamped,
            max_elevation = self.max_elevation,
            "影像披覆完成"
        );

        Ok(DrapedSurface {
            mesh: mesh.with_vertices(vertices)?,
            texture: image.pixels().clone(),
            texture_coords,
            vertex_colors,
        })
    }
}

/// 一次性披覆
///
/// # Errors
/// 见 [`DrapeProjector::new`] 与 [`DrapeProjector::project`]
pub fn drape(
    image: &ImageRaster,
    elevation_mesh: &SurfaceMesh,
    max_elevation: f64,
) -> TerrainResult<DrapedSurface> {
    DrapeProjector::new(max_elevation)?.project(image, elevation_mesh)
}
