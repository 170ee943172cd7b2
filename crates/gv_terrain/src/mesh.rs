// crates/gv_terrain/src/mesh.rs

//! 表面网格
//!
//! 有序 3D 顶点 + 单元连接关系 + 命名的点/单元标量数组。
//! 连接关系按 CSR 展平存储（`connectivity` + `offsets`），单元可为任意多边形。
//!
//! 网格创建后只读：所有变换（抬升、按标量变形、删除单元、写入属性）
//! 都返回新的网格。
//!
//! # 示例
//!
//! ```
//! use gv_geo::{CrsDefinition, GeoTransform};
//! use gv_terrain::raster::{RasterField, RasterGrid};
//! use gv_terrain::mesh::SurfaceMesh;
//!
//! let grid = RasterGrid::new(2, 2, GeoTransform::new(0.0, 2.0, 1.0, -1.0).unwrap(), CrsDefinition::lambert93());
//! let dem = RasterField::from_data(grid, "Elevation [m]", vec![1.0, 2.0, 3.0, 4.0], 9999.0).unwrap();
//!
//! let mesh = SurfaceMesh::from_raster(&dem).warp_by_scalar("Elevation [m]", 1.0).unwrap();
//! assert_eq!(mesh.n_vertices(), 4);
//! assert_eq!(mesh.n_cells(), 1);
//! assert_eq!(mesh.vertices()[3].z, 4.0);
//! ```

use crate::error::{TerrainError, TerrainResult};
use crate::raster::RasterField;
use gv_foundation::finite_range;
use gv_geo::{CrsDefinition, Point2D, Point3D};
use std::collections::BTreeMap;

/// 表面网格
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    vertices: Vec<Point3D>,
    /// 展平的单元顶点索引
    connectivity: Vec<usize>,
    /// 每个单元在 `connectivity` 中的起点，长度为单元数 + 1
    offsets: Vec<usize>,
    point_data: BTreeMap<String, Vec<f64>>,
    cell_data: BTreeMap<String, Vec<f64>>,
    crs: CrsDefinition,
}

impl SurfaceMesh {
    /// 从顶点与单元列表创建
    ///
    /// # Errors
    /// 单元引用越界顶点时返回 [`TerrainError::InvalidInput`]
    pub fn new(
        vertices: Vec<Point3D>,
        cells: &[Vec<usize>],
        crs: CrsDefinition,
    ) -> TerrainResult<Self> {
        let n = vertices.len();
        let mut connectivity = Vec::with_capacity(cells.iter().map(Vec::len).sum());
        let mut offsets = Vec::with_capacity(cells.len() + 1);
        offsets.push(0);

        for (cell_id, cell) in cells.iter().enumerate() {
            if let Some(&bad) = cell.iter().find(|&&v| v >= n) {
                return Err(TerrainError::invalid_input(format!(
                    "单元 {cell_id} 引用了不存在的顶点 {bad}（顶点数 {n}）"
                )));
            }
            connectivity.extend_from_slice(cell);
            offsets.push(connectivity.len());
        }

        Ok(Self {
            vertices,
            connectivity,
            offsets,
            point_data: BTreeMap::new(),
            cell_data: BTreeMap::new(),
            crs,
        })
    }

    /// 从栅格构建结构化四边形网格
    ///
    /// 每个像素中心一个顶点（z = 0），相邻四个像素中心组成一个四边形单元。
    /// 栅格属性写入同名点数据，无数据为 NaN。
    pub fn from_raster(field: &RasterField) -> Self {
        let grid = field.grid();
        let (w, h) = (grid.width, grid.height);

        let vertices: Vec<Point3D> = grid
            .cell_centers()
            .into_iter()
            .map(|p| Point3D::from_xy_z(p, 0.0))
            .collect();

        let n_quads = w.saturating_sub(1) * h.saturating_sub(1);
        let mut connectivity = Vec::with_capacity(n_quads * 4);
        let mut offsets = Vec::with_capacity(n_quads + 1);
        offsets.push(0);
        for row in 0..h.saturating_sub(1) {
            for col in 0..w.saturating_sub(1) {
                connectivity.extend_from_slice(&[
                    grid.index(col, row),
                    grid.index(col + 1, row),
                    grid.index(col + 1, row + 1),
                    grid.index(col, row + 1),
                ]);
                offsets.push(connectivity.len());
            }
        }

        let mut point_data = BTreeMap::new();
        point_data.insert(field.attribute().to_string(), field.masked_values());

        Self {
            vertices,
            connectivity,
            offsets,
            point_data,
            cell_data: BTreeMap::new(),
            crs: field.crs().clone(),
        }
    }

    // ========================================================================
    // 访问
    // ========================================================================

    /// 顶点
    pub fn vertices(&self) -> &[Point3D] {
        &self.vertices
    }

    /// 顶点数
    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// 单元数
    pub fn n_cells(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// 单元 `i` 的顶点索引
    pub fn cell(&self, i: usize) -> Option<&[usize]> {
        let start = *self.offsets.get(i)?;
        let end = *self.offsets.get(i + 1)?;
        Some(&self.connectivity[start..end])
    }

    /// 依次遍历全部单元
    pub fn cells(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.offsets
            .windows(2)
            .map(move |w| &self.connectivity[w[0]..w[1]])
    }

    /// 声明的 CRS
    pub fn crs(&self) -> &CrsDefinition {
        &self.crs
    }

    /// 顶点的平面坐标
    pub fn planar_points(&self) -> Vec<Point2D> {
        self.vertices.iter().map(|v| v.xy()).collect()
    }

    /// 点数据
    pub fn point_data(&self, name: &str) -> Option<&[f64]> {
        self.point_data.get(name).map(Vec::as_slice)
    }

    /// 单元数据
    pub fn cell_data(&self, name: &str) -> Option<&[f64]> {
        self.cell_data.get(name).map(Vec::as_slice)
    }

    /// 按名称查找属性（先点数据后单元数据）
    pub fn attribute(&self, name: &str) -> Option<&[f64]> {
        self.point_data(name).or_else(|| self.cell_data(name))
    }

    /// 全部属性名（点数据在前，各自按字典序）
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.point_data
            .keys()
            .chain(self.cell_data.keys())
            .map(String::as_str)
    }

    /// 属性的有限值范围
    pub fn data_range(&self, name: &str) -> Option<(f64, f64)> {
        self.attribute(name).and_then(finite_range)
    }

    // ========================================================================
    // 变换（均返回新网格）
    // ========================================================================

    /// 附加点数据
    ///
    /// # Errors
    /// 长度与顶点数不符时返回 [`TerrainError::SizeMismatch`]
    pub fn with_point_data(mut self, name: impl Into<String>, values: Vec<f64>) -> TerrainResult<Self> {
        if values.len() != self.vertices.len() {
            return Err(TerrainError::size_mismatch(
                "point data",
                self.vertices.len(),
                values.len(),
            ));
        }
        self.point_data.insert(name.into(), values);
        Ok(self)
    }

    /// 附加单元数据
    ///
    /// # Errors
    /// 长度与单元数不符时返回 [`TerrainError::SizeMismatch`]
    pub fn with_cell_data(mut self, name: impl Into<String>, values: Vec<f64>) -> TerrainResult<Self> {
        if values.len() != self.n_cells() {
            return Err(TerrainError::size_mismatch(
                "cell data",
                self.n_cells(),
                values.len(),
            ));
        }
        self.cell_data.insert(name.into(), values);
        Ok(self)
    }

    /// 替换顶点位置，连接关系与属性不变
    ///
    /// # Errors
    /// 顶点数不符时返回 [`TerrainError::SizeMismatch`]
    pub fn with_vertices(&self, vertices: Vec<Point3D>) -> TerrainResult<Self> {
        if vertices.len() != self.vertices.len() {
            return Err(TerrainError::size_mismatch(
                "vertices",
                self.vertices.len(),
                vertices.len(),
            ));
        }
        Ok(Self {
            vertices,
            connectivity: self.connectivity.clone(),
            offsets: self.offsets.clone(),
            point_data: self.point_data.clone(),
            cell_data: self.cell_data.clone(),
            crs: self.crs.clone(),
        })
    }

    /// 按点标量变形：`z += factor * value`
    ///
    /// NaN 值使对应顶点高程为 NaN。
    ///
    /// # Errors
    /// 网格没有该点数据时返回 [`TerrainError::MissingAttribute`]
    pub fn warp_by_scalar(&self, name: &str, factor: f64) -> TerrainResult<Self> {
        let values = self
            .point_data(name)
            .ok_or_else(|| TerrainError::missing_attribute(name))?;

        let mut warped = self.clone();
        for (vertex, &value) in warped.vertices.iter_mut().zip(values) {
            vertex.z += factor * value;
        }
        Ok(warped)
    }

    /// 整体平移
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64, dz: f64) -> Self {
        let mut moved = self.clone();
        for vertex in &mut moved.vertices {
            *vertex = vertex.translated(dx, dy, dz);
        }
        moved
    }

    /// 删除单元数据满足条件的单元，并丢弃不再被引用的顶点
    ///
    /// 点数据随顶点压缩，单元数据随单元过滤，顺序保持不变。
    ///
    /// # Errors
    /// 网格没有该单元数据时返回 [`TerrainError::MissingAttribute`]
    pub fn remove_cells_where(
        &self,
        name: &str,
        predicate: impl Fn(f64) -> bool,
    ) -> TerrainResult<Self> {
        let flags = self
            .cell_data(name)
            .ok_or_else(|| TerrainError::missing_attribute(name))?;

        let kept_cells: Vec<usize> = (0..self.n_cells()).filter(|&i| !predicate(flags[i])).collect();
        if kept_cells.len() == self.n_cells() {
            return Ok(self.clone());
        }

        // 旧顶点索引 → 新顶点索引
        let mut remap: Vec<Option<usize>> = vec![None; self.vertices.len()];
        let mut kept_vertices = Vec::new();
        let mut connectivity = Vec::new();
        let mut offsets = Vec::with_capacity(kept_cells.len() + 1);
        offsets.push(0);

        for &cell_id in &kept_cells {
            let start = self.offsets[cell_id];
            let end = self.offsets[cell_id + 1];
            for &old in &self.connectivity[start..end] {
                let new = *remap[old].get_or_insert_with(|| {
                    kept_vertices.push(old);
                    kept_vertices.len() - 1
                });
                connectivity.push(new);
            }
            offsets.push(connectivity.len());
        }

        let vertices = kept_vertices.iter().map(|&i| self.vertices[i]).collect();
        let point_data = self
            .point_data
            .iter()
            .map(|(k, v)| (k.clone(), kept_vertices.iter().map(|&i| v[i]).collect()))
            .collect();
        let cell_data = self
            .cell_data
            .iter()
            .map(|(k, v)| (k.clone(), kept_cells.iter().map(|&i| v[i]).collect()))
            .collect();

        Ok(Self {
            vertices,
            connectivity,
            offsets,
            point_data,
            cell_data,
            crs: self.crs.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterGrid;
    use gv_geo::GeoTransform;

    fn dem(values: Vec<f64>) -> RasterField {
        let transform = GeoTransform::new(0.0, 2.0, 1.0, -1.0).unwrap();
        let grid = RasterGrid::new(3, 2, transform, CrsDefinition::lambert93());
        RasterField::from_data(grid, "Elevation [m]", values, 9999.0).unwrap()
    }

    /// 三个相邻三角形排成一条带
    fn strip() -> SurfaceMesh {
        let vertices = (0u8..5)
            .map(|i| Point3D::new(f64::from(i), f64::from(i % 2), 0.0))
            .collect();
        let cells = vec![vec![0, 1, 2], vec![1, 2, 3], vec![2, 3, 4]];
        SurfaceMesh::new(vertices, &cells, CrsDefinition::lambert93())
            .unwrap()
            .with_point_data("Velocity", vec![100.0, 200.0, 300.0, 400.0, 500.0])
            .unwrap()
            .with_cell_data("S_Coverage", vec![1.0, 0.0, 0.0])
            .unwrap()
    }

    #[test]
    fn test_from_raster_structure() {
        let mesh = SurfaceMesh::from_raster(&dem(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        assert_eq!(mesh.n_vertices(), 6);
        assert_eq!(mesh.n_cells(), 2);
        assert_eq!(mesh.cell(0), Some(&[0, 1, 4, 3][..]));
        assert_eq!(mesh.cell(1), Some(&[1, 2, 5, 4][..]));
        assert_eq!(mesh.cell(2), None);
        assert_eq!(mesh.vertices()[0], Point3D::new(0.5, 1.5, 0.0));
    }

    #[test]
    fn test_nodata_warps_to_nan() {
        let mesh = SurfaceMesh::from_raster(&dem(vec![1.0, 9999.0, 3.0, 4.0, 5.0, 6.0]))
            .warp_by_scalar("Elevation [m]", 1.0)
            .unwrap();
        assert!(mesh.point_data("Elevation [m]").unwrap()[1].is_nan());
        assert!(mesh.vertices()[1].z.is_nan());
        assert_eq!(mesh.vertices()[2].z, 3.0);
        assert_eq!(mesh.data_range("Elevation [m]"), Some((1.0, 6.0)));
    }

    #[test]
    fn test_warp_factor_and_missing_attribute() {
        let base = SurfaceMesh::from_raster(&dem(vec![1.0; 6]));
        let warped = base.warp_by_scalar("Elevation [m]", 2.5).unwrap();
        assert!(warped.vertices().iter().all(|v| v.z == 2.5));
        // 原网格不变
        assert!(base.vertices().iter().all(|v| v.z == 0.0));

        assert!(matches!(
            base.warp_by_scalar("Resistivity", 1.0),
            Err(TerrainError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_translated() {
        let mesh = SurfaceMesh::from_raster(&dem(vec![0.0; 6])).translated(0.0, 0.0, 0.25);
        assert!(mesh.vertices().iter().all(|v| v.z == 0.25));
    }

    #[test]
    fn test_new_rejects_out_of_range_vertex() {
        let vertices = vec![Point3D::ZERO; 3];
        let result = SurfaceMesh::new(vertices, &[vec![0, 1, 3]], CrsDefinition::lambert93());
        assert!(matches!(result, Err(TerrainError::InvalidInput { .. })));
    }

    #[test]
    fn test_attribute_length_checked() {
        let mesh = SurfaceMesh::from_raster(&dem(vec![0.0; 6]));
        assert!(matches!(
            mesh.clone().with_point_data("Resistivity", vec![1.0; 5]),
            Err(TerrainError::SizeMismatch { expected: 6, actual: 5, .. })
        ));
        assert!(mesh.with_cell_data("S_Coverage", vec![1.0; 2]).is_ok());
    }

    #[test]
    fn test_remove_cells_compacts_vertices() {
        let cleaned = strip().remove_cells_where("S_Coverage", |c| c == 0.0).unwrap();
        assert_eq!(cleaned.n_cells(), 1);
        assert_eq!(cleaned.n_vertices(), 3);
        assert_eq!(cleaned.cell(0), Some(&[0, 1, 2][..]));
        assert_eq!(cleaned.point_data("Velocity"), Some(&[100.0, 200.0, 300.0][..]));
        assert_eq!(cleaned.cell_data("S_Coverage"), Some(&[1.0][..]));
    }

    #[test]
    fn test_remove_cells_keeps_order_after_gap() {
        let mesh = strip()
            .with_cell_data("S_Coverage", vec![1.0, 0.0, 1.0])
            .unwrap();
        let cleaned = mesh.remove_cells_where("S_Coverage", |c| c == 0.0).unwrap();
        assert_eq!(cleaned.n_cells(), 2);
        assert_eq!(cleaned.n_vertices(), 5);
        let cells: Vec<&[usize]> = cleaned.cells().collect();
        assert_eq!(cells, vec![&[0, 1, 2][..], &[2, 3, 4][..]]);
    }

    #[test]
    fn test_remove_cells_missing_attribute() {
        assert!(matches!(
            strip().remove_cells_where("Coverage", |c| c == 0.0),
            Err(TerrainError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_attribute_lookup_order() {
        let mesh = strip();
        assert_eq!(mesh.data_range("Velocity"), Some((100.0, 500.0)));
        assert_eq!(mesh.data_range("S_Coverage"), Some((0.0, 1.0)));
        let names: Vec<&str> = mesh.attribute_names().collect();
        assert_eq!(names, vec!["Velocity", "S_Coverage"]);
    }
}
