// crates/gv_terrain/src/raster.rs

//! 栅格场
//!
//! 规则网格上的单个命名标量属性（如 "Elevation [m]"、"Resistivity"），
//! 行主序存储，第 0 行位于顶部，采样点取像素中心。

use crate::error::{TerrainError, TerrainResult};
use gv_foundation::finite_range;
use gv_geo::{BoundingBox, CrsDefinition, GeoTransform, Point2D};

/// 栅格几何描述：尺寸、地理变换与 CRS
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    /// 列数
    pub width: usize,
    /// 行数
    pub height: usize,
    /// 像素 ↔ 地理坐标变换
    pub transform: GeoTransform,
    /// 声明的坐标参考系统
    pub crs: CrsDefinition,
}

impl RasterGrid {
    /// 创建栅格几何描述
    pub fn new(width: usize, height: usize, transform: GeoTransform, crs: CrsDefinition) -> Self {
        Self {
            width,
            height,
            transform,
            crs,
        }
    }

    /// 像素总数
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// 是否没有像素
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// 行主序线性索引
    #[inline]
    pub fn index(&self, col: usize, row: usize) -> usize {
        row * self.width + col
    }

    /// 全部像素中心（行主序）
    pub fn cell_centers(&self) -> Vec<Point2D> {
        let mut centers = Vec::with_capacity(self.len());
        for row in 0..self.height {
            for col in 0..self.width {
                centers.push(self.transform.cell_center(col, row).into());
            }
        }
        centers
    }

    /// 栅格覆盖范围
    pub fn footprint(&self) -> BoundingBox {
        self.transform.footprint(self.width, self.height)
    }
}

/// 栅格场
#[derive(Debug, Clone)]
pub struct RasterField {
    grid: RasterGrid,
    attribute: String,
    data: Vec<f64>,
    nodata: f64,
}

impl RasterField {
    /// 从行主序数据创建
    ///
    /// # Errors
    /// 数据长度与 `width * height` 不符时返回 [`TerrainError::SizeMismatch`]
    pub fn from_data(
        grid: RasterGrid,
        attribute: impl Into<String>,
        data: Vec<f64>,
        nodata: f64,
    ) -> TerrainResult<Self> {
        if data.len() != grid.len() {
            return Err(TerrainError::size_mismatch("raster data", grid.len(), data.len()));
        }
        Ok(Self {
            grid,
            attribute: attribute.into(),
            data,
            nodata,
        })
    }

    /// 栅格几何
    pub fn grid(&self) -> &RasterGrid {
        &self.grid
    }

    /// 声明的 CRS
    pub fn crs(&self) -> &CrsDefinition {
        &self.grid.crs
    }

    /// 属性名
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// 原始数据（含无数据值）
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// 无数据值
    pub fn nodata(&self) -> f64 {
        self.nodata
    }

    /// 获取像素值
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col < self.grid.width && row < self.grid.height {
            Some(self.data[self.grid.index(col, row)])
        } else {
            None
        }
    }

    /// 判断是否为无数据
    #[inline]
    pub fn is_nodata(&self, value: f64) -> bool {
        value.is_nan() || (self.nodata.is_finite() && (value - self.nodata).abs() < 1e-10)
    }

    /// 数据副本，无数据替换为 NaN
    pub fn masked_values(&self) -> Vec<f64> {
        self.data
            .iter()
            .map(|&v| if self.is_nodata(v) { f64::NAN } else { v })
            .collect()
    }

    /// 有效采样（像素中心 + 值），无数据像素被排除
    pub fn valid_samples(&self) -> (Vec<Point2D>, Vec<f64>) {
        let mut points = Vec::with_capacity(self.data.len());
        let mut values = Vec::with_capacity(self.data.len());
        for row in 0..self.grid.height {
            for col in 0..self.grid.width {
                let value = self.data[self.grid.index(col, row)];
                if self.is_nodata(value) {
                    continue;
                }
                points.push(self.grid.transform.cell_center(col, row).into());
                values.push(value);
            }
        }
        (points, values)
    }

    /// 有效值的有限范围
    pub fn data_range(&self) -> Option<(f64, f64)> {
        finite_range(&self.masked_values())
    }
}
