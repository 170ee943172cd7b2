// crates/gv_geo/src/transform.rs
//! 仿射变换与栅格地理变换
//!
//! - [`AffineTransform`]: 通用二维仿射矩阵
//! - [`GeoTransform`]: 栅格像素坐标 ↔ 地理坐标（GDAL 约定），预先计算逆矩阵
//!
//! # 示例
//!
//! ```
//! use gv_geo::transform::GeoTransform;
//!
//! // 左上角 (100, 200)，像素 10 m，北向上
//! let gt = GeoTransform::new(100.0, 200.0, 10.0, -10.0).unwrap();
//! let (px, py) = gt.geo_to_pixel(125.0, 185.0);
//! assert!((px - 2.5).abs() < 1e-12);
//! assert!((py - 1.5).abs() < 1e-12);
//! ```

use crate::error::{GeoError, GeoResult};
use crate::spatial_index::BoundingBox;

// ============================================================================
// 仿射变换矩阵
// ============================================================================

/// 仿射变换矩阵
///
/// 变换公式：
/// - x' = a*x + b*y + c
/// - y' = d*x + e*y + f
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    /// x 方向缩放系数
    pub a: f64,
    /// x 方向倾斜系数
    pub b: f64,
    /// x 平移量
    pub c: f64,
    /// y 方向倾斜系数
    pub d: f64,
    /// y 方向缩放系数
    pub e: f64,
    /// y 平移量
    pub f: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    /// 恒等变换
    #[must_use]
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 1.0,
            f: 0.0,
        }
    }

    /// 从 GDAL `GeoTransform` 数组创建
    ///
    /// GDAL 格式: [c, a, b, f, d, e]
    #[must_use]
    pub fn from_gdal_geotransform(gt: [f64; 6]) -> Self {
        Self {
            c: gt[0],
            a: gt[1],
            b: gt[2],
            f: gt[3],
            d: gt[4],
            e: gt[5],
        }
    }

    /// 应用正向变换
    #[inline]
    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.b * y + self.c,
            self.d * x + self.e * y + self.f,
        )
    }

    /// 获取变换的行列式
    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    /// 计算逆变换
    ///
    /// # Errors
    /// 行列式接近零时返回 [`GeoError::SingularTransform`]
    pub fn inverse(&self) -> GeoResult<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-15 {
            return Err(GeoError::SingularTransform);
        }
        let inv_det = 1.0 / det;
        Ok(Self {
            a: self.e * inv_det,
            b: -self.b * inv_det,
            c: (self.b * self.f - self.c * self.e) * inv_det,
            d: -self.d * inv_det,
            e: self.a * inv_det,
            f: (self.c * self.d - self.a * self.f) * inv_det,
        })
    }
}

// ============================================================================
// 栅格地理变换
// ============================================================================

/// 栅格地理变换（像素坐标 ↔ 地理坐标）
///
/// 像素坐标 (col, row) 以栅格左上角为原点，像素 (i, j) 覆盖
/// `[i, i+1) × [j, j+1)`，中心为 `(i + 0.5, j + 0.5)`。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    forward: AffineTransform,
    inverse: AffineTransform,
}

impl GeoTransform {
    /// 创建无旋转的地理变换
    ///
    /// # Errors
    /// 像素尺寸为零或非有限值时返回 [`GeoError::SingularTransform`]
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> GeoResult<Self> {
        Self::from_gdal([origin_x, pixel_width, 0.0, origin_y, 0.0, pixel_height])
    }

    /// 从 GDAL 六参数数组创建 `[x_origin, x_res, x_rot, y_origin, y_rot, y_res]`
    ///
    /// # Errors
    /// 矩阵不可逆时返回 [`GeoError::SingularTransform`]
    pub fn from_gdal(gt: [f64; 6]) -> GeoResult<Self> {
        let forward = AffineTransform::from_gdal_geotransform(gt);
        let inverse = forward.inverse()?;
        Ok(Self { forward, inverse })
    }

    /// 地理坐标转栅格坐标（连续值）
    #[inline]
    #[must_use]
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        self.inverse.apply(x, y)
    }

    /// 栅格坐标转地理坐标
    #[inline]
    #[must_use]
    pub fn pixel_to_geo(&self, px: f64, py: f64) -> (f64, f64) {
        self.forward.apply(px, py)
    }

    /// 像素 (col, row) 中心的地理坐标
    #[inline]
    #[must_use]
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        self.pixel_to_geo(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// 栅格覆盖范围（四个角点的外包框）
    #[must_use]
    pub fn footprint(&self, width: usize, height: usize) -> BoundingBox {
        let w = width as f64;
        let h = height as f64;
        let corners = [
            self.pixel_to_geo(0.0, 0.0),
            self.pixel_to_geo(w, 0.0),
            self.pixel_to_geo(0.0, h),
            self.pixel_to_geo(w, h),
        ];
        corners[1..]
            .iter()
            .fold(BoundingBox::new(corners[0].0, corners[0].1, corners[0].0, corners[0].1), |bb, &(x, y)| {
                bb.merge(&BoundingBox::new(x, y, x, y))
            })
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affine_inverse() {
        let affine = AffineTransform {
            a: 2.0,
            b: 0.0,
            c: 10.0,
            d: 0.0,
            e: 3.0,
            f: 20.0,
        };
        let (x, y) = affine.apply(5.0, 5.0);
        assert!((x - 20.0).abs() < 1e-10);
        assert!((y - 35.0).abs() < 1e-10);

        let inv = affine.inverse().expect("inverse failed");
        let (ox, oy) = inv.apply(x, y);
        assert!((ox - 5.0).abs() < 1e-10);
        assert!((oy - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_singular_transform() {
        assert!(matches!(
            GeoTransform::new(0.0, 0.0, 0.0, -1.0),
            Err(GeoError::SingularTransform)
        ));
    }

    #[test]
    fn test_geo_transform() {
        let transform = GeoTransform::new(0.0, 100.0, 10.0, -10.0).unwrap();

        let (px, py) = transform.geo_to_pixel(0.0, 100.0);
        assert!(px.abs() < 1e-10);
        assert!(py.abs() < 1e-10);

        let (px, py) = transform.geo_to_pixel(10.0, 90.0);
        assert!((px - 1.0).abs() < 1e-10);
        assert!((py - 1.0).abs() < 1e-10);

        let (x, y) = transform.cell_center(0, 0);
        assert!((x - 5.0).abs() < 1e-10);
        assert!((y - 95.0).abs() < 1e-10);
    }

    #[test]
    fn test_rotated_geo_transform_roundtrip() {
        let transform = GeoTransform::from_gdal([500.0, 2.0, 0.5, 1000.0, 0.3, -2.0]).unwrap();
        let (x, y) = transform.pixel_to_geo(12.25, 7.75);
        let (px, py) = transform.geo_to_pixel(x, y);
        assert!((px - 12.25).abs() < 1e-9);
        assert!((py - 7.75).abs() < 1e-9);
    }

    #[test]
    fn test_footprint() {
        let transform = GeoTransform::new(966_860.0, 6_446_800.0, 5.0, -5.0).unwrap();
        let bbox = transform.footprint(83, 59);
        assert!((bbox.min_x - 966_860.0).abs() < 1e-6);
        assert!((bbox.max_x - 967_275.0).abs() < 1e-6);
        assert!((bbox.min_y - 6_446_505.0).abs() < 1e-6);
        assert!((bbox.max_y - 6_446_800.0).abs() < 1e-6);
    }
}
