// crates/gv_terrain/src/imagery.rs

//! 地理参考影像
//!
//! 航拍底图等 RGB 影像，附带地理变换与 CRS 标签。
//! 取样采用夹取策略：超出影像范围的坐标取最近的边缘像素。

use crate::error::{TerrainError, TerrainResult};
use gv_geo::{BoundingBox, CrsDefinition, GeoTransform, Point2D};
use image::{DynamicImage, Rgb, RgbImage, RgbaImage};

/// 地理参考 RGB 影像
#[derive(Debug, Clone)]
pub struct ImageRaster {
    pixels: RgbImage,
    transform: GeoTransform,
    crs: CrsDefinition,
}

impl ImageRaster {
    /// 包装已有的 RGB 影像
    pub fn new(pixels: RgbImage, transform: GeoTransform, crs: CrsDefinition) -> Self {
        Self {
            pixels,
            transform,
            crs,
        }
    }

    /// 从 RGBA8 缓冲区创建，丢弃 alpha 通道
    ///
    /// # Errors
    /// 缓冲区长度不等于 `width * height * 4` 时返回 [`TerrainError::SizeMismatch`]
    pub fn from_rgba8(
        width: u32,
        height: u32,
        rgba: Vec<u8>,
        transform: GeoTransform,
        crs: CrsDefinition,
    ) -> TerrainResult<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(TerrainError::size_mismatch("rgba buffer", expected, rgba.len()));
        }
        let buffer = RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| TerrainError::invalid_input("RGBA 缓冲区无法构成影像"))?;
        let pixels = DynamicImage::ImageRgba8(buffer).to_rgb8();
        Ok(Self::new(pixels, transform, crs))
    }

    /// 从归一化浮点 RGBA 缓冲区（分量 ∈ [0,1]）创建
    ///
    /// 分量先夹到 [0,1] 再缩放到 0..=255，NaN 视为 0。
    ///
    /// # Errors
    /// 缓冲区长度不等于 `width * height * 4` 时返回 [`TerrainError::SizeMismatch`]
    pub fn from_rgba_f32(
        width: u32,
        height: u32,
        rgba: &[f32],
        transform: GeoTransform,
        crs: CrsDefinition,
    ) -> TerrainResult<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(TerrainError::size_mismatch("rgba buffer", expected, rgba.len()));
        }

        let mut rgb = Vec::with_capacity(expected / 4 * 3);
        for px in rgba.chunks_exact(4) {
            rgb.extend(px[..3].iter().map(|&c| to_u8(c)));
        }
        let pixels = RgbImage::from_raw(width, height, rgb)
            .ok_or_else(|| TerrainError::invalid_input("RGB 缓冲区无法构成影像"))?;
        Ok(Self::new(pixels, transform, crs))
    }

    /// 影像宽度（像素）
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// 影像高度（像素）
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// 是否为空影像
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// 像素缓冲区
    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// 地理变换
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// 声明的 CRS
    pub fn crs(&self) -> &CrsDefinition {
        &self.crs
    }

    /// 影像覆盖范围
    pub fn footprint(&self) -> BoundingBox {
        self.transform
            .footprint(self.width() as usize, self.height() as usize)
    }

    /// 平面坐标对应的像素索引，向下取整并夹到边缘
    ///
    /// 空影像返回 `None`。
    pub fn pixel_index(&self, point: &Point2D) -> Option<(u32, u32)> {
        if self.is_empty() {
            return None;
        }
        let (px, py) = self.transform.geo_to_pixel(point.x, point.y);
        Some((
            clamp_index(px, self.width()),
            clamp_index(py, self.height()),
        ))
    }

    /// 平面坐标处的颜色（夹取策略）
    pub fn color_at(&self, point: &Point2D) -> Option<[u8; 3]> {
        self.pixel_index(point).map(|(col, row)| {
            let Rgb(color) = *self.pixels.get_pixel(col, row);
            color
        })
    }
}

/// 向下取整并夹到 `[0, len-1]`，NaN 落到 0
#[inline]
fn clamp_index(coord: f64, len: u32) -> u32 {
    let max = i64::from(len) - 1;
    let idx = (coord.floor() as i64).clamp(0, max);
    idx as u32
}

#[inline]
fn to_u8(c: f32) -> u8 {
    if c.is_nan() {
        0
    } else {
        (c.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}
