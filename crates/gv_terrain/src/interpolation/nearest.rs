// crates/gv_terrain/src/interpolation/nearest.rs

//! 最近邻重采样
//!
//! 每个目标点取欧几里得距离最近的源点的值。平方距离完全相等时
//! 取源索引最小者，因此结果与暴力搜索逐位一致，且多次调用稳定。
//! 不做外推保护：任何目标点都会得到一个值。
//!
//! # 示例
//!
//! ```
//! use gv_geo::Point2D;
//! use gv_terrain::interpolation::resample;
//!
//! let sources = [Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0)];
//! let targets = [Point2D::new(1.0, 0.0), Point2D::new(9.0, 0.0)];
//! let out = resample(&sources, &[5.0, 50.0], &targets).unwrap();
//! assert_eq!(out, vec![5.0, 50.0]);
//! ```

use crate::error::{TerrainError, TerrainResult};
use gv_geo::{Point2D, SpatialIndex};
use rayon::prelude::*;
use tracing::debug;

/// 插值器配置
#[derive(Debug, Clone, Copy)]
pub struct InterpolatorConfig {
    /// 启用并行
    pub parallel_enabled: bool,
    /// 目标点数达到该值时并行查询
    pub parallel_threshold: usize,
}

impl Default for InterpolatorConfig {
    fn default() -> Self {
        Self {
            parallel_enabled: true,
            parallel_threshold: 10_000,
        }
    }
}

impl InterpolatorConfig {
    /// 指定并行阈值
    pub fn with_parallel_threshold(threshold: usize) -> Self {
        Self {
            parallel_threshold: threshold,
            ..Self::default()
        }
    }

    #[inline]
    fn should_parallelize(&self, n_targets: usize) -> bool {
        self.parallel_enabled && n_targets >= self.parallel_threshold
    }
}

/// 最近邻插值器
///
/// 持有源点的 R-tree，可对多个目标点集重复使用。
pub struct NearestInterpolator {
    index: SpatialIndex<usize>,
    values: Vec<f64>,
    config: InterpolatorConfig,
}

impl NearestInterpolator {
    /// 使用默认配置构建
    ///
    /// # Errors
    /// 源点为空、点与值长度不等、或存在非有限坐标时返回 [`TerrainError::InvalidInput`]
    pub fn new(source_points: &[Point2D], source_values: &[f64]) -> TerrainResult<Self> {
        Self::with_config(source_points, source_values, InterpolatorConfig::default())
    }

    /// 使用指定配置构建
    ///
    /// # Errors
    /// 同 [`NearestInterpolator::new`]
    pub fn with_config(
        source_points: &[Point2D],
        source_values: &[f64],
        config: InterpolatorConfig,
    ) -> TerrainResult<Self> {
        if source_points.is_empty() {
            return Err(TerrainError::invalid_input("源点集为空"));
        }
        if source_points.len() != source_values.len() {
            return Err(TerrainError::invalid_input(format!(
                "源点数 {} 与源值数 {} 不等",
                source_points.len(),
                source_values.len()
            )));
        }
        check_finite("源点", source_points)?;

        let entries = source_points.iter().copied().zip(0..source_points.len()).collect();
        let index = SpatialIndex::bulk_load(entries);
        debug!(n_sources = source_points.len(), "最近邻索引已构建");

        Ok(Self {
            index,
            values: source_values.to_vec(),
            config,
        })
    }

    /// 源点数量
    pub fn n_sources(&self) -> usize {
        self.values.len()
    }

    /// 配置
    pub fn config(&self) -> &InterpolatorConfig {
        &self.config
    }

    /// 距离目标点最近的源索引（平局取最小索引）
    pub fn nearest_index(&self, target: &Point2D) -> Option<usize> {
        self.index
            .query_nearest_ties(target)
            .into_iter()
            .map(|(_, &idx)| idx)
            .min()
    }

    /// 把源值重采样到目标点集，输出与目标点一一对应
    ///
    /// # Errors
    /// 目标点存在非有限坐标时返回 [`TerrainError::InvalidInput`]
    pub fn resample(&self, target_points: &[Point2D]) -> TerrainResult<Vec<f64>> {
        check_finite("目标点", target_points)?;

        let lookup = |p: &Point2D| {
            self.nearest_index(p)
                .map(|idx| self.values[idx])
                .ok_or_else(|| TerrainError::invalid_input("源点集为空"))
        };

        if self.config.should_parallelize(target_points.len()) {
            debug!(n_targets = target_points.len(), "并行最近邻重采样");
            target_points.par_iter().map(lookup).collect()
        } else {
            target_points.iter().map(lookup).collect()
        }
    }
}

/// 一次性最近邻重采样
///
/// # Errors
/// 见 [`NearestInterpolator::new`] 与 [`NearestInterpolator::resample`]
pub fn resample(
    source_points: &[Point2D],
    source_values: &[f64],
    target_points: &[Point2D],
) -> TerrainResult<Vec<f64>> {
    NearestInterpolator::new(source_points, source_values)?.resample(target_points)
}

fn check_finite(label: &str, points: &[Point2D]) -> TerrainResult<()> {
    match points.iter().position(|p| !p.is_finite()) {
        Some(i) => Err(TerrainError::invalid_input(format!(
            "{label} {i} 的坐标非有限: ({}, {})",
            points[i].x, points[i].y
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(sources: &[Point2D], values: &[f64], target: &Point2D) -> f64 {
        let mut best = 0;
        for (i, p) in sources.iter().enumerate() {
            if p.distance_squared_to(target) < sources[best].distance_squared_to(target) {
                best = i;
            }
        }
        values[best]
    }

    /// 简单的线性同余序列，保证测试数据可复现
    fn pseudo_points(n: usize, seed: u64) -> Vec<Point2D> {
        let mut state = seed;
        let mut next = move || {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            ((state >> 33) % 1000) as f64
        };
        (0..n).map(|_| Point2D::new(next(), next())).collect()
    }

    #[test]
    fn test_two_source_scenario() {
        let sources = [Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0)];
        let targets = [Point2D::new(1.0, 0.0), Point2D::new(9.0, 0.0)];
        let out = resample(&sources, &[5.0, 50.0], &targets).unwrap();
        assert_eq!(out, vec![5.0, 50.0]);
    }

    #[test]
    fn test_tie_breaks_to_lowest_index() {
        // 目标点与四个源点等距
        let sources = [
            Point2D::new(1.0, 0.0),
            Point2D::new(-1.0, 0.0),
            Point2D::new(0.0, 1.0),
            Point2D::new(0.0, -1.0),
        ];
        let values = [10.0, 20.0, 30.0, 40.0];
        let interp = NearestInterpolator::new(&sources, &values).unwrap();
        for _ in 0..5 {
            assert_eq!(interp.nearest_index(&Point2D::ZERO), Some(0));
        }

        // 重复点也取最小索引
        let dup = [Point2D::new(3.0, 3.0), Point2D::new(3.0, 3.0)];
        let out = resample(&dup, &[7.0, 8.0], &[Point2D::new(3.0, 3.0)]).unwrap();
        assert_eq!(out, vec![7.0]);
    }

    #[test]
    fn test_matches_brute_force() {
        let sources = pseudo_points(200, 42);
        let values: Vec<f64> = (0u8..200).map(f64::from).collect();
        let targets = pseudo_points(300, 7);

        let interp = NearestInterpolator::new(&sources, &values).unwrap();
        let out = interp.resample(&targets).unwrap();

        assert_eq!(out.len(), targets.len());
        for (t, &v) in targets.iter().zip(&out) {
            assert_eq!(v, brute_force(&sources, &values, t));
        }
    }

    #[test]
    fn test_parallel_matches_serial() {
        let sources = pseudo_points(100, 1);
        let values: Vec<f64> = (0u8..100).map(|i| f64::from(i) * 1.5).collect();
        let targets = pseudo_points(500, 2);

        let serial = NearestInterpolator::with_config(
            &sources,
            &values,
            InterpolatorConfig {
                parallel_enabled: false,
                ..Default::default()
            },
        )
        .unwrap();
        let parallel = NearestInterpolator::with_config(
            &sources,
            &values,
            InterpolatorConfig::with_parallel_threshold(1),
        )
        .unwrap();

        assert_eq!(
            serial.resample(&targets).unwrap(),
            parallel.resample(&targets).unwrap()
        );
    }

    #[test]
    fn test_no_extrapolation_guard() {
        let sources = [Point2D::new(0.0, 0.0)];
        let out = resample(&sources, &[3.0], &[Point2D::new(1e6, -1e6)]).unwrap();
        assert_eq!(out, vec![3.0]);
    }

    #[test]
    fn test_empty_targets() {
        let sources = [Point2D::new(0.0, 0.0)];
        assert!(resample(&sources, &[1.0], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_inputs() {
        let p = [Point2D::new(0.0, 0.0)];
        assert!(matches!(
            resample(&[], &[], &p),
            Err(TerrainError::InvalidInput { .. })
        ));
        assert!(matches!(
            resample(&p, &[1.0, 2.0], &p),
            Err(TerrainError::InvalidInput { .. })
        ));
        assert!(matches!(
            resample(&[Point2D::new(f64::NAN, 0.0)], &[1.0], &p),
            Err(TerrainError::InvalidInput { .. })
        ));
        assert!(matches!(
            resample(&p, &[1.0], &[Point2D::new(0.0, f64::INFINITY)]),
            Err(TerrainError::InvalidInput { .. })
        ));
    }
}
