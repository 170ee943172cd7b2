// crates/gv_geo/src/spatial_index.rs
//! 空间索引与外包框
//!
//! - [`BoundingBox`]: 轴对齐外包框，用于栅格覆盖范围与纹理坐标归一化
//! - [`SpatialIndex`]: 基于 R-tree 的点索引，用于最近邻重采样
//!
//! # 示例
//!
//! ```
//! use gv_geo::spatial_index::SpatialIndex;
//! use gv_geo::geometry::Point2D;
//!
//! let index = SpatialIndex::bulk_load(vec![
//!     (Point2D::new(0.0, 0.0), 0usize),
//!     (Point2D::new(10.0, 0.0), 1),
//! ]);
//! let ties = index.query_nearest_ties(&Point2D::new(1.0, 0.0));
//! assert_eq!(*ties[0].1, 0);
//! ```

use crate::geometry::Point2D;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// 边界框
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// 最小 x
    pub min_x: f64,
    /// 最小 y
    pub min_y: f64,
    /// 最大 x
    pub max_x: f64,
    /// 最大 y
    pub max_y: f64,
}

impl BoundingBox {
    /// 创建新的边界框（自动整理角点顺序）
    #[must_use]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// 合并两个边界框
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// 宽度
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// 高度
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// 把点归一化到 `[0,1] × [0,1]`，框外的点夹到边界
    ///
    /// 退化维度（宽或高为零）返回 0。
    #[must_use]
    pub fn normalize_clamped(&self, point: &Point2D) -> (f64, f64) {
        let norm = |v: f64, lo: f64, extent: f64| {
            if extent > 0.0 {
                ((v - lo) / extent).clamp(0.0, 1.0)
            } else {
                0.0
            }
        };
        (
            norm(point.x, self.min_x, self.width()),
            norm(point.y, self.min_y, self.height()),
        )
    }
}

// ============================================================================
// R-tree 包装
// ============================================================================

#[derive(Debug, Clone)]
struct SpatialEntry<T> {
    point: Point2D,
    data: T,
}

impl<T> RTreeObject for SpatialEntry<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.point.x, self.point.y])
    }
}

impl<T> PointDistance for SpatialEntry<T> {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.point.distance_squared_to(&Point2D::new(point[0], point[1]))
    }
}

/// 空间索引
///
/// 只支持批量构建：源数据在融合前一次性载入，之后只读。
pub struct SpatialIndex<T> {
    tree: RTree<SpatialEntry<T>>,
}

impl<T> SpatialIndex<T> {
    /// 从点集批量构建
    #[must_use]
    pub fn bulk_load(points: Vec<(Point2D, T)>) -> Self {
        let entries: Vec<SpatialEntry<T>> = points
            .into_iter()
            .map(|(point, data)| SpatialEntry { point, data })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// 查询与给定点距离最小的全部条目
    ///
    /// 多个条目与查询点的平方距离完全相等时全部返回（顺序不保证），
    /// 由调用方决定确定性的取舍规则。索引为空时返回空列表。
    #[must_use]
    pub fn query_nearest_ties(&self, point: &Point2D) -> Vec<(&Point2D, &T)> {
        let mut iter = self.tree.nearest_neighbor_iter(&[point.x, point.y]);
        let Some(first) = iter.next() else {
            return Vec::new();
        };
        let best = first.point.distance_squared_to(point);
        let mut ties = vec![(&first.point, &first.data)];
        ties.extend(
            iter.take_while(|entry| entry.point.distance_squared_to(point) <= best)
                .map(|entry| (&entry.point, &entry.data)),
        );
        ties
    }

    /// 返回索引中的点数量
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// 检查索引是否为空
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

// ============================================================================
// 测试
// ============================================================================
