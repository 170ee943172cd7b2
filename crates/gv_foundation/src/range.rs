// crates/gv_foundation/src/range.rs

//! 数值范围工具
//!
//! 计算标量数组的有限值范围，忽略 NaN 与无穷值。

/// 计算有限值的 (最小值, 最大值)
///
/// 全部为非有限值（或数组为空）时返回 `None`。
///
/// ```
/// use gv_foundation::range::finite_range;
///
/// assert_eq!(finite_range(&[3.0, f64::NAN, -1.0]), Some((-1.0, 3.0)));
/// assert_eq!(finite_range(&[f64::NAN]), None);
/// ```
#[must_use]
pub fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// 合并两个可选范围
#[must_use]
pub fn merge_ranges(a: Option<(f64, f64)>, b: Option<(f64, f64)>) -> Option<(f64, f64)> {
    match (a, b) {
        (Some((a0, a1)), Some((b0, b1))) => Some((a0.min(b0), a1.max(b1))),
        (Some(r), None) | (None, Some(r)) => Some(r),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_range_ignores_non_finite() {
        let values = [f64::INFINITY, 2.0, f64::NAN, 7.5, f64::NEG_INFINITY];
        assert_eq!(finite_range(&values), Some((2.0, 7.5)));
    }

    #[test]
    fn test_finite_range_empty() {
        assert_eq!(finite_range(&[]), None);
    }

    #[test]
    fn test_merge_ranges() {
        assert_eq!(merge_ranges(Some((0.0, 1.0)), Some((-2.0, 0.5))), Some((-2.0, 1.0)));
        assert_eq!(merge_ranges(None, Some((3.0, 4.0))), Some((3.0, 4.0)));
        assert_eq!(merge_ranges(None, None), None);
    }
}
