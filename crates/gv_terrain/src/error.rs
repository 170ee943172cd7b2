// crates/gv_terrain/src/error.rs

//! 融合层错误类型
//!
//! 覆盖重采样输入校验、数组尺寸、CRS 不一致与缺失属性。
//! 所有错误可转换为 `gv_foundation::GvError`。

use gv_foundation::GvError;
use gv_geo::GeoError;
use thiserror::Error;

/// 融合层结果类型
pub type TerrainResult<T> = Result<T, TerrainError>;

/// 融合层错误
#[derive(Error, Debug)]
pub enum TerrainError {
    /// 输入数据无效（空点集、非有限坐标等）
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 无效原因
        message: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 两个数据源声明的 CRS 不一致
    #[error("坐标参考系统不一致 [{context}]: 期望 {expected}, 实际 {actual}")]
    GeoreferenceMismatch {
        /// 发生比较的位置（如 "影像披覆"）
        context: &'static str,
        /// 参照数据源的 CRS
        expected: String,
        /// 实际数据源的 CRS
        actual: String,
    },

    /// 网格缺少指定属性
    #[error("网格缺少属性: {name}")]
    MissingAttribute {
        /// 属性名
        name: String,
    },

    /// 地理变换错误
    #[error("地理变换错误: {0}")]
    Geo(#[from] GeoError),
}

impl TerrainError {
    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// CRS 不一致
    pub fn georeference_mismatch(
        context: &'static str,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::GeoreferenceMismatch {
            context,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// 缺少属性
    pub fn missing_attribute(name: impl Into<String>) -> Self {
        Self::MissingAttribute { name: name.into() }
    }
}

impl From<TerrainError> for GvError {
    fn from(err: TerrainError) -> Self {
        match err {
            TerrainError::InvalidInput { message } => GvError::invalid_input(message),
            TerrainError::SizeMismatch {
                name,
                expected,
                actual,
            } => GvError::size_mismatch(name, expected, actual),
            err @ TerrainError::GeoreferenceMismatch { .. } => GvError::crs(err.to_string()),
            TerrainError::MissingAttribute { name } => GvError::not_found(format!("属性 {name}")),
            TerrainError::Geo(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_georeference_mismatch_display() {
        let err = TerrainError::georeference_mismatch("影像披覆", "EPSG:2154", "EPSG:4326");
        let msg = err.to_string();
        assert!(msg.contains("EPSG:2154"));
        assert!(msg.contains("EPSG:4326"));
        assert!(msg.contains("影像披覆"));
    }

    #[test]
    fn test_conversion_to_foundation() {
        let err: GvError = TerrainError::invalid_input("源点集为空").into();
        assert!(matches!(err, GvError::InvalidInput { .. }));

        let err: GvError = TerrainError::georeference_mismatch("x", "a", "b").into();
        assert!(matches!(err, GvError::Crs(_)));

        let err: GvError = TerrainError::Geo(GeoError::SingularTransform).into();
        assert!(matches!(err, GvError::InvalidInput { .. }));
    }
}
