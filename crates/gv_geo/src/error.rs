// crates/gv_geo/src/error.rs
//! 地理空间处理错误类型
//!
//! 包含 CRS 标识解析与仿射变换相关的错误。
//! 所有错误可转换为 `gv_foundation::GvError` 向上传播。

use gv_foundation::GvError;
use thiserror::Error;

/// Geo 模块结果类型
pub type GeoResult<T> = Result<T, GeoError>;

/// 地理空间处理错误
#[derive(Error, Debug)]
pub enum GeoError {
    /// CRS 定义解析失败
    #[error("CRS 定义解析失败: {definition} ({reason})")]
    CrsParseFailed {
        /// 失败的定义字符串
        definition: String,
        /// 失败原因
        reason: String,
    },

    /// 仿射变换矩阵奇异（不可逆）
    #[error("仿射变换矩阵奇异（行列式接近零）")]
    SingularTransform,
}

impl GeoError {
    /// 创建 CRS 解析失败错误
    #[inline]
    pub fn crs_parse_failed(definition: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CrsParseFailed {
            definition: definition.into(),
            reason: reason.into(),
        }
    }
}

impl From<GeoError> for GvError {
    fn from(err: GeoError) -> Self {
        match err {
            GeoError::CrsParseFailed { definition, reason } => {
                GvError::crs(format!("CRS解析失败 [{definition}]: {reason}"))
            }
            GeoError::SingularTransform => {
                GvError::invalid_input("仿射变换矩阵奇异（行列式接近零），无法求逆")
            }
        }
    }
}
