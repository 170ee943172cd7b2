// crates/gv_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `GvError` 枚举和 `GvResult` 类型别名。各子 crate 定义自己的错误类型
//! （`GeoError`、`TerrainError`、`SceneError`、`ConfigError`），并可转换为
//! `GvError` 向宿主层传播。
//!
//! # 示例
//!
//! ```
//! use gv_foundation::error::{GvError, GvResult};
//!
//! fn load() -> GvResult<()> {
//!     Err(GvError::invalid_input("源点集为空"))
//! }
//! assert!(load().is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type GvResult<T> = Result<T, GvError>;

/// GeoViz 错误类型
///
/// 所有错误都是同步、本地的失败，由编程或数据错误引起，不做自动重试。
#[derive(Error, Debug)]
pub enum GvError {
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
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

    /// 坐标系错误
    #[error("坐标系错误: {0}")]
    Crs(String),

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 资源未找到
    #[error("资源未找到: {resource}")]
    NotFound {
        /// 资源名称
        resource: String,
    },

    /// 资源已存在
    #[error("资源已存在: {resource}")]
    AlreadyExists {
        /// 资源名称
        resource: String,
    },

    /// 数值范围无效
    #[error("无效的数值范围: {message}")]
    InvalidRange {
        /// 具体错误信息
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl GvError {
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

    /// 坐标系错误
    pub fn crs(message: impl Into<String>) -> Self {
        Self::Crs(message.into())
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 资源未找到
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// 资源已存在
    pub fn already_exists(resource: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource: resource.into(),
        }
    }

    /// 数值范围无效
    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::InvalidRange {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for GvError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GvError::config("测试配置错误");
        assert!(err.to_string().contains("配置错误"));
    }

    #[test]
    fn test_size_mismatch_display() {
        let err = GvError::size_mismatch("source values", 4, 3);
        let msg = err.to_string();
        assert!(msg.contains("source values"));
        assert!(msg.contains('4'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: GvError = io_err.into();
        assert!(matches!(err, GvError::Io { source: Some(_), .. }));
    }
}
