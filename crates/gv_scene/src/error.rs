// crates/gv_scene/src/error.rs

//! 场景层错误类型
//!
//! 所有错误都是同步失败：调用要么完整生效，要么不改变任何状态。

use gv_config::ConfigError;
use gv_foundation::GvError;
use gv_terrain::TerrainError;
use thiserror::Error;

/// 场景层结果类型
pub type SceneResult<T> = Result<T, SceneError>;

/// 场景错误
#[derive(Debug, Error)]
pub enum SceneError {
    /// 图层 id 重复
    #[error("图层已存在: {0}")]
    DuplicateId(String),

    /// 图层不存在
    #[error("图层不存在: {0}")]
    NotFound(String),

    /// 色标范围无效
    #[error("无效的色标范围 [{min}, {max}]: {reason}")]
    InvalidRange {
        /// 下界
        min: f64,
        /// 上界
        max: f64,
        /// 原因
        reason: &'static str,
    },

    /// 图层没有标量属性，不能设置色标范围
    #[error("图层没有标量属性: {0}")]
    NotColorMapped(String),

    /// 没有任何图层映射该属性
    #[error("没有图层映射属性: {0}")]
    UnknownAttribute(String),

    /// 融合错误
    #[error("融合错误: {0}")]
    Terrain(#[from] TerrainError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

impl From<SceneError> for GvError {
    fn from(err: SceneError) -> Self {
        match err {
            SceneError::DuplicateId(id) => GvError::already_exists(format!("图层 {id}")),
            SceneError::NotFound(id) => GvError::not_found(format!("图层 {id}")),
            SceneError::UnknownAttribute(name) => GvError::not_found(format!("属性 {name}")),
            err @ SceneError::InvalidRange { .. } => GvError::invalid_range(err.to_string()),
            err @ SceneError::NotColorMapped(_) => GvError::invalid_input(err.to_string()),
            SceneError::Terrain(err) => err.into(),
            SceneError::Config(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_range_display() {
        let err = SceneError::InvalidRange {
            min: 10.0,
            max: 5.0,
            reason: "下界大于上界",
        };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("下界大于上界"));
    }

    #[test]
    fn test_conversion_to_foundation() {
        let err: GvError = SceneError::DuplicateId("dem".into()).into();
        assert!(matches!(err, GvError::AlreadyExists { .. }));

        let err: GvError = SceneError::NotFound("profC".into()).into();
        assert!(matches!(err, GvError::NotFound { .. }));

        let err: GvError = SceneError::InvalidRange {
            min: f64::NAN,
            max: 1.0,
            reason: "边界必须为有限值",
        }
        .into();
        assert!(matches!(err, GvError::InvalidRange { .. }));

        let err: GvError = SceneError::from(TerrainError::invalid_input("x")).into();
        assert!(matches!(err, GvError::InvalidInput { .. }));
    }
}
