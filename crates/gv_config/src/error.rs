// crates/gv_config/src/error.rs

//! 配置层错误类型

use gv_foundation::GvError;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 无效值
    #[error("无效值 '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },
}

impl ConfigError {
    /// 无效值
    pub fn invalid_value(key: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<ConfigError> for GvError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(source) => source.into(),
            other => GvError::config(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::invalid_value("fusion.max_elevation", f64::NAN, "必须为有限值");
        let msg = err.to_string();
        assert!(msg.contains("fusion.max_elevation"));
        assert!(msg.contains("NaN"));
    }

    #[test]
    fn test_conversion_to_foundation() {
        let err: GvError = ConfigError::Parse("EOF".into()).into();
        assert!(matches!(err, GvError::Config { .. }));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "scene.json");
        let err: GvError = ConfigError::Io(io).into();
        assert!(matches!(err, GvError::Io { .. }));
    }
}
