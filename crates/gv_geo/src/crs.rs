// crates/gv_geo/src/crs.rs
//! 坐标参考系统 (CRS) 标识
//!
//! 支持 EPSG 代码、PROJ4 字符串和 WKT 格式。融合流程不做投影转换，
//! 只比较各数据源声明的 CRS 标识是否一致。
//!
//! # 示例
//!
//! ```
//! use gv_geo::crs::CrsDefinition;
//!
//! let lambert = CrsDefinition::parse("EPSG:2154").unwrap();
//! assert_eq!(lambert.epsg_code(), Some(2154));
//!
//! let wkt = CrsDefinition::Wkt(r#"PROJCS["RGF93 / Lambert-93",AUTHORITY["EPSG","2154"]]"#.into());
//! assert!(lambert.same_reference(&wkt));
//! ```

use crate::error::{GeoError, GeoResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CRS 定义类型
// ============================================================================

/// CRS 定义类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrsDefinition {
    /// EPSG 代码（如 2154 = RGF93 / Lambert-93）
    Epsg(u32),
    /// PROJ4 字符串
    Proj4(String),
    /// WKT 格式
    Wkt(String),
}

impl CrsDefinition {
    /// 从定义字符串解析
    ///
    /// `EPSG:xxxx` 解析为 [`CrsDefinition::Epsg`]，`+proj=` 开头视为 PROJ4，
    /// 其余非空字符串视为 WKT。
    ///
    /// # Errors
    /// 空字符串或 EPSG 代码无法解析时返回 [`GeoError::CrsParseFailed`]
    pub fn parse(definition: &str) -> GeoResult<Self> {
        let trimmed = definition.trim();
        if trimmed.is_empty() {
            return Err(GeoError::crs_parse_failed(definition, "定义为空"));
        }

        let upper = trimmed.to_ascii_uppercase();
        if let Some(suffix) = upper.strip_prefix("EPSG:") {
            return suffix
                .trim()
                .parse()
                .map(CrsDefinition::Epsg)
                .map_err(|_| GeoError::crs_parse_failed(definition, "EPSG 代码不是整数"));
        }

        if trimmed.starts_with("+proj=") {
            Ok(CrsDefinition::Proj4(trimmed.to_string()))
        } else {
            Ok(CrsDefinition::Wkt(trimmed.to_string()))
        }
    }

    /// 转换为 PROJ 兼容的字符串
    #[must_use]
    pub fn to_proj_string(&self) -> String {
        match self {
            CrsDefinition::Epsg(code) => format!("EPSG:{code}"),
            CrsDefinition::Proj4(s) | CrsDefinition::Wkt(s) => s.clone(),
        }
    }

    /// RGF93 / Lambert-93 (EPSG:2154)
    #[must_use]
    pub fn lambert93() -> Self {
        CrsDefinition::Epsg(2154)
    }

    /// WGS84 地理坐标系
    #[must_use]
    pub fn wgs84() -> Self {
        CrsDefinition::Epsg(4326)
    }

    /// 获取 EPSG 代码（如果有）
    #[must_use]
    pub fn epsg_code(&self) -> Option<u32> {
        match self {
            CrsDefinition::Epsg(code) => Some(*code),
            CrsDefinition::Proj4(s) | CrsDefinition::Wkt(s) => Self::parse_epsg(s),
        }
    }

    /// 是否与另一个定义指向同一参考系
    ///
    /// 两者都能解析出 EPSG 代码时比较代码，否则比较规范化后的定义字符串
    /// （去除首尾空白、折叠内部空白、忽略大小写）。不做任何启发式等价推断。
    #[must_use]
    pub fn same_reference(&self, other: &Self) -> bool {
        match (self.epsg_code(), other.epsg_code()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.normalized() == other.normalized(),
            _ => false,
        }
    }

    fn normalized(&self) -> String {
        self.to_proj_string()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// 从字符串解析 EPSG 代码
    fn parse_epsg(s: &str) -> Option<u32> {
        // "EPSG:xxxx"
        if let Some(suffix) = s.trim().strip_prefix("EPSG:") {
            return suffix.trim().parse().ok();
        }
        // WKT1 的 AUTHORITY["EPSG","xxxx"]，取最后一个（最外层 CRS 的标识在末尾）
        if let Some(pos) = s.rfind("AUTHORITY[\"EPSG\",\"") {
            let start = pos + 18;
            if let Some(end) = s[start..].find("\"]") {
                return s[start..start + end].parse().ok();
            }
        }
        // WKT2 的 ID["EPSG",xxxx]
        if let Some(pos) = s.rfind("ID[\"EPSG\",") {
            let start = pos + 10;
            if let Some(end) = s[start..].find(']') {
                return s[start..start + end].trim().parse().ok();
            }
        }
        None
    }
}

impl fmt::Display for CrsDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_proj_string())
    }
}

impl FromStr for CrsDefinition {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsg_parsing() {
        let def = CrsDefinition::parse("EPSG:2154").unwrap();
        assert_eq!(def, CrsDefinition::Epsg(2154));
        assert_eq!(def.to_proj_string(), "EPSG:2154");

        let lower = CrsDefinition::parse("epsg: 4326").unwrap();
        assert_eq!(lower.epsg_code(), Some(4326));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(CrsDefinition::parse("   ").is_err());
        assert!(CrsDefinition::parse("EPSG:abc").is_err());
    }

    #[test]
    fn test_parse_proj4() {
        let def = CrsDefinition::parse("+proj=utm +zone=31 +datum=WGS84").unwrap();
        assert!(matches!(def, CrsDefinition::Proj4(_)));
        assert_eq!(def.epsg_code(), None);
    }

    #[test]
    fn test_parse_wkt_epsg() {
        let wkt = r#"GEOGCS["WGS 84",AUTHORITY["EPSG","4326"]]"#;
        assert_eq!(CrsDefinition::parse_epsg(wkt), Some(4326));

        let wkt2 = r#"PROJCRS["RGF93 v1 / Lambert-93",ID["EPSG",2154]]"#;
        assert_eq!(CrsDefinition::parse_epsg(wkt2), Some(2154));
    }

    #[test]
    fn test_same_reference_by_code() {
        let a = CrsDefinition::lambert93();
        let b = CrsDefinition::Wkt(r#"PROJCS["Lambert-93",AUTHORITY["EPSG","2154"]]"#.into());
        let c = CrsDefinition::wgs84();
        assert!(a.same_reference(&b));
        assert!(!a.same_reference(&c));
    }

    #[test]
    fn test_same_reference_by_string() {
        let a = CrsDefinition::Proj4("+proj=utm  +zone=31 +datum=WGS84".into());
        let b = CrsDefinition::Proj4("+proj=utm +zone=31 +datum=wgs84 ".into());
        let c = CrsDefinition::Proj4("+proj=utm +zone=32 +datum=WGS84".into());
        assert!(a.same_reference(&b));
        assert!(!a.same_reference(&c));
        // 一侧有代码、一侧没有：不推断等价
        assert!(!a.same_reference(&CrsDefinition::Epsg(32631)));
    }

    #[test]
    fn test_display_and_from_str() {
        let def: CrsDefinition = "EPSG:32631".parse().unwrap();
        assert_eq!(def.to_string(), "EPSG:32631");
    }
}
