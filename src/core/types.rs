//! 路径枚举使用的基础类型
//!
//! 顶点与边在引擎中都是不透明标识，真正的文档内容由 Provider 负责解析。

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// 顶点标识（如 `persons/alice`）
///
/// 内部使用 `Arc<str>`，步骤复制时只增加引用计数。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexRef(Arc<str>);

impl VertexRef {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VertexRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for VertexRef {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

/// 边标识
///
/// 起始步骤没有入边，此时为无效边（序列化为 `null`）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeRef(Option<Arc<str>>);

impl EdgeRef {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Some(Arc::from(id.as_ref())))
    }

    /// 起始步骤使用的无效边
    pub fn invalid() -> Self {
        Self(None)
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Display for EdgeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(id) => f.write_str(id),
            None => f.write_str("<invalid>"),
        }
    }
}

impl From<&str> for EdgeRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// 唯一性级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniquenessLevel {
    /// 不做任何唯一性检查
    #[default]
    None,
    /// 同一路径内不允许重复
    Path,
    /// 整个搜索过程中只允许出现一次
    Global,
}

/// 单向枚举的遍历顺序，决定使用哪种队列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalOrder {
    /// 广度优先
    #[default]
    Bfs,
    /// 深度优先
    Dfs,
    /// 按累计权重从小到大
    Weighted,
}

/// 边方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    #[default]
    Outbound,
    Inbound,
    Any,
}

impl EdgeDirection {
    /// 反向搜索时使用的方向
    pub fn reverse(self) -> Self {
        match self {
            EdgeDirection::Outbound => EdgeDirection::Inbound,
            EdgeDirection::Inbound => EdgeDirection::Outbound,
            EdgeDirection::Any => EdgeDirection::Any,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_ref_invalid() {
        let edge = EdgeRef::invalid();
        assert!(!edge.is_valid());
        assert_eq!(edge.as_str(), None);
        assert_eq!(edge, EdgeRef::default());
        assert!(EdgeRef::new("knows/1").is_valid());
    }

    #[test]
    fn test_vertex_ref_serialization() {
        let vertex = VertexRef::new("persons/alice");
        let json = serde_json::to_string(&vertex).expect("序列化顶点失败");
        assert_eq!(json, "\"persons/alice\"");

        let edge = serde_json::to_value(EdgeRef::invalid()).expect("序列化边失败");
        assert!(edge.is_null());
    }

    #[test]
    fn test_uniqueness_level_parsing() {
        let level: UniquenessLevel = serde_json::from_str("\"global\"").expect("解析唯一性级别失败");
        assert_eq!(level, UniquenessLevel::Global);
        assert_eq!(UniquenessLevel::default(), UniquenessLevel::None);
    }

    #[test]
    fn test_direction_reverse() {
        assert_eq!(EdgeDirection::Outbound.reverse(), EdgeDirection::Inbound);
        assert_eq!(EdgeDirection::Any.reverse(), EdgeDirection::Any);
    }
}
