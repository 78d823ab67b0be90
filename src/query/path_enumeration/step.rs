//! 遍历步骤
//!
//! 步骤是遍历前沿上的一个节点：到达的顶点、到达它所用的边、前驱步骤在路径存储中的下标、
//! 深度和累计权重。步骤追加到路径存储之后除获取状态外不再改变。

use std::fmt::Debug;

use crate::core::{EdgeRef, VertexRef};

/// 获取状态
///
/// 只会单调推进：顶点与边的获取状态合并后不会回退。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FetchStatus {
    #[default]
    Unfetched,
    VertexFetched,
    EdgesFetched,
    VertexAndEdgesFetched,
}

impl FetchStatus {
    fn bits(self) -> u8 {
        match self {
            FetchStatus::Unfetched => 0b00,
            FetchStatus::VertexFetched => 0b01,
            FetchStatus::EdgesFetched => 0b10,
            FetchStatus::VertexAndEdgesFetched => 0b11,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => FetchStatus::Unfetched,
            0b01 => FetchStatus::VertexFetched,
            0b10 => FetchStatus::EdgesFetched,
            _ => FetchStatus::VertexAndEdgesFetched,
        }
    }

    /// 合并两个状态，结果不会比任一输入更"少"
    pub fn merge(self, other: FetchStatus) -> FetchStatus {
        Self::from_bits(self.bits() | other.bits())
    }

    pub fn is_fully_fetched(self) -> bool {
        self == FetchStatus::VertexAndEdgesFetched
    }
}

/// 所有步骤变体共享的字段
#[derive(Debug, Clone, PartialEq)]
pub struct BaseStep {
    previous: Option<usize>,
    depth: usize,
    weight: f64,
}

impl BaseStep {
    /// 根步骤
    pub fn root(depth: usize, weight: f64) -> Self {
        Self {
            previous: None,
            depth,
            weight,
        }
    }

    pub fn with_previous(previous: usize, depth: usize, weight: f64) -> Self {
        Self {
            previous: Some(previous),
            depth,
            weight,
        }
    }

    pub fn previous(&self) -> Option<usize> {
        self.previous
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_first(&self) -> bool {
        self.previous.is_none()
    }
}

/// 步骤契约
///
/// 单向与双向搜索的步骤变体都实现此 trait，引擎只通过它访问步骤。
pub trait Step: Clone + Debug + Send + Sync + 'static {
    fn base(&self) -> &BaseStep;

    fn vertex(&self) -> &VertexRef;

    /// 到达此步骤所用的边，根步骤为无效边
    fn edge(&self) -> &EdgeRef;

    fn fetch_status(&self) -> FetchStatus;

    /// 推进获取状态
    fn mark_fetched(&mut self, status: FetchStatus);

    fn previous(&self) -> Option<usize> {
        self.base().previous()
    }

    fn depth(&self) -> usize {
        self.base().depth()
    }

    fn weight(&self) -> f64 {
        self.base().weight()
    }

    fn is_first(&self) -> bool {
        self.base().is_first()
    }

    /// 松散端：尚未完全获取，不能展开
    fn is_loose_end(&self) -> bool {
        !self.fetch_status().is_fully_fetched()
    }

    fn is_processable(&self) -> bool {
        !self.is_loose_end()
    }
}

/// Provider 产出的标准步骤
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderStep {
    vertex: VertexRef,
    edge: EdgeRef,
    base: BaseStep,
    fetch_status: FetchStatus,
}

impl ProviderStep {
    pub fn start(vertex: VertexRef, depth: usize, weight: f64) -> Self {
        Self {
            vertex,
            edge: EdgeRef::invalid(),
            base: BaseStep::root(depth, weight),
            fetch_status: FetchStatus::Unfetched,
        }
    }

    pub fn next(vertex: VertexRef, edge: EdgeRef, previous: usize, depth: usize, weight: f64) -> Self {
        Self {
            vertex,
            edge,
            base: BaseStep::with_previous(previous, depth, weight),
            fetch_status: FetchStatus::Unfetched,
        }
    }

    /// 本地已有数据时可直接构造为已获取状态
    pub fn with_fetch_status(mut self, status: FetchStatus) -> Self {
        self.fetch_status = status;
        self
    }
}

impl Step for ProviderStep {
    fn base(&self) -> &BaseStep {
        &self.base
    }

    fn vertex(&self) -> &VertexRef {
        &self.vertex
    }

    fn edge(&self) -> &EdgeRef {
        &self.edge
    }

    fn fetch_status(&self) -> FetchStatus {
        self.fetch_status
    }

    fn mark_fetched(&mut self, status: FetchStatus) {
        self.fetch_status = self.fetch_status.merge(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_status_is_monotonic() {
        let mut step = ProviderStep::start(VertexRef::new("v/0"), 0, 0.0);
        assert!(step.is_loose_end());

        step.mark_fetched(FetchStatus::VertexFetched);
        assert_eq!(step.fetch_status(), FetchStatus::VertexFetched);

        step.mark_fetched(FetchStatus::EdgesFetched);
        assert_eq!(step.fetch_status(), FetchStatus::VertexAndEdgesFetched);

        step.mark_fetched(FetchStatus::Unfetched);
        assert!(step.is_processable());
    }

    #[test]
    fn test_root_and_successor() {
        let root = ProviderStep::start(VertexRef::new("v/0"), 0, 1.5);
        assert!(root.is_first());
        assert!(!root.edge().is_valid());
        assert_eq!(root.weight(), 1.5);

        let next = ProviderStep::next(VertexRef::new("v/1"), EdgeRef::new("e/0"), 0, 1, 2.5);
        assert!(!next.is_first());
        assert_eq!(next.previous(), Some(0));
        assert_eq!(next.depth(), 1);
    }
}
