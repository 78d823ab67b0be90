//! 内存图 Provider
//!
//! `MockGraph` 保存顶点文档和边文档（`{"_id", "_from", "_to", ...}`），
//! `MockGraphProvider` 在其上模拟远程获取：每次 `fetch` 计为一次往返，
//! 已获取顶点的邻接表缓存在本地。用于测试和嵌入式场景。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::core::{EdgeDirection, EdgeRef, TraversalError, TraversalResult, VertexRef};
use crate::query::path_enumeration::provider::Provider;
use crate::query::path_enumeration::stats::TraversalStats;
use crate::query::path_enumeration::step::{FetchStatus, ProviderStep, Step};

/// 内存图
#[derive(Debug, Clone, Default)]
pub struct MockGraph {
    vertices: HashMap<VertexRef, JsonValue>,
    edges: Vec<JsonValue>,
    edge_index: HashMap<String, usize>,
    outbound: HashMap<String, Vec<usize>>,
    inbound: HashMap<String, Vec<usize>>,
}

impl MockGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 `{"vertices": [...], "edges": [...]}` 构造
    ///
    /// 顶点可以是字符串标识或带 `_id` 的文档。
    pub fn from_json(value: &JsonValue) -> TraversalResult<Self> {
        let mut graph = Self::new();
        if let Some(vertices) = value.get("vertices").and_then(JsonValue::as_array) {
            for vertex in vertices {
                match vertex {
                    JsonValue::String(id) => graph.add_vertex(id),
                    doc => graph.add_vertex_document(doc.clone())?,
                }
            }
        }
        if let Some(edges) = value.get("edges").and_then(JsonValue::as_array) {
            for edge in edges {
                graph.add_edge_document(edge.clone())?;
            }
        }
        Ok(graph)
    }

    pub fn add_vertex(&mut self, id: &str) {
        self.vertices
            .insert(VertexRef::new(id), json!({ "_id": id }));
    }

    pub fn add_vertex_document(&mut self, doc: JsonValue) -> TraversalResult<()> {
        let id = doc
            .get("_id")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| TraversalError::Config(format!("顶点文档缺少 _id: {}", doc)))?
            .to_string();
        self.vertices.insert(VertexRef::new(id), doc);
        Ok(())
    }

    /// 添加一条边，边标识按插入顺序生成
    pub fn add_edge(&mut self, from: &str, to: &str) -> EdgeRef {
        let id = format!("edges/{}", self.edges.len());
        self.insert_edge(json!({ "_id": id, "_from": from, "_to": to }));
        EdgeRef::new(id)
    }

    pub fn add_weighted_edge(&mut self, from: &str, to: &str, weight: f64) -> EdgeRef {
        let id = format!("edges/{}", self.edges.len());
        self.insert_edge(json!({ "_id": id, "_from": from, "_to": to, "weight": weight }));
        EdgeRef::new(id)
    }

    /// 原样添加边文档，`_from`/`_to` 损坏的边仍会被保存，展开时才会被发现
    pub fn add_edge_document(&mut self, doc: JsonValue) -> TraversalResult<()> {
        if doc.get("_id").and_then(JsonValue::as_str).is_none() {
            return Err(TraversalError::InvalidEdge(format!("边文档缺少 _id: {}", doc)));
        }
        self.insert_edge(doc);
        Ok(())
    }

    fn insert_edge(&mut self, doc: JsonValue) {
        let position = self.edges.len();
        if let Some(id) = doc.get("_id").and_then(JsonValue::as_str) {
            self.edge_index.insert(id.to_string(), position);
        }
        if let Some(from) = doc.get("_from").and_then(JsonValue::as_str) {
            self.outbound.entry(from.to_string()).or_default().push(position);
        }
        if let Some(to) = doc.get("_to").and_then(JsonValue::as_str) {
            self.inbound.entry(to.to_string()).or_default().push(position);
        }
        self.edges.push(doc);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex(&self, vertex: &VertexRef) -> Option<&JsonValue> {
        self.vertices.get(vertex)
    }

    pub fn edge(&self, id: &str) -> Option<&JsonValue> {
        self.edge_index.get(id).map(|&position| &self.edges[position])
    }

    /// 与顶点相连的边文档
    fn lookup(&self, index: &HashMap<String, Vec<usize>>, vertex: &VertexRef) -> Vec<&JsonValue> {
        index
            .get(vertex.as_str())
            .map(|positions| positions.iter().map(|&p| &self.edges[p]).collect())
            .unwrap_or_default()
    }

    fn edges_of(&self, vertex: &VertexRef, direction: EdgeDirection) -> Vec<&JsonValue> {
        match direction {
            EdgeDirection::Outbound => self.lookup(&self.outbound, vertex),
            EdgeDirection::Inbound => self.lookup(&self.inbound, vertex),
            EdgeDirection::Any => {
                let mut edges = self.lookup(&self.outbound, vertex);
                // 自环边在两个索引中都出现，只保留一次
                edges.extend(self.lookup(&self.inbound, vertex).into_iter().filter(|doc| {
                    doc.get("_from").and_then(JsonValue::as_str) != Some(vertex.as_str())
                }));
                edges
            }
        }
    }
}

/// 内存图 Provider 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockProviderOptions {
    pub direction: EdgeDirection,
    /// 读取边权重的属性名，为空表示非加权遍历
    pub weight_attribute: Option<String>,
    /// 边缺少权重属性时使用的权重
    pub default_weight: f64,
}

impl Default for MockProviderOptions {
    fn default() -> Self {
        Self {
            direction: EdgeDirection::Outbound,
            weight_attribute: None,
            default_weight: 1.0,
        }
    }
}

impl MockProviderOptions {
    pub fn new(direction: EdgeDirection) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn with_weight_attribute(mut self, attribute: impl Into<String>, default_weight: f64) -> Self {
        self.weight_attribute = Some(attribute.into());
        self.default_weight = default_weight;
        self
    }
}

/// 已获取的邻接项
#[derive(Debug, Clone)]
struct NeighbourEntry {
    edge: EdgeRef,
    neighbour: VertexRef,
    weight: f64,
}

/// 基于 `MockGraph` 的 Provider
#[derive(Debug)]
pub struct MockGraphProvider {
    graph: Arc<MockGraph>,
    options: MockProviderOptions,
    adjacency: HashMap<VertexRef, Vec<NeighbourEntry>>,
    cursor_open: bool,
    pending_failures: usize,
    stats: TraversalStats,
}

impl MockGraphProvider {
    pub fn new(graph: Arc<MockGraph>, options: MockProviderOptions) -> Self {
        Self {
            graph,
            options,
            adjacency: HashMap::new(),
            cursor_open: false,
            pending_failures: 0,
            stats: TraversalStats::new(),
        }
    }

    pub fn options(&self) -> &MockProviderOptions {
        &self.options
    }

    /// 反方向的 Provider，供双向搜索的后向一侧使用
    pub fn reversed(&self) -> Self {
        let mut options = self.options.clone();
        options.direction = options.direction.reverse();
        Self::new(self.graph.clone(), options)
    }

    /// 之后的 `count` 次获取调用失败
    pub fn inject_fetch_failures(&mut self, count: usize) {
        self.pending_failures = count;
    }

    pub fn is_cursor_open(&self) -> bool {
        self.cursor_open
    }

    pub fn cached_vertices(&self) -> usize {
        self.adjacency.len()
    }

    fn parse_edge(&self, doc: &JsonValue, vertex: &VertexRef) -> TraversalResult<NeighbourEntry> {
        let id = doc
            .get("_id")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| TraversalError::InvalidEdge(format!("缺少 _id: {}", doc)))?;
        let from = doc
            .get("_from")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| TraversalError::InvalidEdge(format!("{} 的 _from 无法解析", id)))?;
        let to = doc
            .get("_to")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| TraversalError::InvalidEdge(format!("{} 的 _to 无法解析", id)))?;

        let neighbour = match self.options.direction {
            EdgeDirection::Outbound => to,
            EdgeDirection::Inbound => from,
            EdgeDirection::Any => {
                if from == vertex.as_str() {
                    to
                } else {
                    from
                }
            }
        };

        let weight = match &self.options.weight_attribute {
            Some(attribute) => doc
                .get(attribute)
                .and_then(JsonValue::as_f64)
                .unwrap_or(self.options.default_weight),
            None => 0.0,
        };

        Ok(NeighbourEntry {
            edge: EdgeRef::new(id),
            neighbour: VertexRef::new(neighbour),
            weight,
        })
    }

    /// 读取顶点的邻接表到缓存
    fn load_adjacency(&mut self, vertex: &VertexRef) {
        if self.adjacency.contains_key(vertex) {
            self.stats.incr_cache_hits();
            return;
        }
        self.stats.incr_cache_misses();

        if self.cursor_open {
            self.stats.incr_cursors_rearmed();
        } else {
            self.stats.incr_cursors_created();
            self.cursor_open = true;
        }

        let graph = self.graph.clone();
        let docs = graph.edges_of(vertex, self.options.direction);
        let mut neighbours = Vec::with_capacity(docs.len());
        for doc in docs {
            self.stats.add_scanned_index(1);
            match self.parse_edge(doc, vertex) {
                Ok(entry) => neighbours.push(entry),
                Err(e) => log::warn!("跳过顶点 {} 的无效边: {}", vertex, e),
            }
        }
        self.adjacency.insert(vertex.clone(), neighbours);
    }
}

#[async_trait]
impl Provider for MockGraphProvider {
    type Step = ProviderStep;

    fn start_vertex(&mut self, vertex: &VertexRef, depth: usize, weight: f64) -> ProviderStep {
        let step = ProviderStep::start(vertex.clone(), depth, weight);
        if self.adjacency.contains_key(vertex) {
            step.with_fetch_status(FetchStatus::VertexAndEdgesFetched)
        } else {
            step
        }
    }

    async fn fetch(&mut self, loose_ends: Vec<&mut ProviderStep>) -> TraversalResult<()> {
        if loose_ends.iter().all(|step| step.is_processable()) {
            return Ok(());
        }

        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            return Err(TraversalError::FetchFailed(format!(
                "获取 {} 个松散端时连接中断",
                loose_ends.len()
            )));
        }

        self.stats.incr_http_requests(1);
        log::debug!("批量获取 {} 个松散端", loose_ends.len());

        for step in loose_ends {
            if step.is_processable() {
                continue;
            }
            let vertex = step.vertex().clone();
            self.load_adjacency(&vertex);
            step.mark_fetched(FetchStatus::VertexAndEdgesFetched);
        }
        Ok(())
    }

    fn expand(&mut self, step: &ProviderStep, previous: usize) -> TraversalResult<Vec<ProviderStep>> {
        assert!(step.is_processable(), "不能展开未获取的步骤: {}", step.vertex());

        if !self.adjacency.contains_key(step.vertex()) {
            // 缓存已被 clear，重新从本地读取
            log::debug!("顶点 {} 的邻接缓存缺失，重新读取", step.vertex());
            self.load_adjacency(step.vertex());
        }

        let depth = step.depth() + 1;
        let children = self
            .adjacency
            .get(step.vertex())
            .map(|neighbours| {
                neighbours
                    .iter()
                    .map(|entry| {
                        ProviderStep::next(
                            entry.neighbour.clone(),
                            entry.edge.clone(),
                            previous,
                            depth,
                            step.weight() + entry.weight,
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(children)
    }

    fn clear(&mut self) {
        self.adjacency.clear();
    }

    fn destroy_engines(&mut self) {
        if self.cursor_open {
            log::debug!("释放内存图游标");
        }
        self.cursor_open = false;
    }

    fn steal_stats(&mut self) -> TraversalStats {
        self.stats.steal()
    }

    fn vertex_document(&self, vertex: &VertexRef) -> JsonValue {
        self.graph.vertex(vertex).cloned().unwrap_or(JsonValue::Null)
    }

    fn edge_document(&self, edge: &EdgeRef) -> JsonValue {
        edge.as_str()
            .and_then(|id| self.graph.edge(id))
            .cloned()
            .unwrap_or(JsonValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Arc<MockGraph> {
        let mut graph = MockGraph::new();
        for id in ["v/a", "v/b", "v/c"] {
            graph.add_vertex(id);
        }
        graph.add_weighted_edge("v/a", "v/b", 2.0);
        graph.add_edge("v/b", "v/c");
        graph.add_edge("v/c", "v/a");
        Arc::new(graph)
    }

    fn neighbours(steps: &[ProviderStep]) -> Vec<&str> {
        steps.iter().map(|s| s.vertex().as_str()).collect()
    }

    #[tokio::test]
    async fn test_fetch_then_expand() {
        let mut provider = MockGraphProvider::new(triangle(), MockProviderOptions::default());
        let mut start = provider.start_vertex(&VertexRef::new("v/a"), 0, 0.0);
        assert!(start.is_loose_end());

        provider.fetch(vec![&mut start]).await.expect("获取失败");
        assert!(start.is_processable());

        let children = provider.expand(&start, 0).expect("展开失败");
        assert_eq!(neighbours(&children), vec!["v/b"]);
        assert_eq!(children[0].previous(), Some(0));
        assert_eq!(children[0].depth(), 1);
        assert_eq!(children[0].weight(), 0.0);

        let stats = provider.steal_stats();
        assert_eq!(stats.http_requests, 1);
        assert_eq!(stats.cursors_created, 1);
        assert_eq!(provider.steal_stats(), TraversalStats::default());
    }

    #[tokio::test]
    async fn test_fetch_is_idempotent() {
        let mut provider = MockGraphProvider::new(triangle(), MockProviderOptions::default());
        let mut start = provider.start_vertex(&VertexRef::new("v/a"), 0, 0.0);
        provider.fetch(vec![&mut start]).await.expect("获取失败");
        provider.fetch(vec![&mut start]).await.expect("获取失败");
        assert_eq!(provider.steal_stats().http_requests, 1);

        // 已缓存的顶点直接构造为已获取状态
        let again = provider.start_vertex(&VertexRef::new("v/a"), 0, 0.0);
        assert!(again.is_processable());
    }

    #[tokio::test]
    async fn test_inbound_and_any_direction() {
        let graph = triangle();
        let mut inbound = MockGraphProvider::new(graph.clone(), MockProviderOptions::new(EdgeDirection::Inbound));
        let mut step = inbound.start_vertex(&VertexRef::new("v/a"), 0, 0.0);
        inbound.fetch(vec![&mut step]).await.expect("获取失败");
        assert_eq!(neighbours(&inbound.expand(&step, 0).expect("展开失败")), vec!["v/c"]);

        let mut any = MockGraphProvider::new(graph, MockProviderOptions::new(EdgeDirection::Any));
        let mut step = any.start_vertex(&VertexRef::new("v/a"), 0, 0.0);
        any.fetch(vec![&mut step]).await.expect("获取失败");
        assert_eq!(neighbours(&any.expand(&step, 0).expect("展开失败")), vec!["v/b", "v/c"]);
    }

    #[tokio::test]
    async fn test_weight_attribute() {
        let options = MockProviderOptions::default().with_weight_attribute("weight", 1.0);
        let mut provider = MockGraphProvider::new(triangle(), options);
        let mut start = provider.start_vertex(&VertexRef::new("v/a"), 0, 0.5);
        provider.fetch(vec![&mut start]).await.expect("获取失败");
        let children = provider.expand(&start, 0).expect("展开失败");
        assert_eq!(children[0].weight(), 2.5);
    }

    #[tokio::test]
    async fn test_injected_failure_keeps_step_loose() {
        let mut provider = MockGraphProvider::new(triangle(), MockProviderOptions::default());
        provider.inject_fetch_failures(1);

        let mut start = provider.start_vertex(&VertexRef::new("v/a"), 0, 0.0);
        let result = provider.fetch(vec![&mut start]).await;
        assert!(matches!(result, Err(TraversalError::FetchFailed(_))));
        assert!(start.is_loose_end());

        provider.fetch(vec![&mut start]).await.expect("重试获取失败");
        assert!(start.is_processable());
    }

    #[tokio::test]
    async fn test_invalid_edges_are_skipped() {
        let mut graph = MockGraph::new();
        graph.add_vertex("v/a");
        graph.add_vertex("v/b");
        graph.add_edge("v/a", "v/b");
        graph
            .add_edge_document(json!({ "_id": "edges/broken", "_from": "v/a", "_to": 42 }))
            .expect("添加边文档失败");

        let mut provider = MockGraphProvider::new(Arc::new(graph), MockProviderOptions::default());
        let mut start = provider.start_vertex(&VertexRef::new("v/a"), 0, 0.0);
        provider.fetch(vec![&mut start]).await.expect("获取失败");
        let children = provider.expand(&start, 0).expect("展开失败");
        assert_eq!(neighbours(&children), vec!["v/b"]);
        assert_eq!(provider.steal_stats().scanned_index, 2);
    }

    #[test]
    fn test_graph_from_json() {
        let graph = MockGraph::from_json(&json!({
            "vertices": ["v/a", { "_id": "v/b", "name": "bob" }],
            "edges": [{ "_id": "e/1", "_from": "v/a", "_to": "v/b" }]
        }))
        .expect("构造内存图失败");
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.vertex(&VertexRef::new("v/b")).expect("顶点应存在")["name"], "bob");

        let missing_id = MockGraph::from_json(&json!({ "edges": [{ "_from": "v/a" }] }));
        assert!(matches!(missing_id, Err(TraversalError::InvalidEdge(_))));
    }

    #[test]
    fn test_documents_for_serialization() {
        let provider = MockGraphProvider::new(triangle(), MockProviderOptions::default());
        assert_eq!(provider.vertex_document(&VertexRef::new("v/a"))["_id"], "v/a");
        assert!(provider.vertex_document(&VertexRef::new("v/missing")).is_null());
        assert_eq!(provider.edge_document(&EdgeRef::new("edges/0"))["weight"], 2.0);
        assert!(provider.edge_document(&EdgeRef::invalid()).is_null());
    }

    #[test]
    fn test_clear_and_destroy_engines() {
        let mut provider = MockGraphProvider::new(triangle(), MockProviderOptions::default());
        let mut start = provider.start_vertex(&VertexRef::new("v/a"), 0, 0.0);
        tokio_test::block_on(provider.fetch(vec![&mut start])).expect("获取失败");
        assert_eq!(provider.cached_vertices(), 1);
        assert!(provider.is_cursor_open());

        provider.clear();
        provider.destroy_engines();
        assert_eq!(provider.cached_vertices(), 0);
        assert!(!provider.is_cursor_open());
        provider.destroy_engines();
    }
}
