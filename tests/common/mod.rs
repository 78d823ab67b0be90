//! 集成测试共享工具模块
//!
//! 提供内存图夹具和枚举辅助函数，供所有集成测试使用

#![allow(dead_code)]

use std::sync::Arc;

use graphdb_traversal::core::EdgeDirection;
use graphdb_traversal::query::path_enumeration::{
    MockGraph, MockGraphProvider, MockProviderOptions, PathEnumerator,
};
use serde_json::json;

/// 链 v/0 -> v/1 -> ... -> v/n
pub fn chain_graph(n: usize) -> Arc<MockGraph> {
    let mut graph = MockGraph::new();
    for i in 0..=n {
        graph.add_vertex(&format!("v/{}", i));
    }
    for i in 0..n {
        graph.add_edge(&format!("v/{}", i), &format!("v/{}", i + 1));
    }
    Arc::new(graph)
}

/// a -> b -> d, a -> c -> d
pub fn diamond_graph() -> Arc<MockGraph> {
    let mut graph = MockGraph::new();
    graph.add_edge("v/a", "v/b");
    graph.add_edge("v/a", "v/c");
    graph.add_edge("v/b", "v/d");
    graph.add_edge("v/c", "v/d");
    Arc::new(graph)
}

/// a -> b -> c -> a 构成环，另有 c -> d
pub fn cyclic_graph() -> Arc<MockGraph> {
    let mut graph = MockGraph::new();
    graph.add_edge("v/a", "v/b");
    graph.add_edge("v/b", "v/c");
    graph.add_edge("v/c", "v/a");
    graph.add_edge("v/c", "v/d");
    Arc::new(graph)
}

/// s 经 a、b 两条分支汇合到 m，再到 t
pub fn converging_graph() -> Arc<MockGraph> {
    let mut graph = MockGraph::new();
    graph.add_edge("v/s", "v/a");
    graph.add_edge("v/s", "v/b");
    graph.add_edge("v/a", "v/m");
    graph.add_edge("v/b", "v/m");
    graph.add_edge("v/m", "v/t");
    Arc::new(graph)
}

/// 带文档和权重的小型社交图
pub fn social_graph() -> Arc<MockGraph> {
    let graph = MockGraph::from_json(&json!({
        "vertices": [
            { "_id": "persons/alice", "name": "Alice" },
            { "_id": "persons/bob", "name": "Bob" },
            { "_id": "persons/carol", "name": "Carol" },
            { "_id": "persons/dave", "name": "Dave" }
        ],
        "edges": [
            { "_id": "knows/1", "_from": "persons/alice", "_to": "persons/bob", "weight": 2.0 },
            { "_id": "knows/2", "_from": "persons/bob", "_to": "persons/carol", "weight": 1.5 },
            { "_id": "knows/3", "_from": "persons/alice", "_to": "persons/carol", "weight": 5.0 },
            { "_id": "knows/4", "_from": "persons/carol", "_to": "persons/dave" }
        ]
    }))
    .expect("构造社交图失败");
    Arc::new(graph)
}

pub fn outbound_provider(graph: Arc<MockGraph>) -> MockGraphProvider {
    MockGraphProvider::new(graph, MockProviderOptions::new(EdgeDirection::Outbound))
}

/// 双向搜索使用的一对 Provider
pub fn bidirectional_providers(graph: Arc<MockGraph>) -> (MockGraphProvider, MockGraphProvider) {
    let forward = outbound_provider(graph);
    let backward = forward.reversed();
    (forward, backward)
}

/// 取出全部路径的顶点标识序列
pub async fn collect_paths(enumerator: &mut dyn PathEnumerator) -> Vec<Vec<String>> {
    let mut paths = Vec::new();
    while let Some(path) = enumerator
        .get_next_path()
        .await
        .expect("枚举路径失败")
    {
        assert!(path.is_valid(), "结构无效的路径: {:?}", path);
        paths.push(path.vertex_ids().into_iter().map(String::from).collect());
    }
    paths
}

pub fn ids(paths: &[&[&str]]) -> Vec<Vec<String>> {
    paths
        .iter()
        .map(|path| path.iter().map(|id| id.to_string()).collect())
        .collect()
}
