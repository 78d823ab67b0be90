//! 路径结果
//!
//! 由路径存储沿父下标回溯构造，每产出一条路径构造一次，不被路径存储持有。

use std::collections::VecDeque;

use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::core::{EdgeRef, VertexRef};
use crate::query::path_enumeration::provider::Provider;

/// 有序的顶点/边（以及可选的权重）序列
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathResult {
    vertices: VecDeque<VertexRef>,
    edges: VecDeque<EdgeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weights: Option<VecDeque<f64>>,
}

impl PathResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录每个顶点累计权重的路径
    pub fn weighted() -> Self {
        Self {
            weights: Some(VecDeque::new()),
            ..Self::default()
        }
    }

    pub fn is_weighted(&self) -> bool {
        self.weights.is_some()
    }

    pub fn prepend_vertex(&mut self, vertex: VertexRef) {
        self.vertices.push_front(vertex);
    }

    pub fn append_vertex(&mut self, vertex: VertexRef) {
        self.vertices.push_back(vertex);
    }

    pub fn prepend_edge(&mut self, edge: EdgeRef) {
        self.edges.push_front(edge);
    }

    pub fn append_edge(&mut self, edge: EdgeRef) {
        self.edges.push_back(edge);
    }

    /// 非加权路径忽略权重
    pub fn prepend_weight(&mut self, weight: f64) {
        if let Some(weights) = self.weights.as_mut() {
            weights.push_front(weight);
        }
    }

    pub fn append_weight(&mut self, weight: f64) {
        if let Some(weights) = self.weights.as_mut() {
            weights.push_back(weight);
        }
    }

    pub fn vertices(&self) -> &VecDeque<VertexRef> {
        &self.vertices
    }

    pub fn edges(&self) -> &VecDeque<EdgeRef> {
        &self.edges
    }

    pub fn weights(&self) -> Option<&VecDeque<f64>> {
        self.weights.as_ref()
    }

    /// 路径长度（边数）
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn first_vertex(&self) -> Option<&VertexRef> {
        self.vertices.front()
    }

    pub fn last_vertex(&self) -> Option<&VertexRef> {
        self.vertices.back()
    }

    /// 终点的累计权重
    pub fn total_weight(&self) -> Option<f64> {
        self.weights.as_ref().and_then(|w| w.back().copied())
    }

    /// 顶点标识序列，便于比较
    pub fn vertex_ids(&self) -> Vec<&str> {
        self.vertices.iter().map(VertexRef::as_str).collect()
    }

    /// 结构检查：至少一个顶点，边数 = 顶点数 - 1，权重（若有）与顶点一一对应
    pub fn is_valid(&self) -> bool {
        if self.vertices.is_empty() || self.edges.len() + 1 != self.vertices.len() {
            return false;
        }
        match &self.weights {
            Some(weights) => weights.len() == self.vertices.len(),
            None => true,
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        if let Some(weights) = self.weights.as_mut() {
            weights.clear();
        }
    }

    /// 只包含标识的 JSON 表示
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }

    /// 使用 Provider 提供的完整文档序列化
    pub fn to_json_with<P: Provider + ?Sized>(&self, provider: &P) -> JsonValue {
        let vertices: Vec<JsonValue> = self
            .vertices
            .iter()
            .map(|v| provider.vertex_document(v))
            .collect();
        let edges: Vec<JsonValue> = self
            .edges
            .iter()
            .map(|e| provider.edge_document(e))
            .collect();

        let mut result = json!({
            "vertices": vertices,
            "edges": edges,
        });
        if let Some(weights) = &self.weights {
            result["weights"] = json!(weights);
        }
        result
    }
}
