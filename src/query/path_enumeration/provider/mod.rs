//! 数据提供者
//!
//! Provider 是路径枚举与存储/网络层之间的边界：构造起始步骤、异步批量获取松散端、
//! 把已获取的步骤展开为候选后继步骤。单机、集群和追踪装饰器都实现同一个 trait。

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use crate::core::{EdgeRef, TraversalResult, VertexRef};
use crate::query::path_enumeration::stats::TraversalStats;
use crate::query::path_enumeration::step::Step;

pub mod mock;

pub use mock::{MockGraph, MockGraphProvider, MockProviderOptions};

/// Provider 契约
#[async_trait]
pub trait Provider: Send {
    type Step: Step;

    /// 构造根步骤；初始获取状态由实现决定
    fn start_vertex(&mut self, vertex: &VertexRef, depth: usize, weight: f64) -> Self::Step;

    /// 批量获取松散端，成功后每个步骤都处于完全获取状态
    ///
    /// 这是枚举过程中唯一的挂起点。对已获取的步骤重复获取不产生任何效果；
    /// 失败时步骤保持原状态，调用方可以重试。
    async fn fetch(&mut self, loose_ends: Vec<&mut Self::Step>) -> TraversalResult<()>;

    /// 展开已获取的步骤，`previous` 为该步骤在路径存储中的下标
    ///
    /// 对松散端调用属于编程错误。结构损坏的边不产生步骤。
    fn expand(&mut self, step: &Self::Step, previous: usize) -> TraversalResult<Vec<Self::Step>>;

    /// 清空缓存，开始新的搜索前调用
    fn clear(&mut self);

    /// 释放底层游标等资源，任何时候调用都是安全的
    fn destroy_engines(&mut self);

    /// 读取统计并清零
    fn steal_stats(&mut self) -> TraversalStats;

    /// 结果序列化时使用的顶点文档
    fn vertex_document(&self, vertex: &VertexRef) -> JsonValue {
        json!({ "_id": vertex.as_str() })
    }

    /// 结果序列化时使用的边文档
    fn edge_document(&self, edge: &EdgeRef) -> JsonValue {
        match edge.as_str() {
            Some(id) => json!({ "_id": id }),
            None => JsonValue::Null,
        }
    }
}
