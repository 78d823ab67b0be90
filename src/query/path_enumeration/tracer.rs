//! 追踪装饰器
//!
//! 包装 Provider、队列和路径存储，转发每一次调用并记录调用次数与耗时，
//! 被包装对象的行为完全不变。装饰器销毁时以 debug 级别输出汇总。

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value as JsonValue;

use crate::core::{EdgeRef, TraversalResult, VertexRef};
use crate::query::path_enumeration::path_result::PathResult;
use crate::query::path_enumeration::path_store::PathStorage;
use crate::query::path_enumeration::provider::Provider;
use crate::query::path_enumeration::queue::Queue;
use crate::query::path_enumeration::stats::TraversalStats;
use crate::query::path_enumeration::step::Step;

/// 单个方法的调用统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceEntry {
    pub calls: u64,
    pub total: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl TraceEntry {
    fn record(&mut self, elapsed: Duration) {
        if self.calls == 0 || elapsed < self.min {
            self.min = elapsed;
        }
        if elapsed > self.max {
            self.max = elapsed;
        }
        self.calls += 1;
        self.total += elapsed;
    }

    pub fn average(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total.div_f64(self.calls as f64)
        }
    }
}

/// 按方法名汇总的追踪记录
#[derive(Debug)]
struct TraceRecorder {
    component: &'static str,
    entries: Mutex<BTreeMap<&'static str, TraceEntry>>,
}

impl TraceRecorder {
    fn new(component: &'static str) -> Self {
        Self {
            component,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    fn record(&self, method: &'static str, elapsed: Duration) {
        self.entries.lock().entry(method).or_default().record(elapsed);
    }

    fn time<T>(&self, method: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.record(method, start.elapsed());
        result
    }

    fn summary(&self) -> BTreeMap<&'static str, TraceEntry> {
        self.entries.lock().clone()
    }
}

impl Drop for TraceRecorder {
    fn drop(&mut self) {
        let entries = self.entries.lock();
        if entries.is_empty() {
            return;
        }
        log::debug!("{} 追踪汇总:", self.component);
        for (method, entry) in entries.iter() {
            log::debug!(
                "  {}: 调用 {} 次, 总计 {:?}, 最短 {:?}, 最长 {:?}",
                method,
                entry.calls,
                entry.total,
                entry.min,
                entry.max
            );
        }
    }
}

/// Provider 追踪装饰器
#[derive(Debug)]
pub struct ProviderTracer<P> {
    inner: P,
    recorder: TraceRecorder,
}

impl<P: Provider> ProviderTracer<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            recorder: TraceRecorder::new("Provider"),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.inner
    }

    pub fn trace_summary(&self) -> BTreeMap<&'static str, TraceEntry> {
        self.recorder.summary()
    }
}

#[async_trait]
impl<P: Provider> Provider for ProviderTracer<P> {
    type Step = P::Step;

    fn start_vertex(&mut self, vertex: &VertexRef, depth: usize, weight: f64) -> P::Step {
        self.recorder
            .time("start_vertex", || self.inner.start_vertex(vertex, depth, weight))
    }

    async fn fetch(&mut self, loose_ends: Vec<&mut P::Step>) -> TraversalResult<()> {
        let start = Instant::now();
        let result = self.inner.fetch(loose_ends).await;
        self.recorder.record("fetch", start.elapsed());
        result
    }

    fn expand(&mut self, step: &P::Step, previous: usize) -> TraversalResult<Vec<P::Step>> {
        self.recorder
            .time("expand", || self.inner.expand(step, previous))
    }

    fn clear(&mut self) {
        self.recorder.time("clear", || self.inner.clear())
    }

    fn destroy_engines(&mut self) {
        self.recorder
            .time("destroy_engines", || self.inner.destroy_engines())
    }

    fn steal_stats(&mut self) -> TraversalStats {
        self.recorder
            .time("steal_stats", || self.inner.steal_stats())
    }

    fn vertex_document(&self, vertex: &VertexRef) -> JsonValue {
        self.inner.vertex_document(vertex)
    }

    fn edge_document(&self, edge: &EdgeRef) -> JsonValue {
        self.inner.edge_document(edge)
    }
}

/// 队列追踪装饰器
#[derive(Debug)]
pub struct QueueTracer<Q> {
    inner: Q,
    recorder: TraceRecorder,
}

impl<Q> QueueTracer<Q> {
    pub fn new(inner: Q) -> Self {
        Self {
            inner,
            recorder: TraceRecorder::new("Queue"),
        }
    }

    pub fn inner(&self) -> &Q {
        &self.inner
    }

    pub fn trace_summary(&self) -> BTreeMap<&'static str, TraceEntry> {
        self.recorder.summary()
    }
}

impl<S: Step, Q: Queue<S>> Queue<S> for QueueTracer<Q> {
    fn clear(&mut self) {
        self.recorder.time("clear", || self.inner.clear())
    }

    fn append(&mut self, step: S) -> TraversalResult<()> {
        self.recorder.time("append", || self.inner.append(step))
    }

    fn is_empty(&self) -> bool {
        self.recorder.time("is_empty", || self.inner.is_empty())
    }

    fn size(&self) -> usize {
        self.recorder.time("size", || self.inner.size())
    }

    fn has_processable_element(&self) -> bool {
        self.recorder
            .time("has_processable_element", || self.inner.has_processable_element())
    }

    fn loose_ends(&mut self) -> Vec<&mut S> {
        let start = Instant::now();
        let loose_ends = self.inner.loose_ends();
        self.recorder.record("loose_ends", start.elapsed());
        loose_ends
    }

    fn pop(&mut self) -> Option<S> {
        self.recorder.time("pop", || self.inner.pop())
    }
}

/// 路径存储追踪装饰器
#[derive(Debug)]
pub struct PathStoreTracer<St> {
    inner: St,
    recorder: TraceRecorder,
}

impl<St> PathStoreTracer<St> {
    pub fn new(inner: St) -> Self {
        Self {
            inner,
            recorder: TraceRecorder::new("PathStore"),
        }
    }

    pub fn inner(&self) -> &St {
        &self.inner
    }

    pub fn trace_summary(&self) -> BTreeMap<&'static str, TraceEntry> {
        self.recorder.summary()
    }
}

impl<S: Step, St: PathStorage<S>> PathStorage<S> for PathStoreTracer<St> {
    fn append(&mut self, step: S) -> TraversalResult<usize> {
        self.recorder.time("append", || self.inner.append(step))
    }

    fn get_step(&self, index: usize) -> &S {
        let start = Instant::now();
        let step = self.inner.get_step(index);
        self.recorder.record("get_step", start.elapsed());
        step
    }

    fn get_step_mut(&mut self, index: usize) -> &mut S {
        let start = Instant::now();
        let step = self.inner.get_step_mut(index);
        self.recorder.record("get_step_mut", start.elapsed());
        step
    }

    fn size(&self) -> usize {
        self.recorder.time("size", || self.inner.size())
    }

    fn reset(&mut self) {
        self.recorder.time("reset", || self.inner.reset())
    }

    fn build_path(&self, step: &S, path: &mut PathResult) {
        self.recorder
            .time("build_path", || self.inner.build_path(step, path))
    }

    fn reverse_build_path(&self, step: &S, path: &mut PathResult) {
        self.recorder
            .time("reverse_build_path", || self.inner.reverse_build_path(step, path))
    }

    fn visit_reverse_path<F>(&self, index: usize, visitor: F) -> bool
    where
        F: FnMut(&S) -> bool,
        Self: Sized,
    {
        self.recorder
            .time("visit_reverse_path", || self.inner.visit_reverse_path(index, visitor))
    }
}
