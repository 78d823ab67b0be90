//! 路径存储（Schreier 向量）
//!
//! 只追加的步骤数组，每个步骤通过下标指向父步骤，父下标总是严格小于自身下标，
//! 因此隐式构成一片森林：多个步骤可以共享同一个父步骤，但不可能出现环。
//! 路径重建和全局唯一性检查都依赖这里的父链。

use std::sync::Arc;

use crate::core::{ResourceMonitor, ResourceUsageScope, TraversalResult};
use crate::query::path_enumeration::path_result::PathResult;
use crate::query::path_enumeration::step::Step;

/// 路径存储契约
///
/// 追踪装饰器实现同一个 trait 后可透明替换 `PathStore`。
pub trait PathStorage<S: Step>: Send {
    /// 追加步骤并返回其下标；内存配额不足时失败且存储保持不变
    fn append(&mut self, step: S) -> TraversalResult<usize>;

    /// 越界访问属于编程错误，直接 panic
    fn get_step(&self, index: usize) -> &S;

    fn get_step_mut(&mut self, index: usize) -> &mut S;

    fn size(&self) -> usize;

    /// 清空所有步骤并归还内存配额，对空存储调用也是安全的
    fn reset(&mut self);

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// 从叶子步骤回溯到根，把顶点和边依次插入到路径头部
    ///
    /// 叶子步骤本身不必已经追加到存储中，但它的父链必须在存储中。
    fn build_path(&self, step: &S, path: &mut PathResult) {
        path.prepend_vertex(step.vertex().clone());
        path.prepend_weight(step.weight());

        let mut current = step;
        while let Some(previous) = current.previous() {
            path.prepend_edge(current.edge().clone());
            current = self.get_step(previous);
            path.prepend_vertex(current.vertex().clone());
            path.prepend_weight(current.weight());
        }
    }

    fn build_path_from(&self, index: usize, path: &mut PathResult) {
        self.build_path(self.get_step(index), path);
    }

    /// 反向搜索一侧使用：把从叶子到根的部分追加到路径尾部
    ///
    /// 叶子顶点（交汇点）已由另一侧加入，这里不再重复；叶子本身是根时什么都不追加。
    /// 反向一侧不贡献权重。
    fn reverse_build_path(&self, step: &S, path: &mut PathResult) {
        let Some(mut previous) = step.previous() else {
            return;
        };
        path.append_edge(step.edge().clone());

        loop {
            let current = self.get_step(previous);
            path.append_vertex(current.vertex().clone());
            match current.previous() {
                Some(next) => {
                    path.append_edge(current.edge().clone());
                    previous = next;
                }
                None => break,
            }
        }
    }

    /// 从 `index` 开始向根依次访问步骤
    ///
    /// 访问者返回 false 时提前停止，此时返回 false；完整走到根返回 true。
    fn visit_reverse_path<F>(&self, index: usize, mut visitor: F) -> bool
    where
        F: FnMut(&S) -> bool,
        Self: Sized,
    {
        let mut current = Some(index);
        while let Some(i) = current {
            let step = self.get_step(i);
            if !visitor(step) {
                return false;
            }
            current = step.previous();
        }
        true
    }
}

/// 基于 Vec 的路径存储
#[derive(Debug)]
pub struct PathStore<S: Step> {
    steps: Vec<S>,
    monitor: Arc<ResourceMonitor>,
}

impl<S: Step> PathStore<S> {
    pub fn new(monitor: Arc<ResourceMonitor>) -> Self {
        Self {
            steps: Vec::new(),
            monitor,
        }
    }

    /// 每个步骤计入配额的字节数
    pub fn step_size() -> usize {
        std::mem::size_of::<S>()
    }

    /// 本存储当前占用的配额
    pub fn memory_usage(&self) -> usize {
        self.steps.len() * Self::step_size()
    }

    pub fn monitor(&self) -> &Arc<ResourceMonitor> {
        &self.monitor
    }
}

impl<S: Step> PathStorage<S> for PathStore<S> {
    fn append(&mut self, step: S) -> TraversalResult<usize> {
        let index = self.steps.len();
        if let Some(previous) = step.previous() {
            assert!(
                previous < index,
                "步骤的父下标 {} 必须小于自身下标 {}",
                previous,
                index
            );
        }

        let scope = ResourceUsageScope::new(&self.monitor, Self::step_size())?;
        self.steps.push(step);
        scope.steal();
        Ok(index)
    }

    fn get_step(&self, index: usize) -> &S {
        &self.steps[index]
    }

    fn get_step_mut(&mut self, index: usize) -> &mut S {
        &mut self.steps[index]
    }

    fn size(&self) -> usize {
        self.steps.len()
    }

    fn reset(&mut self) {
        self.monitor.decrease_memory_usage(self.memory_usage());
        self.steps.clear();
    }
}

impl<S: Step> Drop for PathStore<S> {
    fn drop(&mut self) {
        self.monitor.decrease_memory_usage(self.memory_usage());
    }
}
