//! 遍历前沿队列
//!
//! 队列决定步骤的处理顺序（广度优先、深度优先、按权重），并负责把未获取的
//! 松散端一次性交给 Provider 批量获取。队列中的步骤同样计入内存配额。

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::core::{ResourceMonitor, ResourceUsageScope, TraversalResult};
use crate::query::path_enumeration::step::Step;

/// 队列契约
pub trait Queue<S: Step>: Send {
    fn clear(&mut self);

    /// 入队，内存配额不足时失败且队列保持不变
    fn append(&mut self, step: S) -> TraversalResult<()>;

    fn is_empty(&self) -> bool;

    fn size(&self) -> usize;

    /// 下一个出队的步骤是否已完全获取
    fn has_processable_element(&self) -> bool;

    /// 队列中所有尚未完全获取的步骤
    fn loose_ends(&mut self) -> Vec<&mut S>;

    fn pop(&mut self) -> Option<S>;
}

fn step_size<S>() -> usize {
    std::mem::size_of::<S>()
}

/// 先进先出队列（广度优先）
#[derive(Debug)]
pub struct FifoQueue<S: Step> {
    queue: VecDeque<S>,
    monitor: Arc<ResourceMonitor>,
}

impl<S: Step> FifoQueue<S> {
    pub fn new(monitor: Arc<ResourceMonitor>) -> Self {
        Self {
            queue: VecDeque::new(),
            monitor,
        }
    }
}

impl<S: Step> Queue<S> for FifoQueue<S> {
    fn clear(&mut self) {
        self.monitor
            .decrease_memory_usage(self.queue.len() * step_size::<S>());
        self.queue.clear();
    }

    fn append(&mut self, step: S) -> TraversalResult<()> {
        let scope = ResourceUsageScope::new(&self.monitor, step_size::<S>())?;
        self.queue.push_back(step);
        scope.steal();
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn size(&self) -> usize {
        self.queue.len()
    }

    fn has_processable_element(&self) -> bool {
        self.queue.front().is_some_and(|step| step.is_processable())
    }

    fn loose_ends(&mut self) -> Vec<&mut S> {
        self.queue.iter_mut().filter(|step| step.is_loose_end()).collect()
    }

    fn pop(&mut self) -> Option<S> {
        let step = self.queue.pop_front()?;
        self.monitor.decrease_memory_usage(step_size::<S>());
        Some(step)
    }
}

impl<S: Step> Drop for FifoQueue<S> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// 后进先出队列（深度优先）
#[derive(Debug)]
pub struct LifoQueue<S: Step> {
    queue: Vec<S>,
    monitor: Arc<ResourceMonitor>,
}

impl<S: Step> LifoQueue<S> {
    pub fn new(monitor: Arc<ResourceMonitor>) -> Self {
        Self {
            queue: Vec::new(),
            monitor,
        }
    }
}

impl<S: Step> Queue<S> for LifoQueue<S> {
    fn clear(&mut self) {
        self.monitor
            .decrease_memory_usage(self.queue.len() * step_size::<S>());
        self.queue.clear();
    }

    fn append(&mut self, step: S) -> TraversalResult<()> {
        let scope = ResourceUsageScope::new(&self.monitor, step_size::<S>())?;
        self.queue.push(step);
        scope.steal();
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn size(&self) -> usize {
        self.queue.len()
    }

    fn has_processable_element(&self) -> bool {
        self.queue.last().is_some_and(|step| step.is_processable())
    }

    fn loose_ends(&mut self) -> Vec<&mut S> {
        self.queue.iter_mut().filter(|step| step.is_loose_end()).collect()
    }

    fn pop(&mut self) -> Option<S> {
        let step = self.queue.pop()?;
        self.monitor.decrease_memory_usage(step_size::<S>());
        Some(step)
    }
}

impl<S: Step> Drop for LifoQueue<S> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// 按累计权重出队的队列，权重相同时按入队顺序
///
/// 内部按 (权重, 序号) 降序保存，最小者位于末尾。
#[derive(Debug)]
pub struct WeightedQueue<S: Step> {
    queue: Vec<(u64, S)>,
    sequence: u64,
    monitor: Arc<ResourceMonitor>,
}

impl<S: Step> WeightedQueue<S> {
    pub fn new(monitor: Arc<ResourceMonitor>) -> Self {
        Self {
            queue: Vec::new(),
            sequence: 0,
            monitor,
        }
    }

    fn compare(a: (f64, u64), b: (f64, u64)) -> Ordering {
        a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
    }
}

impl<S: Step> Queue<S> for WeightedQueue<S> {
    fn clear(&mut self) {
        self.monitor
            .decrease_memory_usage(self.queue.len() * step_size::<S>());
        self.queue.clear();
    }

    fn append(&mut self, step: S) -> TraversalResult<()> {
        let scope = ResourceUsageScope::new(&self.monitor, step_size::<S>())?;
        let key = (step.weight(), self.sequence);
        let position = self
            .queue
            .partition_point(|(seq, existing)| Self::compare((existing.weight(), *seq), key) == Ordering::Greater);
        self.queue.insert(position, (self.sequence, step));
        self.sequence += 1;
        scope.steal();
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn size(&self) -> usize {
        self.queue.len()
    }

    fn has_processable_element(&self) -> bool {
        self.queue.last().is_some_and(|(_, step)| step.is_processable())
    }

    fn loose_ends(&mut self) -> Vec<&mut S> {
        self.queue
            .iter_mut()
            .map(|(_, step)| step)
            .filter(|step| step.is_loose_end())
            .collect()
    }

    fn pop(&mut self) -> Option<S> {
        let (_, step) = self.queue.pop()?;
        self.monitor.decrease_memory_usage(step_size::<S>());
        Some(step)
    }
}

impl<S: Step> Drop for WeightedQueue<S> {
    fn drop(&mut self) {
        self.clear();
    }
}
