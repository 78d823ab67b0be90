//! 内存配额管理
//!
//! 同一次查询中的所有路径存储与队列共享一个 `ResourceMonitor`（双向搜索的两个 Ball 也共享），
//! 通过 `ResourceUsageScope` 以作用域方式申请和归还配额，提前返回或出错时不会泄漏。

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::error::{TraversalError, TraversalResult};

/// 默认内存配额：256MB
pub const DEFAULT_MEMORY_LIMIT: usize = 256 * 1024 * 1024;

/// 内存使用监控器
#[derive(Debug)]
pub struct ResourceMonitor {
    /// 当前内存使用量
    current_usage: AtomicUsize,
    /// 峰值内存使用量
    peak_usage: AtomicUsize,
    /// 内存限制
    limit: usize,
}

impl ResourceMonitor {
    pub fn new(limit: usize) -> Self {
        Self {
            current_usage: AtomicUsize::new(0),
            peak_usage: AtomicUsize::new(0),
            limit,
        }
    }

    /// 不限制内存的监控器，仍然记录使用量
    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    /// 申请内存配额
    ///
    /// 超出限制时回滚本次申请并返回 `ResourceExhausted`。
    pub fn increase_memory_usage(&self, size: usize) -> TraversalResult<()> {
        let current = self.current_usage.fetch_add(size, Ordering::AcqRel);
        let requested = current.saturating_add(size);

        if requested > self.limit {
            self.current_usage.fetch_sub(size, Ordering::AcqRel);
            log::warn!(
                "内存配额不足: requested={}, limit={}",
                requested,
                self.limit
            );
            return Err(TraversalError::ResourceExhausted(format!(
                "Memory limit exceeded: current={}, limit={}",
                requested, self.limit
            )));
        }

        self.peak_usage.fetch_max(requested, Ordering::AcqRel);
        Ok(())
    }

    /// 归还内存配额
    pub fn decrease_memory_usage(&self, size: usize) {
        self.current_usage.fetch_sub(size, Ordering::AcqRel);
    }

    pub fn current_memory_usage(&self) -> usize {
        self.current_usage.load(Ordering::Acquire)
    }

    pub fn peak_memory_usage(&self) -> usize {
        self.peak_usage.load(Ordering::Acquire)
    }

    pub fn memory_limit(&self) -> usize {
        self.limit
    }
}

impl Default for ResourceMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_LIMIT)
    }
}

/// 作用域内存申请
///
/// 创建时申请配额，析构时归还，除非调用 `steal` 把配额的所有权交给调用方。
#[must_use]
pub struct ResourceUsageScope<'a> {
    monitor: &'a ResourceMonitor,
    size: usize,
}

impl<'a> ResourceUsageScope<'a> {
    pub fn new(monitor: &'a ResourceMonitor, size: usize) -> TraversalResult<Self> {
        monitor.increase_memory_usage(size)?;
        Ok(Self { monitor, size })
    }

    /// 放弃自动归还，返回由调用方负责的字节数
    pub fn steal(mut self) -> usize {
        std::mem::take(&mut self.size)
    }
}

impl Drop for ResourceUsageScope<'_> {
    fn drop(&mut self) {
        if self.size > 0 {
            self.monitor.decrease_memory_usage(self.size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increase_and_decrease() {
        let monitor = ResourceMonitor::new(1024);
        monitor.increase_memory_usage(100).expect("申请内存失败");
        monitor.increase_memory_usage(200).expect("申请内存失败");
        assert_eq!(monitor.current_memory_usage(), 300);

        monitor.decrease_memory_usage(300);
        assert_eq!(monitor.current_memory_usage(), 0);
        assert_eq!(monitor.peak_memory_usage(), 300);
    }

    #[test]
    fn test_limit_exceeded_rolls_back() {
        let monitor = ResourceMonitor::new(100);
        monitor.increase_memory_usage(80).expect("申请内存失败");

        let result = monitor.increase_memory_usage(30);
        assert!(matches!(result, Err(TraversalError::ResourceExhausted(_))));
        assert_eq!(monitor.current_memory_usage(), 80);
    }

    #[test]
    fn test_scope_releases_on_drop() {
        let monitor = ResourceMonitor::new(1024);
        {
            let _scope = ResourceUsageScope::new(&monitor, 64).expect("申请内存失败");
            assert_eq!(monitor.current_memory_usage(), 64);
        }
        assert_eq!(monitor.current_memory_usage(), 0);
    }

    #[test]
    fn test_scope_steal_keeps_usage() {
        let monitor = ResourceMonitor::new(1024);
        let scope = ResourceUsageScope::new(&monitor, 64).expect("申请内存失败");
        assert_eq!(scope.steal(), 64);
        assert_eq!(monitor.current_memory_usage(), 64);
    }
}
