//! 遍历统计信息

use std::ops::AddAssign;

use serde::Serialize;

/// 遍历统计计数器
///
/// 通过 `steal` 读取后清零，调用方负责把每次读到的增量累加到查询级统计中。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraversalStats {
    /// 扫描的文档数
    pub scanned_index: u64,
    /// 被校验器过滤的步骤数
    pub filtered: u64,
    /// 获取往返次数
    pub http_requests: u64,
    pub cursors_created: u64,
    pub cursors_rearmed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl TraversalStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_scanned_index(&mut self, count: u64) {
        self.scanned_index += count;
    }

    pub fn incr_filtered(&mut self) {
        self.filtered += 1;
    }

    pub fn incr_http_requests(&mut self, count: u64) {
        self.http_requests += count;
    }

    pub fn incr_cursors_created(&mut self) {
        self.cursors_created += 1;
    }

    pub fn incr_cursors_rearmed(&mut self) {
        self.cursors_rearmed += 1;
    }

    pub fn incr_cache_hits(&mut self) {
        self.cache_hits += 1;
    }

    pub fn incr_cache_misses(&mut self) {
        self.cache_misses += 1;
    }

    /// 取出当前计数并清零
    pub fn steal(&mut self) -> TraversalStats {
        std::mem::take(self)
    }

    /// 计算缓存命中率
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl AddAssign for TraversalStats {
    fn add_assign(&mut self, other: Self) {
        self.scanned_index += other.scanned_index;
        self.filtered += other.filtered;
        self.http_requests += other.http_requests;
        self.cursors_created += other.cursors_created;
        self.cursors_rearmed += other.cursors_rearmed;
        self.cache_hits += other.cache_hits;
        self.cache_misses += other.cache_misses;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steal_resets_counters() {
        let mut stats = TraversalStats::new();
        stats.add_scanned_index(10);
        stats.incr_filtered();
        stats.incr_http_requests(2);

        let stolen = stats.steal();
        assert_eq!(stolen.scanned_index, 10);
        assert_eq!(stolen.filtered, 1);
        assert_eq!(stolen.http_requests, 2);
        assert_eq!(stats, TraversalStats::default());
    }

    #[test]
    fn test_add_assign_and_hit_rate() {
        let mut total = TraversalStats::new();
        assert_eq!(total.cache_hit_rate(), 0.0);

        let mut part = TraversalStats::new();
        part.incr_cache_hits();
        part.incr_cache_misses();
        part.incr_cursors_created();
        total += part.clone();
        total += part;

        assert_eq!(total.cache_hits, 2);
        assert_eq!(total.cursors_created, 2);
        assert_eq!(total.cache_hit_rate(), 0.5);
    }
}
