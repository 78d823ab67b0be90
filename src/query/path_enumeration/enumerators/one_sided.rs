//! 单向路径枚举器
//!
//! 从起点出发维护一个前沿队列：队首是松散端时批量获取，然后出队、校验、
//! 追加到路径存储、按深度边界决定是否作为结果以及是否继续展开。
//! 结果以路径存储下标缓存，取出时才物化为 `PathResult`。

use std::collections::VecDeque;

use crate::core::{TraversalOrder, TraversalResult, VertexRef};
use crate::query::path_enumeration::options::EnumeratorOptions;
use crate::query::path_enumeration::path_result::PathResult;
use crate::query::path_enumeration::path_store::PathStorage;
use crate::query::path_enumeration::provider::Provider;
use crate::query::path_enumeration::queue::Queue;
use crate::query::path_enumeration::stats::TraversalStats;
use crate::query::path_enumeration::step::Step;
use crate::query::path_enumeration::validator::{PathValidator, PathValidatorOptions};

/// 单向枚举器
pub struct OneSidedEnumerator<P, Q, St>
where
    P: Provider,
{
    provider: P,
    queue: Q,
    store: St,
    validator: PathValidator,
    options: EnumeratorOptions,
    /// 已确认的结果，元素为路径存储下标
    results: VecDeque<usize>,
    algorithm_finished: bool,
    stats: TraversalStats,
}

impl<P, Q, St> OneSidedEnumerator<P, Q, St>
where
    P: Provider,
    Q: Queue<P::Step>,
    St: PathStorage<P::Step>,
{
    pub fn new(
        provider: P,
        queue: Q,
        store: St,
        options: EnumeratorOptions,
        validator_options: PathValidatorOptions,
    ) -> Self {
        Self {
            provider,
            queue,
            store,
            validator: PathValidator::new(validator_options),
            options,
            results: VecDeque::new(),
            algorithm_finished: false,
            stats: TraversalStats::new(),
        }
    }

    pub fn options(&self) -> &EnumeratorOptions {
        &self.options
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// 以 `source` 为起点开始新的搜索
    pub fn reset(&mut self, source: &VertexRef, depth: usize, weight: f64) -> TraversalResult<()> {
        self.clear();
        self.provider.clear();

        log::debug!("单向枚举重置: 起点 {}, 深度 {}, 权重 {}", source, depth, weight);
        let first = self.provider.start_vertex(source, depth, weight);
        self.queue.append(first)
    }

    /// 清空搜索状态，保留 Provider 缓存
    pub fn clear(&mut self) {
        self.queue.clear();
        self.store.reset();
        self.validator.reset();
        self.results.clear();
        self.algorithm_finished = false;
    }

    pub fn destroy_engines(&mut self) {
        self.provider.destroy_engines();
    }

    /// 结果已取完且前沿无法继续推进
    ///
    /// 返回 false 并不保证还有结果，只表示尚不能证明没有。
    pub fn is_done(&self) -> bool {
        self.results.is_empty() && self.search_done()
    }

    fn search_done(&self) -> bool {
        self.queue.is_empty() || self.algorithm_finished
    }

    pub fn set_algorithm_finished(&mut self) {
        self.algorithm_finished = true;
    }

    pub fn is_algorithm_finished(&self) -> bool {
        self.algorithm_finished
    }

    /// 推进一个前沿步骤
    async fn compute_next_step(&mut self) -> TraversalResult<()> {
        if !self.queue.has_processable_element() {
            let loose_ends = self.queue.loose_ends();
            self.provider.fetch(loose_ends).await?;
        }

        let Some(step) = self.queue.pop() else {
            return Ok(());
        };

        let validation = self.validator.validate_path(&self.store, &step);
        if validation.is_filtered() && validation.is_pruned() {
            self.stats.incr_filtered();
            return Ok(());
        }

        let depth = step.depth();
        let index = self.store.append(step)?;
        self.validator.commit(self.store.get_step(index));

        if validation.is_filtered() {
            self.stats.incr_filtered();
        } else if self.options.is_result_depth(depth) {
            self.results.push_back(index);
        }

        if !validation.is_pruned() && self.options.can_expand(depth) {
            let children = self.provider.expand(self.store.get_step(index), index)?;
            for child in children {
                self.queue.append(child)?;
            }
        }
        Ok(())
    }

    async fn search_more_results(&mut self) -> TraversalResult<()> {
        while self.results.is_empty() && !self.search_done() {
            self.compute_next_step().await?;
        }
        Ok(())
    }

    /// 取出下一条路径，搜索空间耗尽时返回 `None`
    pub async fn get_next_path(&mut self) -> TraversalResult<Option<PathResult>> {
        loop {
            self.search_more_results().await?;

            let Some(index) = self.results.pop_front() else {
                return Ok(None);
            };

            let mut path = match self.options.order {
                TraversalOrder::Weighted => PathResult::weighted(),
                _ => PathResult::new(),
            };
            self.store.build_path_from(index, &mut path);
            if path.is_valid() {
                return Ok(Some(path));
            }
            log::warn!("丢弃结构无效的路径结果: {:?}", path.vertex_ids());
        }
    }

    /// 与 `get_next_path` 推进方式相同，但不物化结果
    pub async fn skip_path(&mut self) -> TraversalResult<bool> {
        self.search_more_results().await?;
        Ok(self.results.pop_front().is_some())
    }

    /// 本枚举器与 Provider 的统计合并后清零
    pub fn steal_stats(&mut self) -> TraversalStats {
        let mut stats = self.stats.steal();
        stats += self.provider.steal_stats();
        stats
    }
}
