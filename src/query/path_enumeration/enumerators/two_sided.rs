//! 双向路径枚举器
//!
//! 两个 Ball 分别从起点和终点向外扩展。每个 Ball 的 shell 保存当前深度新发现的步骤，
//! 新步骤加入 shell 时与另一侧 shell 中同一顶点的步骤配对，得到的步骤对即一条候选路径。
//! 两侧深度交替推进，深度差不超过 1，因此每个长度的路径只会在一个深度组合上被发现。

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use crate::core::{ResourceMonitor, TraversalResult, UniquenessLevel, VertexRef};
use crate::query::path_enumeration::options::EnumeratorOptions;
use crate::query::path_enumeration::path_result::PathResult;
use crate::query::path_enumeration::path_store::{PathStorage, PathStore};
use crate::query::path_enumeration::provider::Provider;
use crate::query::path_enumeration::queue::{FifoQueue, Queue};
use crate::query::path_enumeration::stats::TraversalStats;
use crate::query::path_enumeration::step::Step;
use crate::query::path_enumeration::validator::{PathValidator, PathValidatorOptions};

/// Ball 所在的一侧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallSide {
    /// 从起点出发
    Left,
    /// 从终点出发，沿反方向扩展
    Right,
}

/// 单侧搜索状态
pub struct Ball<P, Q, St>
where
    P: Provider,
{
    side: BallSide,
    provider: P,
    queue: Q,
    store: St,
    validator: PathValidator,
    /// 当前深度新发现、尚未入队的步骤，按顶点分组
    shell: BTreeMap<VertexRef, Vec<P::Step>>,
    shell_len: usize,
    depth: usize,
    monitor: Arc<ResourceMonitor>,
    stats: TraversalStats,
}

impl<P, Q, St> Ball<P, Q, St>
where
    P: Provider,
    Q: Queue<P::Step>,
    St: PathStorage<P::Step>,
{
    pub fn new(
        side: BallSide,
        provider: P,
        queue: Q,
        store: St,
        validator_options: PathValidatorOptions,
        monitor: Arc<ResourceMonitor>,
    ) -> Self {
        Self {
            side,
            provider,
            queue,
            store,
            validator: PathValidator::new(validator_options),
            shell: BTreeMap::new(),
            shell_len: 0,
            depth: 0,
            monitor,
            stats: TraversalStats::new(),
        }
    }

    pub fn side(&self) -> BallSide {
        self.side
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn shell_size(&self) -> usize {
        self.shell_len
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    fn step_size() -> usize {
        std::mem::size_of::<P::Step>()
    }

    fn is_global(&self) -> bool {
        self.validator.options().vertex_uniqueness == UniquenessLevel::Global
    }

    fn clear_shell(&mut self) {
        self.monitor
            .decrease_memory_usage(self.shell_len * Self::step_size());
        self.shell.clear();
        self.shell_len = 0;
    }

    fn add_to_shell(&mut self, step: P::Step) -> TraversalResult<()> {
        self.monitor.increase_memory_usage(Self::step_size())?;
        self.shell.entry(step.vertex().clone()).or_default().push(step);
        self.shell_len += 1;
        Ok(())
    }

    fn clear(&mut self) {
        self.queue.clear();
        self.store.reset();
        self.validator.reset();
        self.clear_shell();
        self.depth = 0;
    }

    /// 以 `center` 为根重新开始，根步骤放入 shell
    fn reset(&mut self, center: &VertexRef, depth: usize) -> TraversalResult<()> {
        self.clear();
        self.provider.clear();
        let first = self.provider.start_vertex(center, depth, 0.0);
        self.add_to_shell(first)
    }

    /// 当前深度的步骤已全部展开
    fn is_done_with_depth(&self) -> bool {
        self.queue.is_empty()
    }

    /// 既没有待展开的步骤，也没有新发现的步骤
    fn no_path_left(&self) -> bool {
        self.queue.is_empty() && self.shell.is_empty()
    }

    /// 把 shell 移入队列，进入下一深度
    fn start_next_depth(&mut self) -> TraversalResult<()> {
        let shell = std::mem::take(&mut self.shell);
        self.monitor
            .decrease_memory_usage(self.shell_len * Self::step_size());
        self.shell_len = 0;

        for steps in shell.into_values() {
            for step in steps {
                self.queue.append(step)?;
            }
        }
        self.depth += 1;
        log::trace!("{:?} 侧进入深度 {}", self.side, self.depth);
        Ok(())
    }

    /// 队首是松散端时批量获取队列中的所有松散端
    async fn fetch_loose_ends(&mut self) -> TraversalResult<()> {
        if self.queue.has_processable_element() {
            return Ok(());
        }
        let loose_ends = self.queue.loose_ends();
        self.provider.fetch(loose_ends).await
    }

    /// 展开队列中的下一个步骤，新步骤与另一侧 shell 配对
    ///
    /// 调用前队首必须已获取。
    fn compute_neighbourhood_of_next_vertex(
        &mut self,
        other: &Ball<P, Q, St>,
        options: &EnumeratorOptions,
        results: &mut VecDeque<(P::Step, P::Step)>,
    ) -> TraversalResult<()> {
        let Some(step) = self.queue.pop() else {
            return Ok(());
        };

        // 同一顶点可能在提交前进入 shell 多次，出队时重新检查
        let validation = self.validator.validate_path(&self.store, &step);
        if validation.is_filtered() {
            self.stats.incr_filtered();
            return Ok(());
        }

        let index = self.store.append(step)?;
        self.validator.commit(self.store.get_step(index));

        let children = self.provider.expand(self.store.get_step(index), index)?;
        for child in children {
            if self.validator.validate_path(&self.store, &child).is_filtered() {
                self.stats.incr_filtered();
                continue;
            }
            // shell 中的步骤尚未提交，GLOBAL 下同一顶点只保留先到的一个
            if self.is_global() && self.shell.contains_key(child.vertex()) {
                self.stats.incr_filtered();
                continue;
            }
            self.match_results_in_shell(&child, other, options, results);
            self.add_to_shell(child)?;
        }
        Ok(())
    }

    /// 与另一侧 shell 中同一顶点的步骤配对
    ///
    /// GLOBAL 下终点只能被访问一次，最多产生一条结果。
    fn match_results_in_shell(
        &self,
        candidate: &P::Step,
        other: &Ball<P, Q, St>,
        options: &EnumeratorOptions,
        results: &mut VecDeque<(P::Step, P::Step)>,
    ) {
        if self.is_global() && !results.is_empty() {
            return;
        }
        let Some(matches) = other.shell.get(candidate.vertex()) else {
            return;
        };

        for other_step in matches {
            let (left, left_store, right, right_store) = match self.side {
                BallSide::Left => (candidate, &self.store, other_step, &other.store),
                BallSide::Right => (other_step, &other.store, candidate, &self.store),
            };
            if left.depth() + right.depth() < options.min_depth {
                continue;
            }
            if self
                .validator
                .validate_joined(left_store, left, right_store, right)
                .is_filtered()
            {
                continue;
            }
            results.push_back((left.clone(), right.clone()));
            if self.is_global() {
                return;
            }
        }
    }

    fn steal_stats(&mut self) -> TraversalStats {
        let mut stats = self.stats.steal();
        stats += self.provider.steal_stats();
        stats
    }
}

impl<P, Q, St> Drop for Ball<P, Q, St>
where
    P: Provider,
{
    fn drop(&mut self) {
        self.monitor
            .decrease_memory_usage(self.shell_len * std::mem::size_of::<P::Step>());
    }
}

/// 双向枚举器
pub struct TwoSidedEnumerator<P, Q = FifoQueue<<P as Provider>::Step>, St = PathStore<<P as Provider>::Step>>
where
    P: Provider,
{
    left: Ball<P, Q, St>,
    right: Ball<P, Q, St>,
    options: EnumeratorOptions,
    results: VecDeque<(P::Step, P::Step)>,
    /// 正在推进当前深度的一侧
    active: BallSide,
    algorithm_finished: bool,
}

impl<P: Provider> TwoSidedEnumerator<P> {
    /// `left_provider` 沿正方向扩展，`right_provider` 沿反方向扩展，两侧共享 `monitor`
    pub fn new(
        left_provider: P,
        right_provider: P,
        options: EnumeratorOptions,
        validator_options: PathValidatorOptions,
        monitor: Arc<ResourceMonitor>,
    ) -> Self {
        let left = Ball::new(
            BallSide::Left,
            left_provider,
            FifoQueue::new(monitor.clone()),
            PathStore::new(monitor.clone()),
            validator_options,
            monitor.clone(),
        );
        let right = Ball::new(
            BallSide::Right,
            right_provider,
            FifoQueue::new(monitor.clone()),
            PathStore::new(monitor.clone()),
            validator_options,
            monitor,
        );
        Self::from_balls(left, right, options)
    }
}

impl<P, Q, St> TwoSidedEnumerator<P, Q, St>
where
    P: Provider,
    Q: Queue<P::Step>,
    St: PathStorage<P::Step>,
{
    pub fn from_balls(left: Ball<P, Q, St>, right: Ball<P, Q, St>, options: EnumeratorOptions) -> Self {
        assert_eq!(left.side(), BallSide::Left, "左侧 Ball 方向错误");
        assert_eq!(right.side(), BallSide::Right, "右侧 Ball 方向错误");
        Self {
            left,
            right,
            options,
            results: VecDeque::new(),
            active: BallSide::Left,
            algorithm_finished: false,
        }
    }

    pub fn options(&self) -> &EnumeratorOptions {
        &self.options
    }

    pub fn left(&self) -> &Ball<P, Q, St> {
        &self.left
    }

    pub fn right(&self) -> &Ball<P, Q, St> {
        &self.right
    }

    /// 开始从 `source` 到 `target` 的新搜索
    pub fn reset(&mut self, source: &VertexRef, target: &VertexRef) -> TraversalResult<()> {
        self.clear();
        log::debug!("双向枚举重置: {} -> {}", source, target);
        self.left.reset(source, 0)?;
        self.right.reset(target, 0)?;
        self.test_depth_zero();
        Ok(())
    }

    /// 起点即终点时，长度为 0 的路径
    fn test_depth_zero(&mut self) {
        if self.options.min_depth > 0 {
            return;
        }
        let Some(left_steps) = self.left.shell.values().next() else {
            return;
        };
        let Some(right_steps) = self.right.shell.get(left_steps[0].vertex()) else {
            return;
        };
        self.results
            .push_back((left_steps[0].clone(), right_steps[0].clone()));
        if self.left.is_global() {
            self.algorithm_finished = true;
        }
    }

    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
        self.results.clear();
        self.active = BallSide::Left;
        self.algorithm_finished = false;
    }

    pub fn destroy_engines(&mut self) {
        self.left.provider.destroy_engines();
        self.right.provider.destroy_engines();
    }

    pub fn is_done(&self) -> bool {
        self.results.is_empty() && self.search_done()
    }

    /// 任一侧无路可走时不可能再有交汇点
    fn search_done(&self) -> bool {
        self.left.no_path_left() || self.right.no_path_left() || self.algorithm_finished
    }

    pub fn set_algorithm_finished(&mut self) {
        self.algorithm_finished = true;
    }

    pub fn is_algorithm_finished(&self) -> bool {
        self.algorithm_finished
    }

    /// 深度较浅的一侧先推进；深度相同时选 shell 较小的一侧
    fn choose_side(&self) -> BallSide {
        if self.left.depth() != self.right.depth() {
            if self.left.depth() < self.right.depth() {
                BallSide::Left
            } else {
                BallSide::Right
            }
        } else if self.right.shell_size() < self.left.shell_size() {
            BallSide::Right
        } else {
            BallSide::Left
        }
    }

    fn active_ball(&self) -> &Ball<P, Q, St> {
        match self.active {
            BallSide::Left => &self.left,
            BallSide::Right => &self.right,
        }
    }

    async fn search_more_results(&mut self) -> TraversalResult<()> {
        while self.results.is_empty() && !self.search_done() {
            if self.active_ball().is_done_with_depth() {
                if self.left.depth() + self.right.depth() >= self.options.max_depth {
                    self.set_algorithm_finished();
                    break;
                }
                self.active = self.choose_side();
                match self.active {
                    BallSide::Left => self.left.start_next_depth()?,
                    BallSide::Right => self.right.start_next_depth()?,
                }
                continue;
            }

            match self.active {
                BallSide::Left => {
                    self.left.fetch_loose_ends().await?;
                    self.left
                        .compute_neighbourhood_of_next_vertex(&self.right, &self.options, &mut self.results)?;
                }
                BallSide::Right => {
                    self.right.fetch_loose_ends().await?;
                    self.right
                        .compute_neighbourhood_of_next_vertex(&self.left, &self.options, &mut self.results)?;
                }
            }
            if self.left.is_global() && !self.results.is_empty() {
                self.set_algorithm_finished();
            }
        }
        Ok(())
    }

    /// 物化结果前获取两侧结果步骤的数据
    async fn fetch_results(&mut self) -> TraversalResult<()> {
        let mut left_loose = Vec::new();
        let mut right_loose = Vec::new();
        for (left, right) in self.results.iter_mut() {
            if left.is_loose_end() {
                left_loose.push(left);
            }
            if right.is_loose_end() {
                right_loose.push(right);
            }
        }
        if left_loose.is_empty() && right_loose.is_empty() {
            return Ok(());
        }

        futures::try_join!(
            self.left.provider.fetch(left_loose),
            self.right.provider.fetch(right_loose)
        )?;
        Ok(())
    }

    /// 取出下一条路径，顶点顺序为起点到终点
    pub async fn get_next_path(&mut self) -> TraversalResult<Option<PathResult>> {
        loop {
            self.search_more_results().await?;
            if self.results.is_empty() {
                return Ok(None);
            }
            self.fetch_results().await?;

            let Some((left, right)) = self.results.pop_front() else {
                return Ok(None);
            };
            let mut path = PathResult::new();
            self.left.store.build_path(&left, &mut path);
            self.right.store.reverse_build_path(&right, &mut path);
            if path.is_valid() {
                return Ok(Some(path));
            }
            log::warn!("丢弃结构无效的双向路径结果: {:?}", path.vertex_ids());
        }
    }

    pub async fn skip_path(&mut self) -> TraversalResult<bool> {
        self.search_more_results().await?;
        Ok(self.results.pop_front().is_some())
    }

    pub fn steal_stats(&mut self) -> TraversalStats {
        let mut stats = self.left.steal_stats();
        stats += self.right.steal_stats();
        stats
    }
}
