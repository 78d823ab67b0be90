//! 路径枚举器
//!
//! 单向枚举器从一个起点向外扩展，双向枚举器从起点和终点同时扩展并在中间交汇。
//! 两者对调用方暴露同一个 `PathEnumerator` 接口，`EnumeratorFactory` 按配置组装。

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::TraversalConfig;
use crate::core::{ResourceMonitor, TraversalOrder, TraversalResult, VertexRef};
use crate::query::path_enumeration::options::EnumeratorOptions;
use crate::query::path_enumeration::path_result::PathResult;
use crate::query::path_enumeration::path_store::{PathStorage, PathStore};
use crate::query::path_enumeration::provider::Provider;
use crate::query::path_enumeration::queue::{FifoQueue, LifoQueue, Queue, WeightedQueue};
use crate::query::path_enumeration::stats::TraversalStats;
use crate::query::path_enumeration::tracer::{PathStoreTracer, ProviderTracer, QueueTracer};
use crate::query::path_enumeration::validator::PathValidatorOptions;

pub mod one_sided;
pub mod two_sided;

pub use one_sided::OneSidedEnumerator;
pub use two_sided::{Ball, BallSide, TwoSidedEnumerator};

/// 查询执行器使用的枚举接口
#[async_trait]
pub trait PathEnumerator: Send {
    /// 为 true 时不会再产生结果；为 false 不保证还有结果
    fn is_done(&self) -> bool;

    async fn get_next_path(&mut self) -> TraversalResult<Option<PathResult>>;

    /// 推进到下一条路径但不物化，返回是否跳过了一条路径
    async fn skip_path(&mut self) -> TraversalResult<bool>;

    fn steal_stats(&mut self) -> TraversalStats;

    fn clear(&mut self);

    fn destroy_engines(&mut self);

    /// 调用方已满足时提前结束，已确认的结果仍可取出
    fn set_algorithm_finished(&mut self);

    fn is_algorithm_finished(&self) -> bool;
}

#[async_trait]
impl<P, Q, St> PathEnumerator for OneSidedEnumerator<P, Q, St>
where
    P: Provider,
    Q: Queue<P::Step>,
    St: PathStorage<P::Step>,
{
    fn is_done(&self) -> bool {
        OneSidedEnumerator::is_done(self)
    }

    async fn get_next_path(&mut self) -> TraversalResult<Option<PathResult>> {
        OneSidedEnumerator::get_next_path(self).await
    }

    async fn skip_path(&mut self) -> TraversalResult<bool> {
        OneSidedEnumerator::skip_path(self).await
    }

    fn steal_stats(&mut self) -> TraversalStats {
        OneSidedEnumerator::steal_stats(self)
    }

    fn clear(&mut self) {
        OneSidedEnumerator::clear(self)
    }

    fn destroy_engines(&mut self) {
        OneSidedEnumerator::destroy_engines(self)
    }

    fn set_algorithm_finished(&mut self) {
        OneSidedEnumerator::set_algorithm_finished(self)
    }

    fn is_algorithm_finished(&self) -> bool {
        OneSidedEnumerator::is_algorithm_finished(self)
    }
}

#[async_trait]
impl<P, Q, St> PathEnumerator for TwoSidedEnumerator<P, Q, St>
where
    P: Provider,
    Q: Queue<P::Step>,
    St: PathStorage<P::Step>,
{
    fn is_done(&self) -> bool {
        TwoSidedEnumerator::is_done(self)
    }

    async fn get_next_path(&mut self) -> TraversalResult<Option<PathResult>> {
        TwoSidedEnumerator::get_next_path(self).await
    }

    async fn skip_path(&mut self) -> TraversalResult<bool> {
        TwoSidedEnumerator::skip_path(self).await
    }

    fn steal_stats(&mut self) -> TraversalStats {
        TwoSidedEnumerator::steal_stats(self)
    }

    fn clear(&mut self) {
        TwoSidedEnumerator::clear(self)
    }

    fn destroy_engines(&mut self) {
        TwoSidedEnumerator::destroy_engines(self)
    }

    fn set_algorithm_finished(&mut self) {
        TwoSidedEnumerator::set_algorithm_finished(self)
    }

    fn is_algorithm_finished(&self) -> bool {
        TwoSidedEnumerator::is_algorithm_finished(self)
    }
}

/// 广度优先
pub type BreadthFirstEnumerator<P> =
    OneSidedEnumerator<P, FifoQueue<<P as Provider>::Step>, PathStore<<P as Provider>::Step>>;

/// 深度优先
pub type DepthFirstEnumerator<P> =
    OneSidedEnumerator<P, LifoQueue<<P as Provider>::Step>, PathStore<<P as Provider>::Step>>;

/// 按累计权重由小到大
pub type WeightedEnumerator<P> =
    OneSidedEnumerator<P, WeightedQueue<<P as Provider>::Step>, PathStore<<P as Provider>::Step>>;

/// 带追踪的广度优先
pub type TracedBreadthFirstEnumerator<P> = OneSidedEnumerator<
    ProviderTracer<P>,
    QueueTracer<FifoQueue<<P as Provider>::Step>>,
    PathStoreTracer<PathStore<<P as Provider>::Step>>,
>;

/// 两点之间的 k 条路径
pub type KPathEnumerator<P> = TwoSidedEnumerator<P>;

/// 带追踪的双向枚举
pub type TracedKPathEnumerator<P> = TwoSidedEnumerator<
    ProviderTracer<P>,
    QueueTracer<FifoQueue<<P as Provider>::Step>>,
    PathStoreTracer<PathStore<<P as Provider>::Step>>,
>;

/// 路径枚举器工厂
pub struct EnumeratorFactory;

impl EnumeratorFactory {
    /// 创建单向枚举器，并以 `source` 为起点重置
    ///
    /// 队列由 `config.enumerator.order` 决定，`config.tracing` 为 true 时包装追踪装饰器。
    pub fn create_one_sided<P>(
        provider: P,
        config: &TraversalConfig,
        monitor: Arc<ResourceMonitor>,
        source: &VertexRef,
    ) -> TraversalResult<Box<dyn PathEnumerator>>
    where
        P: Provider + 'static,
    {
        config.enumerator.validate()?;
        let options = config.enumerator;
        let validator = config.validator;

        match (options.order, config.tracing) {
            (TraversalOrder::Bfs, false) => Self::one_sided(
                provider,
                FifoQueue::<P::Step>::new(monitor.clone()),
                PathStore::<P::Step>::new(monitor),
                options,
                validator,
                source,
            ),
            (TraversalOrder::Bfs, true) => Self::one_sided(
                ProviderTracer::new(provider),
                QueueTracer::new(FifoQueue::<P::Step>::new(monitor.clone())),
                PathStoreTracer::new(PathStore::<P::Step>::new(monitor)),
                options,
                validator,
                source,
            ),
            (TraversalOrder::Dfs, false) => Self::one_sided(
                provider,
                LifoQueue::<P::Step>::new(monitor.clone()),
                PathStore::<P::Step>::new(monitor),
                options,
                validator,
                source,
            ),
            (TraversalOrder::Dfs, true) => Self::one_sided(
                ProviderTracer::new(provider),
                QueueTracer::new(LifoQueue::<P::Step>::new(monitor.clone())),
                PathStoreTracer::new(PathStore::<P::Step>::new(monitor)),
                options,
                validator,
                source,
            ),
            (TraversalOrder::Weighted, false) => Self::one_sided(
                provider,
                WeightedQueue::<P::Step>::new(monitor.clone()),
                PathStore::<P::Step>::new(monitor),
                options,
                validator,
                source,
            ),
            (TraversalOrder::Weighted, true) => Self::one_sided(
                ProviderTracer::new(provider),
                QueueTracer::new(WeightedQueue::<P::Step>::new(monitor.clone())),
                PathStoreTracer::new(PathStore::<P::Step>::new(monitor)),
                options,
                validator,
                source,
            ),
        }
    }

    fn one_sided<P, Q, St>(
        provider: P,
        queue: Q,
        store: St,
        options: EnumeratorOptions,
        validator: PathValidatorOptions,
        source: &VertexRef,
    ) -> TraversalResult<Box<dyn PathEnumerator>>
    where
        P: Provider + 'static,
        Q: Queue<P::Step> + 'static,
        St: PathStorage<P::Step> + 'static,
    {
        let mut enumerator = OneSidedEnumerator::new(provider, queue, store, options, validator);
        enumerator.reset(source, 0, 0.0)?;
        Ok(Box::new(enumerator))
    }

    /// 创建双向枚举器，并以 `source`、`target` 重置
    ///
    /// `right` 必须沿与 `left` 相反的方向扩展；两侧共享 `monitor`。
    pub fn create_two_sided<P>(
        left: P,
        right: P,
        config: &TraversalConfig,
        monitor: Arc<ResourceMonitor>,
        source: &VertexRef,
        target: &VertexRef,
    ) -> TraversalResult<Box<dyn PathEnumerator>>
    where
        P: Provider + 'static,
    {
        config.enumerator.validate()?;
        let options = config.enumerator;
        let validator = config.validator;

        if config.tracing {
            let ball = |side: BallSide, provider: P| {
                Ball::new(
                    side,
                    ProviderTracer::new(provider),
                    QueueTracer::new(FifoQueue::<P::Step>::new(monitor.clone())),
                    PathStoreTracer::new(PathStore::<P::Step>::new(monitor.clone())),
                    validator,
                    monitor.clone(),
                )
            };
            let mut enumerator: TracedKPathEnumerator<P> =
                TwoSidedEnumerator::from_balls(ball(BallSide::Left, left), ball(BallSide::Right, right), options);
            enumerator.reset(source, target)?;
            Ok(Box::new(enumerator))
        } else {
            let mut enumerator: KPathEnumerator<P> =
                TwoSidedEnumerator::new(left, right, options, validator, monitor);
            enumerator.reset(source, target)?;
            Ok(Box::new(enumerator))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EdgeDirection, TraversalError};
    use crate::query::path_enumeration::provider::{MockGraph, MockGraphProvider, MockProviderOptions};

    fn graph() -> Arc<MockGraph> {
        let mut graph = MockGraph::new();
        graph.add_weighted_edge("v/a", "v/b", 3.0);
        graph.add_weighted_edge("v/a", "v/c", 1.0);
        graph.add_weighted_edge("v/b", "v/d", 1.0);
        graph.add_weighted_edge("v/c", "v/d", 1.0);
        Arc::new(graph)
    }

    async fn drain(enumerator: &mut dyn PathEnumerator) -> Vec<PathResult> {
        let mut paths = Vec::new();
        while let Some(path) = enumerator.get_next_path().await.expect("枚举失败") {
            paths.push(path);
        }
        paths
    }

    #[tokio::test]
    async fn test_factory_builds_every_order() {
        for order in [TraversalOrder::Bfs, TraversalOrder::Dfs, TraversalOrder::Weighted] {
            for tracing in [false, true] {
                let config = TraversalConfig {
                    enumerator: EnumeratorOptions::new(1, 2).with_order(order),
                    tracing,
                    ..TraversalConfig::default()
                };

                let provider = MockGraphProvider::new(graph(), MockProviderOptions::default());
                let mut enumerator = EnumeratorFactory::create_one_sided(
                    provider,
                    &config,
                    Arc::new(ResourceMonitor::unlimited()),
                    &VertexRef::new("v/a"),
                )
                .expect("创建枚举器失败");

                let paths = drain(enumerator.as_mut()).await;
                assert_eq!(paths.len(), 4, "{:?} tracing={}", order, tracing);
                assert!(enumerator.is_done());
            }
        }
    }

    #[tokio::test]
    async fn test_weighted_order_pops_lightest_first() {
        let config = TraversalConfig {
            enumerator: EnumeratorOptions::new(2, 2).with_order(TraversalOrder::Weighted),
            ..TraversalConfig::default()
        };

        let options = MockProviderOptions::default().with_weight_attribute("weight", 1.0);
        let mut enumerator = EnumeratorFactory::create_one_sided(
            MockGraphProvider::new(graph(), options),
            &config,
            Arc::new(ResourceMonitor::unlimited()),
            &VertexRef::new("v/a"),
        )
        .expect("创建枚举器失败");

        let paths = drain(enumerator.as_mut()).await;
        let ids: Vec<Vec<&str>> = paths.iter().map(|p| p.vertex_ids()).collect();
        assert_eq!(ids, vec![vec!["v/a", "v/c", "v/d"], vec!["v/a", "v/b", "v/d"]]);
        assert_eq!(paths[0].total_weight(), Some(2.0));
        assert_eq!(paths[1].total_weight(), Some(4.0));
    }

    #[tokio::test]
    async fn test_factory_two_sided() {
        for tracing in [false, true] {
            let config = TraversalConfig {
                enumerator: EnumeratorOptions::new(1, 4),
                tracing,
                ..TraversalConfig::default()
            };

            let left = MockGraphProvider::new(graph(), MockProviderOptions::new(EdgeDirection::Outbound));
            let right = left.reversed();
            let mut enumerator = EnumeratorFactory::create_two_sided(
                left,
                right,
                &config,
                Arc::new(ResourceMonitor::unlimited()),
                &VertexRef::new("v/a"),
                &VertexRef::new("v/d"),
            )
            .expect("创建枚举器失败");

            assert_eq!(drain(enumerator.as_mut()).await.len(), 2);
            assert!(enumerator.steal_stats().http_requests > 0);
            enumerator.destroy_engines();
        }
    }

    #[test]
    fn test_factory_rejects_invalid_depth_bounds() {
        let config = TraversalConfig {
            enumerator: EnumeratorOptions::new(3, 1),
            ..TraversalConfig::default()
        };
        let provider = MockGraphProvider::new(graph(), MockProviderOptions::default());
        let result = EnumeratorFactory::create_one_sided(
            provider,
            &config,
            Arc::new(ResourceMonitor::unlimited()),
            &VertexRef::new("v/a"),
        );
        assert!(matches!(result, Err(TraversalError::Config(_))));
    }
}
