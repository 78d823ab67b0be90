//! 路径枚举引擎
//!
//! 按需从 Provider 获取图数据，在唯一性约束和内存配额下惰性枚举路径。
//!
//! - `step` / `path_store`：步骤与只追加的步骤数组，通过父下标重建路径
//! - `validator`：顶点/边唯一性检查
//! - `queue`：遍历前沿
//! - `enumerators`：单向与双向枚举器
//! - `provider`：数据提供者契约及内存实现
//! - `tracer`：透明的追踪装饰器

pub mod enumerators;
pub mod options;
pub mod path_result;
pub mod path_store;
pub mod provider;
pub mod queue;
pub mod stats;
pub mod step;
pub mod tracer;
pub mod validator;

pub use enumerators::{
    Ball, BallSide, BreadthFirstEnumerator, DepthFirstEnumerator, EnumeratorFactory, KPathEnumerator,
    OneSidedEnumerator, PathEnumerator, TracedBreadthFirstEnumerator, TracedKPathEnumerator,
    TwoSidedEnumerator, WeightedEnumerator,
};
pub use options::EnumeratorOptions;
pub use path_result::PathResult;
pub use path_store::{PathStorage, PathStore};
pub use provider::{MockGraph, MockGraphProvider, MockProviderOptions, Provider};
pub use queue::{FifoQueue, LifoQueue, Queue, WeightedQueue};
pub use stats::TraversalStats;
pub use step::{BaseStep, FetchStatus, ProviderStep, Step};
pub use tracer::{PathStoreTracer, ProviderTracer, QueueTracer, TraceEntry};
pub use validator::{PathValidator, PathValidatorOptions, ValidationResult};
