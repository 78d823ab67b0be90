//! 枚举器配置

use serde::{Deserialize, Serialize};

use crate::core::{TraversalError, TraversalOrder, TraversalResult};

/// 枚举器选项
///
/// 单向枚举：深度在 `[min_depth, max_depth]` 内的步骤作为结果，深度小于 `max_depth` 的步骤继续展开。
/// 双向枚举：两侧深度之和即路径长度，同样受这两个边界约束。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumeratorOptions {
    pub min_depth: usize,
    pub max_depth: usize,
    /// 单向枚举使用的队列
    pub order: TraversalOrder,
}

impl Default for EnumeratorOptions {
    fn default() -> Self {
        Self {
            min_depth: 1,
            max_depth: 1,
            order: TraversalOrder::Bfs,
        }
    }
}

impl EnumeratorOptions {
    pub fn new(min_depth: usize, max_depth: usize) -> Self {
        Self {
            min_depth,
            max_depth,
            ..Self::default()
        }
    }

    pub fn with_order(mut self, order: TraversalOrder) -> Self {
        self.order = order;
        self
    }

    pub fn validate(&self) -> TraversalResult<()> {
        if self.min_depth > self.max_depth {
            return Err(TraversalError::Config(format!(
                "min_depth ({}) 不能大于 max_depth ({})",
                self.min_depth, self.max_depth
            )));
        }
        Ok(())
    }

    pub fn is_result_depth(&self, depth: usize) -> bool {
        depth >= self.min_depth && depth <= self.max_depth
    }

    pub fn can_expand(&self, depth: usize) -> bool {
        depth < self.max_depth
    }
}
