pub mod error;
pub mod memory;
pub mod types;

// 错误和结果类型
pub use error::{ErrorCode, PublicError, ToPublicError, TraversalError, TraversalResult};

// 内存配额
pub use memory::{ResourceMonitor, ResourceUsageScope, DEFAULT_MEMORY_LIMIT};

// 核心数据类型
pub use types::{EdgeDirection, EdgeRef, TraversalOrder, UniquenessLevel, VertexRef};
