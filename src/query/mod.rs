// Query module
//
// 查询执行中的路径枚举部分：执行器通过 `PathEnumerator` 逐条拉取路径

pub mod path_enumeration;

pub use path_enumeration::{EnumeratorFactory, PathEnumerator, PathResult, TraversalStats};
