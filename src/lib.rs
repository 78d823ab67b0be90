//! GraphDB Traversal - 图数据库查询执行器的路径枚举引擎
//!
//! 从起点（双向搜索时还有终点）出发，按需从外部数据源获取图数据，
//! 在顶点/边唯一性约束和内存配额下惰性地枚举路径。

pub mod config;
pub mod core;
pub mod query;
pub mod utils;
