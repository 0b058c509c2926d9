//! 缓存层
//!
//! 考试与题目定义在一场考试期间几乎不变，热路径上的目录读取走进程内缓存。

pub mod catalog_cache;

pub use catalog_cache::CachedCatalog;
