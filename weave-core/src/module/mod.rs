//! 模块系统
//!
//! 模块标识符到目录的解析，以及按目录缓存的包解析。

pub mod cache;
pub mod resolver;

pub use cache::{PackageError, PackageParser, SourceParser};
pub use resolver::{read_module_id, ModuleMap, ModuleResolver, ResolveError};
