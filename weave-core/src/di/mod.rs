//! 编译期依赖注入
//!
//! 流程：[`load`] 从目标出发查找声明、构造依赖图；[`hoist`] 把与单次调用无关的
//! 子树提升为参数；[`generate`] 遍历依赖图生成 [`Provider`]。

pub mod declaration;
pub mod dependency;
pub mod error;
pub mod finder;
pub mod generator;
pub mod graph;
pub mod hoist;
pub mod loader;
pub mod names;
pub mod provider;
pub mod target;

pub use declaration::{Construct, Declaration, Field, Function, Param, ResultField, Struct};
pub use dependency::{DescriptorError, Dependency};
pub use error::{DiError, DiErrorKind, GenerateError, Rejection};
pub use finder::Finder;
pub use generator::{generate, Scope};
pub use graph::{Graph, Node, NodeId};
pub use hoist::hoist;
pub use loader::load;
pub use provider::{External, FieldValue, Import, Provider, ResultValue, Statement, Variable};
pub use target::Target;
