//! Weave Core - compile-time dependency injection (pure logic, no terminal IO)
//!
//! Contains the declaration parser, module resolution, the dependency graph
//! loader and the provider code generator.
//! Source files are only read through `weave_vfs::VirtualFileSystem`.
//!
//! Configuration is passed explicitly via parameters, not via global state.

pub mod di;
pub mod module;
pub mod source;

// Re-export common types
pub use di::{
    generate, hoist, load, Declaration, DescriptorError, DiError, DiErrorKind, Dependency, Finder,
    GenerateError, Graph, Node, NodeId, Provider, Target,
};
pub use module::{
    read_module_id, ModuleMap, ModuleResolver, PackageError, PackageParser, ResolveError,
    SourceParser,
};
pub use source::{Package, ParseError, SourceFile};

// Re-export config types from weave-config
pub use weave_config::Phase;
