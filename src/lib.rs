//! Weave - compile-time dependency injection
//!
//! Weave reads constructor functions and struct declarations from Go
//! packages, resolves the dependency graph for a requested set of types and
//! generates a provider function that wires everything together.
//!
//! # Architecture
//!
//! ```text
//! weave-config/  - Project file data structures (weave.json)
//! weave-vfs/     - Virtual file system (memory / native)
//! weave-core/    - Parser, module resolution, graph loading, generation
//! weave-api/     - Orchestration (Weaver, RunConfig, WeaveError)
//! weave-cli/     - `weave` binary
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use weave_workspace::{ProjectConfig, RunConfig, Weaver};
//! use weave_vfs::NativeFileSystem;
//!
//! let vfs = Arc::new(NativeFileSystem::new());
//! let project = ProjectConfig::from_json(&std::fs::read_to_string("weave.json")?)?;
//! let config = RunConfig::from_project(&project, ".".as_ref(), vfs.as_ref())?;
//! let weaver = Weaver::new(vfs, config);
//! weaver.write(&weaver.generate_project(&project)?)?;
//! ```

pub use weave_api::*;
