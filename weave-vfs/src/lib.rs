//! Weave Virtual File System
//!
//! A virtual file system abstraction with multiple backend implementations.
//! The source parser reads package directories through it, so tests can run
//! entirely in memory.
//!
//! # Usage
//! ```rust,ignore
//! use weave_vfs::{VirtualFileSystem, MemoryFileSystem};
//! use std::path::Path;
//!
//! let fs = MemoryFileSystem::new();
//! fs.write_file(Path::new("/app/web/web.go"), b"package web").unwrap();
//! let entries = fs.read_dir(Path::new("/app/web")).unwrap();
//! ```

mod error;
mod memory;
mod native;
mod r#trait;

pub use error::{VfsError, VfsResult};
pub use memory::MemoryFileSystem;
pub use native::NativeFileSystem;
pub use r#trait::VirtualFileSystem;

/// Create a new memory-based file system.
pub fn memory_fs() -> MemoryFileSystem {
    MemoryFileSystem::new()
}

/// Create a new native file system.
pub fn native_fs() -> NativeFileSystem {
    NativeFileSystem::new()
}
