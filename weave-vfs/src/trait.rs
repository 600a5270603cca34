//! VirtualFileSystem trait definition

use crate::error::VfsResult;
use std::path::{Path, PathBuf};

/// Virtual File System trait
///
/// Provides a unified interface for file operations, decoupling code from
/// specific file system implementations.
///
/// # Implementations
/// - `MemoryFileSystem`: In-memory file system
/// - `NativeFileSystem`: Native OS file system
pub trait VirtualFileSystem: Send + Sync {
    /// Read file contents
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>>;

    /// Write file contents
    ///
    /// Creates the file (and missing parent directories) if it doesn't
    /// exist, truncates it if it does.
    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()>;

    /// List the direct children of a directory, sorted by path
    ///
    /// # Returns
    /// Child paths (files and directories), or VfsError if `path` is not a directory
    fn read_dir(&self, path: &Path) -> VfsResult<Vec<PathBuf>>;

    /// Check if path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Read a file as UTF-8 text
    fn read_to_string(&self, path: &Path) -> VfsResult<String> {
        let content = self.read_file(path)?;
        String::from_utf8(content).map_err(|_| crate::VfsError::InvalidUtf8 {
            path: path.to_string_lossy().to_string(),
        })
    }
}
