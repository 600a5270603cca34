//! Native file system implementation

use crate::error::{VfsError, VfsResult};
use crate::VirtualFileSystem;
use std::path::{Path, PathBuf};

/// A native OS file system implementation.
///
/// This wraps `std::fs` operations and provides the `VirtualFileSystem`
/// interface for local file access.
#[derive(Debug, Clone, Default)]
pub struct NativeFileSystem {}

impl NativeFileSystem {
    /// Create a new native file system.
    pub fn new() -> Self {
        Self {}
    }
}

fn map_io_error(path: &Path, err: std::io::Error) -> VfsError {
    match err.kind() {
        std::io::ErrorKind::NotFound => VfsError::NotFound {
            path: path.to_string_lossy().to_string(),
        },
        std::io::ErrorKind::PermissionDenied => VfsError::PermissionDenied {
            path: path.to_string_lossy().to_string(),
        },
        _ => err.into(),
    }
}

impl VirtualFileSystem for NativeFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| map_io_error(path, e))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| map_io_error(parent, e))?;
            }
        }
        std::fs::write(path, content).map_err(|e| map_io_error(path, e))
    }

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<PathBuf>> {
        if path.is_file() {
            return Err(VfsError::NotADirectory {
                path: path.to_string_lossy().to_string(),
            });
        }
        let mut entries = std::fs::read_dir(path)
            .map_err(|e| map_io_error(path, e))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_io_error(path, e))?;
        entries.sort();
        Ok(entries)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("weave_vfs_{}_{}", name, std::process::id()))
    }

    #[test]
    fn test_native_read_write() {
        let fs = NativeFileSystem::new();
        let temp_file = temp_path("rw");
        let _ = std::fs::remove_file(&temp_file);

        fs.write_file(&temp_file, b"hello native").unwrap();
        assert_eq!(fs.read_file(&temp_file).unwrap(), b"hello native");

        std::fs::remove_file(&temp_file).unwrap();
    }

    #[test]
    fn test_native_write_creates_parents() {
        let fs = NativeFileSystem::new();
        let dir = temp_path("nested");
        let file = dir.join("gen").join("load.go");

        fs.write_file(&file, b"package gen").unwrap();
        assert!(fs.is_dir(&dir.join("gen")));
        assert_eq!(fs.read_dir(&dir.join("gen")).unwrap(), vec![file.clone()]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_native_read_nonexistent() {
        let fs = NativeFileSystem::new();
        let missing = temp_path("nonexistent");
        assert!(!fs.exists(&missing));
        assert!(matches!(
            fs.read_file(&missing).unwrap_err(),
            VfsError::NotFound { .. }
        ));
    }
}
