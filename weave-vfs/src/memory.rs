//! In-memory file system implementation

use crate::error::{VfsError, VfsResult};
use crate::VirtualFileSystem;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// An in-memory file system implementation.
///
/// All files are stored in memory using a `BTreeMap`, making it suitable
/// for testing and scenarios where disk access is not desired. Directories
/// are implicit: a directory exists as long as some file lives below it.
///
/// # Example
/// ```
/// use weave_vfs::{MemoryFileSystem, VirtualFileSystem};
/// use std::path::Path;
///
/// let fs = MemoryFileSystem::new();
/// fs.write_file(Path::new("/app/main.go"), b"package main").unwrap();
/// assert!(fs.is_dir(Path::new("/app")));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    files: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryFileSystem {
    /// Create a new empty memory file system.
    pub fn new() -> Self {
        Self {
            files: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Create a new memory file system pre-populated with files.
    ///
    /// # Arguments
    /// * `files` - Iterator of (path, content) tuples
    pub fn with_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        let fs = Self::new();
        if let Ok(mut map) = fs.files.write() {
            for (path, content) in files {
                map.insert(normalize(path.as_ref()), content);
            }
        }
        fs
    }

    /// Number of stored files
    pub fn len(&self) -> usize {
        self.files.read().map(|files| files.len()).unwrap_or(0)
    }

    /// Whether no file is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key(&self, path: &Path) -> String {
        normalize(&path.to_string_lossy())
    }
}

/// Normalize a path string for internal storage.
/// Uses forward slashes consistently and drops trailing separators.
fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    if path.len() > 1 {
        path.trim_end_matches('/').to_string()
    } else {
        path
    }
}

/// Prefix every child of `dir` starts with
fn dir_prefix(dir: &str) -> String {
    if dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{}/", dir)
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let normalized = self.key(path);
        let files = self.files.read().map_err(|_| VfsError::Poisoned)?;

        files
            .get(&normalized)
            .cloned()
            .ok_or(VfsError::NotFound { path: normalized })
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        let normalized = self.key(path);
        let mut files = self.files.write().map_err(|_| VfsError::Poisoned)?;
        files.insert(normalized, content.to_vec());
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<PathBuf>> {
        let normalized = self.key(path);
        if !self.is_dir(path) {
            return Err(if self.is_file(path) {
                VfsError::NotADirectory { path: normalized }
            } else {
                VfsError::NotFound { path: normalized }
            });
        }

        let prefix = dir_prefix(&normalized);
        let files = self.files.read().map_err(|_| VfsError::Poisoned)?;

        let children: BTreeSet<String> = files
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .filter(|child| !child.is_empty())
            .map(|child| format!("{}{}", prefix, child))
            .collect();

        Ok(children.into_iter().map(PathBuf::from).collect())
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let normalized = self.key(path);
        match self.files.read() {
            Ok(files) => files.contains_key(&normalized),
            Err(_) => false,
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        let prefix = dir_prefix(&self.key(path));
        match self.files.read() {
            Ok(files) => files.keys().any(|key| key.starts_with(&prefix)),
            Err(_) => false,
        }
    }
}
