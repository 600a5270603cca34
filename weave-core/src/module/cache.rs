//! 包解析缓存
//!
//! 按目录解析 `*.go` 文件并缓存结果。缓存归 [`SourceParser`] 所有，
//! 可被多个线程同时读取，写入时持有写锁。

use crate::source::{parse_source, Package, ParseError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{debug, trace};
use weave_vfs::{VfsError, VirtualFileSystem};

/// 包解析错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PackageError {
    #[error("failed to read package: {0}")]
    Vfs(#[from] VfsError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("no source files in '{}'", .dir.display())]
    NoSourceFiles { dir: PathBuf },

    #[error("found packages '{first}' and '{second}' in '{}'", .dir.display())]
    MixedPackages {
        dir: PathBuf,
        first: String,
        second: String,
    },
}

/// 包解析接口
pub trait PackageParser: Send + Sync {
    fn parse_package(&self, dir: &Path) -> Result<Arc<Package>, PackageError>;
}

/// 读穿式包缓存
pub struct SourceParser {
    vfs: Arc<dyn VirtualFileSystem>,
    cache: RwLock<HashMap<PathBuf, Arc<Package>>>,
}

impl SourceParser {
    pub fn new(vfs: Arc<dyn VirtualFileSystem>) -> Self {
        Self {
            vfs,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// 使某个目录的缓存失效
    pub fn invalidate(&self, dir: &Path) {
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(dir);
        }
    }

    /// 清空缓存
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// 已缓存的包数量
    pub fn len(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_cached(&self, dir: &Path) -> Option<Arc<Package>> {
        let cache = self.cache.read().ok()?;
        cache.get(dir).cloned()
    }

    /// 解析目录（无缓存）
    fn load(&self, dir: &Path) -> Result<Package, PackageError> {
        let mut sources: Vec<PathBuf> = self
            .vfs
            .read_dir(dir)?
            .into_iter()
            .filter(|path| is_source_file(path) && self.vfs.is_file(path))
            .collect();
        sources.sort();

        if sources.is_empty() {
            return Err(PackageError::NoSourceFiles {
                dir: dir.to_path_buf(),
            });
        }

        let mut files = Vec::with_capacity(sources.len());
        for path in &sources {
            let source = self.vfs.read_to_string(path)?;
            let file = parse_source(path, &source)?;
            trace!(
                target: "weave::parser",
                file = %path.display(),
                funcs = file.funcs.len(),
                structs = file.structs.len(),
                "Parsed file"
            );
            files.push(file);
        }

        let name = files[0].package.clone();
        if let Some(other) = files.iter().find(|f| f.package != name) {
            return Err(PackageError::MixedPackages {
                dir: dir.to_path_buf(),
                first: name,
                second: other.package.clone(),
            });
        }

        Ok(Package {
            name,
            dir: dir.to_path_buf(),
            files,
        })
    }
}

impl PackageParser for SourceParser {
    fn parse_package(&self, dir: &Path) -> Result<Arc<Package>, PackageError> {
        if let Some(cached) = self.get_cached(dir) {
            trace!(target: "weave::parser", dir = %dir.display(), "Package cache hit");
            return Ok(cached);
        }

        let package = Arc::new(self.load(dir)?);
        debug!(
            target: "weave::parser",
            dir = %dir.display(),
            package = %package.name,
            files = package.files.len(),
            "Parsed package"
        );

        match self.cache.write() {
            Ok(mut cache) => Ok(cache
                .entry(dir.to_path_buf())
                .or_insert(package)
                .clone()),
            Err(_) => Ok(package),
        }
    }
}

fn is_source_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ParseErrorKind;
    use std::thread;
    use weave_vfs::MemoryFileSystem;

    fn fixture() -> (MemoryFileSystem, SourceParser) {
        let fs = MemoryFileSystem::with_files(vec![
            (
                "/app/web/b.go",
                b"package web\n\nfunc NewRouter() *Router { return nil }\n".to_vec(),
            ),
            (
                "/app/web/a.go",
                b"package web\n\ntype Router struct{}\n".to_vec(),
            ),
            (
                "/app/web/web_test.go",
                b"package web_test\n\nfunc broken(".to_vec(),
            ),
            ("/app/web/README.md", b"# web".to_vec()),
        ]);
        let parser = SourceParser::new(Arc::new(fs.clone()));
        (fs, parser)
    }

    #[test]
    fn test_parses_sorted_source_files() {
        let (_fs, parser) = fixture();
        let package = parser.parse_package(Path::new("/app/web")).unwrap();
        assert_eq!(package.name, "web");
        let paths: Vec<PathBuf> = package.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("/app/web/a.go"), PathBuf::from("/app/web/b.go")]
        );
        assert_eq!(package.funcs().count(), 1);
        assert_eq!(package.structs().count(), 1);
    }

    #[test]
    fn test_cache_hit_returns_same_package() {
        let (_fs, parser) = fixture();
        let first = parser.parse_package(Path::new("/app/web")).unwrap();
        let second = parser.parse_package(Path::new("/app/web")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(parser.len(), 1);
    }

    #[test]
    fn test_invalidate_rereads_directory() {
        let (fs, parser) = fixture();
        let before = parser.parse_package(Path::new("/app/web")).unwrap();
        fs.write_file(
            Path::new("/app/web/c.go"),
            b"package web\n\ntype Extra struct{}\n",
        )
        .unwrap();

        let cached = parser.parse_package(Path::new("/app/web")).unwrap();
        assert_eq!(cached.files.len(), 2);

        parser.invalidate(Path::new("/app/web"));
        let after = parser.parse_package(Path::new("/app/web")).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.files.len(), 3);

        parser.clear();
        assert!(parser.is_empty());
    }

    #[test]
    fn test_errors_are_not_cached() {
        let fs = MemoryFileSystem::with_files(vec![(
            "/app/bad/bad.go",
            b"package bad\nfunc New( {\n".to_vec(),
        )]);
        let parser = SourceParser::new(Arc::new(fs.clone()));
        let err = parser.parse_package(Path::new("/app/bad")).unwrap_err();
        match err {
            PackageError::Parse(e) => {
                assert_eq!(e.file.as_deref(), Some(Path::new("/app/bad/bad.go")));
                assert!(matches!(e.kind, ParseErrorKind::UnexpectedToken { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(parser.is_empty());

        fs.write_file(Path::new("/app/bad/bad.go"), b"package bad\n")
            .unwrap();
        assert!(parser.parse_package(Path::new("/app/bad")).is_ok());
    }

    #[test]
    fn test_missing_and_empty_directories() {
        let (fs, parser) = fixture();
        assert!(matches!(
            parser.parse_package(Path::new("/app/nowhere")),
            Err(PackageError::Vfs(_))
        ));

        fs.write_file(Path::new("/app/docs/notes.txt"), b"").unwrap();
        assert!(matches!(
            parser.parse_package(Path::new("/app/docs")),
            Err(PackageError::NoSourceFiles { .. })
        ));
    }

    #[test]
    fn test_mixed_packages() {
        let fs = MemoryFileSystem::with_files(vec![
            ("/app/x/a.go", b"package x".to_vec()),
            ("/app/x/b.go", b"package y".to_vec()),
        ]);
        let parser = SourceParser::new(Arc::new(fs));
        let err = parser.parse_package(Path::new("/app/x")).unwrap_err();
        assert_eq!(
            err,
            PackageError::MixedPackages {
                dir: PathBuf::from("/app/x"),
                first: "x".to_string(),
                second: "y".to_string(),
            }
        );
    }

    #[test]
    fn test_concurrent_parse() {
        let (_fs, parser) = fixture();
        let parser = Arc::new(parser);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let parser = Arc::clone(&parser);
                thread::spawn(move || parser.parse_package(Path::new("/app/web")).unwrap())
            })
            .collect();
        let packages: Vec<Arc<Package>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(packages.iter().all(|p| Arc::ptr_eq(p, &packages[0])));
    }
}
