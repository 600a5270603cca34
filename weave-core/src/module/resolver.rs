//! 模块解析器
//!
//! 将模块标识符（import 路径）解析为目录，也支持反向查找。
//!
//! # 解析规则
//! - `example.com/app/web` → 根模块 `example.com/app` 下的 `web/`
//! - 依赖前缀按最长匹配选择目录
//! - 第一段不含 `.` 的标识符（如 `net/http`）视为标准库

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};
use weave_vfs::VirtualFileSystem;

/// 模块解析错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// 所有候选目录都不存在
    #[error("unable to resolve module '{module_id}' (tried: {})", join_paths(.tried))]
    Unresolvable {
        module_id: String,
        tried: Vec<PathBuf>,
    },
    /// 目录不属于任何已知模块
    #[error("directory '{}' is not inside any known module", .dir.display())]
    NotInModule { dir: PathBuf },
}

fn join_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// 模块解析接口
pub trait ModuleResolver: Send + Sync {
    /// 模块标识符 → 目录
    fn resolve_directory(&self, module_id: &str) -> Result<PathBuf, ResolveError>;

    /// 目录 → 模块标识符
    fn resolve_import_id(&self, dir: &Path) -> Result<String, ResolveError>;
}

/// 基于前缀映射的模块解析器
pub struct ModuleMap {
    vfs: Arc<dyn VirtualFileSystem>,
    root_module: String,
    root_dir: PathBuf,
    std_dir: Option<PathBuf>,
    /// 依赖模块前缀 → 目录
    dependencies: Vec<(String, PathBuf)>,
}

impl ModuleMap {
    /// 创建新的模块解析器
    ///
    /// # Arguments
    /// * `vfs` - 虚拟文件系统
    /// * `root_module` - 根模块标识符（go.mod 中的 module）
    /// * `root_dir` - 根模块所在目录
    pub fn new(
        vfs: Arc<dyn VirtualFileSystem>,
        root_module: impl Into<String>,
        root_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            vfs,
            root_module: root_module.into(),
            root_dir: root_dir.as_ref().to_path_buf(),
            std_dir: None,
            dependencies: Vec::new(),
        }
    }

    /// 设置标准库目录
    pub fn with_std_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.std_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// 添加依赖模块目录
    pub fn with_dependency(mut self, prefix: impl Into<String>, dir: impl AsRef<Path>) -> Self {
        self.dependencies
            .push((prefix.into(), dir.as_ref().to_path_buf()));
        self
    }

    pub fn root_module(&self) -> &str {
        &self.root_module
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// 根模块与依赖，按前缀长度降序
    fn prefixes(&self) -> Vec<(&str, &Path)> {
        let mut prefixes: Vec<(&str, &Path)> = std::iter::once((
            self.root_module.as_str(),
            self.root_dir.as_path(),
        ))
        .chain(
            self.dependencies
                .iter()
                .map(|(prefix, dir)| (prefix.as_str(), dir.as_path())),
        )
        .collect();
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        prefixes
    }

    fn candidates(&self, module_id: &str) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        for (prefix, dir) in self.prefixes() {
            if let Some(rest) = strip_module_prefix(module_id, prefix) {
                candidates.push(join_segments(dir, rest));
            }
        }
        if is_std_module(module_id) {
            if let Some(std_dir) = &self.std_dir {
                candidates.push(join_segments(std_dir, module_id));
            }
        }
        candidates
    }
}

impl ModuleResolver for ModuleMap {
    fn resolve_directory(&self, module_id: &str) -> Result<PathBuf, ResolveError> {
        let mut tried = Vec::new();
        for candidate in self.candidates(module_id) {
            trace!(target: "weave::parser", module = module_id, candidate = %candidate.display(), "Trying module directory");
            if self.vfs.is_dir(&candidate) {
                debug!(target: "weave::parser", module = module_id, dir = %candidate.display(), "Resolved module");
                return Ok(candidate);
            }
            tried.push(candidate);
        }
        Err(ResolveError::Unresolvable {
            module_id: module_id.to_string(),
            tried,
        })
    }

    fn resolve_import_id(&self, dir: &Path) -> Result<String, ResolveError> {
        let mut best: Option<(usize, String)> = None;
        let mut consider = |prefix: &str, base: &Path| {
            let Ok(rest) = dir.strip_prefix(base) else {
                return;
            };
            let depth = base.components().count();
            if best.as_ref().is_some_and(|(d, _)| *d >= depth) {
                return;
            }
            let rest: Vec<String> = rest
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            let id = match (prefix.is_empty(), rest.is_empty()) {
                (true, true) => return,
                (true, false) => rest.join("/"),
                (false, true) => prefix.to_string(),
                (false, false) => format!("{}/{}", prefix, rest.join("/")),
            };
            best = Some((depth, id));
        };

        for (prefix, base) in self.prefixes() {
            consider(prefix, base);
        }
        if let Some(std_dir) = &self.std_dir {
            consider("", std_dir);
        }

        best.map(|(_, id)| id).ok_or_else(|| ResolveError::NotInModule {
            dir: dir.to_path_buf(),
        })
    }
}

/// 标准库标识符：第一段不含 `.`
pub fn is_std_module(module_id: &str) -> bool {
    let first = module_id.split('/').next().unwrap_or_default();
    !first.is_empty() && !first.contains('.')
}

fn strip_module_prefix<'a>(module_id: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let rest = module_id.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}

fn join_segments(base: &Path, rest: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for segment in rest.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path
}

/// 读取 go.mod 中的 module 行
pub fn read_module_id(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let id = rest.trim().trim_matches('"');
        (!id.is_empty()).then(|| id.to_string())
    })
}
