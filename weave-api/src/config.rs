//! API 层配置
//!
//! 包含运行配置 RunConfig 和全局单例（供 CLI 使用）

use crate::error::WeaveError;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use weave_config::ProjectConfig;
use weave_core::read_module_id;
use weave_vfs::VirtualFileSystem;

/// Generation configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunConfig {
    /// Directory holding `weave.json`; relative paths resolve against it
    pub project_root: PathBuf,
    /// Root module identifier
    pub module: String,
    /// Standard-library source directory
    pub std_dir: Option<PathBuf>,
    /// Module prefix -> directory
    pub dependencies: Vec<(String, PathBuf)>,
    /// Default hoisting mode
    pub hoist: bool,
}

impl RunConfig {
    /// Build from a project file
    ///
    /// When the project file names no module, the `module` line of
    /// `<root>/go.mod` is used.
    pub fn from_project(
        project: &ProjectConfig,
        root: &Path,
        vfs: &dyn VirtualFileSystem,
    ) -> Result<Self, WeaveError> {
        let module = match &project.module {
            Some(module) => module.clone(),
            None => {
                let go_mod = vfs.read_to_string(&root.join("go.mod"))?;
                read_module_id(&go_mod).ok_or_else(|| {
                    WeaveError::Config(format!(
                        "no module line in {}",
                        root.join("go.mod").display()
                    ))
                })?
            }
        };

        Ok(Self {
            project_root: root.to_path_buf(),
            module,
            std_dir: project.std.as_ref().map(|dir| root.join(dir)),
            dependencies: project
                .dependencies
                .iter()
                .map(|(prefix, dir)| (prefix.clone(), root.join(dir)))
                .collect(),
            hoist: project.hoist,
        })
    }
}

// Global config singleton for CLI convenience
static GLOBAL_CONFIG: OnceCell<RunConfig> = OnceCell::new();

/// Initialize global configuration (must be called once before any operation)
///
/// # Panics
/// If config is already initialized
pub fn init(config: RunConfig) {
    GLOBAL_CONFIG
        .set(config)
        .expect("Config already initialized");
}

/// Get global config reference
///
/// # Panics
/// If config is not initialized
pub fn config() -> &'static RunConfig {
    GLOBAL_CONFIG.get().expect("Config not initialized")
}

/// Check if config is initialized
pub fn is_initialized() -> bool {
    GLOBAL_CONFIG.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_vfs::MemoryFileSystem;

    #[test]
    fn test_from_project_explicit_module() {
        let project = ProjectConfig::from_json(
            r#"{"module": "example.com/app", "std": "/goroot", "dependencies": {"example.com/lib": "vendor/lib"}, "hoist": true}"#,
        )
        .unwrap();
        let cfg = RunConfig::from_project(&project, Path::new("/work"), &MemoryFileSystem::new())
            .unwrap();
        assert_eq!(cfg.module, "example.com/app");
        assert_eq!(cfg.std_dir, Some(PathBuf::from("/goroot")));
        assert_eq!(
            cfg.dependencies,
            vec![("example.com/lib".to_string(), PathBuf::from("/work/vendor/lib"))]
        );
        assert!(cfg.hoist);
    }

    #[test]
    fn test_from_project_reads_go_mod() {
        let fs = MemoryFileSystem::with_files(vec![(
            "/work/go.mod",
            b"module example.com/app\n\ngo 1.22\n".to_vec(),
        )]);
        let cfg = RunConfig::from_project(&ProjectConfig::default(), Path::new("/work"), &fs)
            .unwrap();
        assert_eq!(cfg.module, "example.com/app");
    }

    #[test]
    fn test_from_project_without_module() {
        let fs = MemoryFileSystem::with_files(vec![("/work/go.mod", b"go 1.22\n".to_vec())]);
        let err = RunConfig::from_project(&ProjectConfig::default(), Path::new("/work"), &fs)
            .unwrap_err();
        assert!(matches!(err, WeaveError::Config(_)));

        let err = RunConfig::from_project(
            &ProjectConfig::default(),
            Path::new("/missing"),
            &MemoryFileSystem::new(),
        )
        .unwrap_err();
        assert!(matches!(err, WeaveError::Io(_)));
    }

    #[test]
    fn test_global_config_init_and_get() {
        // 全局状态只能初始化一次，已初始化时跳过
        if !is_initialized() {
            init(RunConfig {
                module: "example.com/app".to_string(),
                ..Default::default()
            });
            assert!(is_initialized());
            assert_eq!(config().module, "example.com/app");
        }
    }
}
