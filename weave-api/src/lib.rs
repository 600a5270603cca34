//! Weave API - generation orchestration layer
//!
//! Provides the unified generation interface, including:
//! - Target construction from the project file
//! - A `Weaver` session owning the module resolver and package cache
//! - Unified error handling (WeaveError)
//!
//! For CLI convenience, this crate provides a global configuration singleton.
//! For library use, prefer `Weaver::new(vfs, config)`.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};

use weave_core::{Finder, Graph, ModuleMap, ModuleResolver, SourceParser};
use weave_vfs::VirtualFileSystem;

// Re-export config
pub mod config;
pub use config::{config as get_config, init as init_config, is_initialized, RunConfig};

// Re-export config types from weave_config
pub use weave_config::{LogLevel, Phase, ProjectConfig, TargetConfig, PROJECT_FILE};

// Re-export error and types
pub mod error;
pub mod types;
pub use error::{ErrorReport, WeaveError};
pub use types::GeneratedFile;

// Re-export core types
pub use weave_config;
pub use weave_core::{Dependency, Provider, Target};

const LOG_TARGET: &str = "weave::api";

/// 从项目文件的目标描述构建 `Target`
///
/// 所有类型都以描述符字符串书写；`default_hoist` 在目标未指定时使用。
pub fn target_from_config(
    config: &TargetConfig,
    default_hoist: bool,
) -> Result<Target, WeaveError> {
    if config.name.is_empty() {
        return Err(WeaveError::Config("target without a name".to_string()));
    }
    if config.module.is_empty() {
        return Err(WeaveError::Config(format!(
            "target '{}' has no module",
            config.name
        )));
    }
    if config.results.is_empty() {
        return Err(WeaveError::Config(format!(
            "target '{}' requests no results",
            config.name
        )));
    }

    let mut target = Target::new(&config.name, &config.module)
        .with_hoist(config.hoist.unwrap_or(default_hoist));
    for param in &config.params {
        target = target.with_param(Dependency::parse(param)?);
    }
    for result in &config.results {
        target = target.with_result(Dependency::parse(result)?);
    }
    for (from, to) in &config.aliases {
        target = target.with_alias(Dependency::parse(from)?, Dependency::parse(to)?);
    }
    Ok(target)
}

/// 生成会话
///
/// 持有模块解析器和包缓存，同一会话内的所有目标共享已解析的包。
pub struct Weaver {
    vfs: Arc<dyn VirtualFileSystem>,
    resolver: ModuleMap,
    parser: SourceParser,
    config: RunConfig,
}

impl Weaver {
    pub fn new(vfs: Arc<dyn VirtualFileSystem>, config: RunConfig) -> Self {
        let mut resolver = ModuleMap::new(vfs.clone(), &config.module, &config.project_root);
        if let Some(std_dir) = &config.std_dir {
            resolver = resolver.with_std_dir(std_dir);
        }
        for (prefix, dir) in &config.dependencies {
            resolver = resolver.with_dependency(prefix, dir);
        }
        let parser = SourceParser::new(vfs.clone());
        Self {
            vfs,
            resolver,
            parser,
            config,
        }
    }

    /// Create a session from the global config
    ///
    /// # Panics
    /// If global config is not initialized
    pub fn from_global(vfs: Arc<dyn VirtualFileSystem>) -> Self {
        Self::new(vfs, get_config().clone())
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// 已缓存的包数量
    pub fn cached_packages(&self) -> usize {
        self.parser.len()
    }

    pub fn finder(&self) -> Finder<'_> {
        Finder::new(&self.resolver, &self.parser)
    }

    /// 加载依赖图（按目标设置提升）
    pub fn load(&self, target: &Target) -> Result<Graph, WeaveError> {
        Ok(weave_core::load(&self.finder(), target)?)
    }

    /// 加载并生成单个目标
    pub fn generate(&self, target: &Target) -> Result<Provider, WeaveError> {
        let graph = self.load(target)?;
        let provider = weave_core::generate(&graph, target)?;
        debug!(
            target: LOG_TARGET,
            name = %target.name,
            params = provider.externals.len(),
            statements = provider.statements.len(),
            "Generated provider"
        );
        Ok(provider)
    }

    /// 并行生成多个目标，结果保持输入顺序
    ///
    /// 同时运行的线程数不超过 `available_parallelism`，目标按批次处理。
    #[instrument(target = "weave::api", skip_all, fields(count = targets.len()))]
    pub fn generate_all(&self, targets: &[Target]) -> Vec<Result<Provider, WeaveError>> {
        let workers = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        self.generate_batched(targets, workers)
    }

    fn generate_batched(
        &self,
        targets: &[Target],
        workers: usize,
    ) -> Vec<Result<Provider, WeaveError>> {
        let mut results = Vec::with_capacity(targets.len());
        for batch in targets.chunks(workers.max(1)) {
            trace!(target: LOG_TARGET, size = batch.len(), "Generating batch");
            std::thread::scope(|scope| {
                let handles: Vec<_> = batch
                    .iter()
                    .map(|target| scope.spawn(move || self.generate(target)))
                    .collect();
                results.extend(handles.into_iter().zip(batch).map(|(handle, target)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(WeaveError::Config(format!(
                            "generation of '{}' panicked",
                            target.name
                        )))
                    })
                }));
            });
        }
        results
    }

    /// 生成项目文件中的所有目标
    ///
    /// 任一目标失败则返回第一个（按声明顺序）错误。
    #[instrument(target = "weave::api", skip_all, fields(module = %self.config.module))]
    pub fn generate_project(
        &self,
        project: &ProjectConfig,
    ) -> Result<Vec<GeneratedFile>, WeaveError> {
        if project.targets.is_empty() {
            return Err(WeaveError::Config("project declares no targets".to_string()));
        }
        let targets = project
            .targets
            .iter()
            .map(|target| target_from_config(target, self.config.hoist))
            .collect::<Result<Vec<_>, _>>()?;

        let providers = self.generate_all(&targets);
        let mut files = Vec::with_capacity(targets.len());
        for ((config, target), provider) in project.targets.iter().zip(&targets).zip(providers) {
            let provider = provider?;
            files.push(GeneratedFile {
                target: target.name.clone(),
                path: self.output_path(config)?,
                source: provider.file(),
                provider,
            });
        }
        info!(target: LOG_TARGET, files = files.len(), "Generated project");
        Ok(files)
    }

    /// 输出路径：显式 `output` 相对项目根目录，否则为目标模块目录下的 `<name>_gen.go`
    pub fn output_path(&self, config: &TargetConfig) -> Result<PathBuf, WeaveError> {
        if let Some(output) = &config.output {
            return Ok(self.config.project_root.join(output));
        }
        let dir = self
            .resolver
            .resolve_directory(&config.module)
            .map_err(|e| weave_core::DiError::new(e.into(), Vec::new()))?;
        Ok(dir.join(format!("{}_gen.go", snake_case(&config.name))))
    }

    /// 写出生成的文件
    pub fn write(&self, files: &[GeneratedFile]) -> Result<(), WeaveError> {
        for file in files {
            self.vfs.write_file(&file.path, file.source.as_bytes())?;
            info!(target: LOG_TARGET, path = %file.path.display(), "Wrote provider");
        }
        Ok(())
    }
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let after_lower = i > 0 && !chars[i - 1].is_uppercase();
            let before_lower = i > 0 && chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if after_lower || before_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use weave_vfs::MemoryFileSystem;

    fn fixture() -> Arc<MemoryFileSystem> {
        Arc::new(MemoryFileSystem::with_files(vec![
            ("/app/go.mod", b"module example.com/app\n".to_vec()),
            (
                "/app/config/config.go",
                b"package config\n\ntype Config struct{}\n\nfunc Load() *Config { return &Config{} }\n"
                    .to_vec(),
            ),
            (
                "/app/server/server.go",
                b"package server\n\nimport \"example.com/app/config\"\n\ntype Server struct{}\n\nfunc New(cfg *config.Config) (*Server, error) { return nil, nil }\n"
                    .to_vec(),
            ),
            ("/app/cmd/main.go", b"package main\n\nfunc main() {}\n".to_vec()),
        ]))
    }

    fn weaver(fs: Arc<MemoryFileSystem>) -> Weaver {
        Weaver::new(
            fs,
            RunConfig {
                project_root: PathBuf::from("/app"),
                module: "example.com/app".to_string(),
                ..Default::default()
            },
        )
    }

    fn server_target(name: &str) -> TargetConfig {
        TargetConfig {
            name: name.to_string(),
            module: "example.com/app/cmd".to_string(),
            results: vec!["*example.com/app/server.Server".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_target_from_config() {
        let mut config = server_target("Build");
        config.params = vec!["*example.com/app/config.Config".to_string()];
        config.aliases.insert(
            "example.com/app/store.Storer".to_string(),
            "*example.com/app/store.FileStore".to_string(),
        );
        let target = target_from_config(&config, true).unwrap();
        assert_eq!(target.name, "Build");
        assert!(target.hoist);
        assert_eq!(
            target.params,
            vec![Dependency::pointer("example.com/app/config", "Config")]
        );
        assert_eq!(target.aliases.len(), 1);

        config.hoist = Some(false);
        assert!(!target_from_config(&config, true).unwrap().hoist);
    }

    #[test]
    fn test_target_from_config_errors() {
        let mut config = server_target("Build");
        config.results.clear();
        assert!(matches!(
            target_from_config(&config, false),
            Err(WeaveError::Config(_))
        ));

        let mut config = server_target("Build");
        config.results = vec!["Server".to_string()];
        let err = target_from_config(&config, false).unwrap_err();
        assert!(matches!(err, WeaveError::Descriptor(_)));
        assert_eq!(err.phase(), "config");
    }

    #[test]
    fn test_generate_project_default_output() {
        let fs = fixture();
        let weaver = weaver(fs.clone());
        let project = ProjectConfig {
            targets: vec![server_target("InitializeServer")],
            ..Default::default()
        };

        let files = weaver.generate_project(&project).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(
            files[0].path,
            PathBuf::from("/app/cmd/initialize_server_gen.go")
        );
        // cmd 目录中的 main.go 声明 package main
        assert!(files[0]
            .source
            .starts_with("// Code generated by weave. DO NOT EDIT.\n\npackage main\n\n"));
        assert!(files[0].source.ends_with(
            "func InitializeServer() (*server.Server, error) {\n\
             \tconfigConfig := config.Load()\n\
             \tserverServer, err := server.New(configConfig)\n\
             \tif err != nil {\n\
             \t\treturn nil, err\n\
             \t}\n\
             \treturn serverServer, nil\n\
             }\n"
        ));

        weaver.write(&files).unwrap();
        assert_eq!(
            fs.read_to_string(Path::new("/app/cmd/initialize_server_gen.go"))
                .unwrap(),
            files[0].source
        );
    }

    #[test]
    fn test_generate_project_explicit_output() {
        let weaver = weaver(fixture());
        let mut target = server_target("InitializeServer");
        target.output = Some("gen/wire.go".to_string());
        let project = ProjectConfig {
            targets: vec![target],
            ..Default::default()
        };
        let files = weaver.generate_project(&project).unwrap();
        assert_eq!(files[0].path, PathBuf::from("/app/gen/wire.go"));
    }

    #[test]
    fn test_generate_project_reports_first_failure() {
        let weaver = weaver(fixture());
        let mut missing = server_target("Missing");
        missing.results = vec!["*example.com/app/server.Router".to_string()];
        let project = ProjectConfig {
            targets: vec![server_target("Ok"), missing],
            ..Default::default()
        };
        let err = weaver.generate_project(&project).unwrap_err();
        assert_eq!(err.phase(), "finder");
        assert!(err.to_string().contains("example.com/app/server.Router"));
    }

    #[test]
    fn test_generate_all_keeps_order_and_shares_cache() {
        let weaver = weaver(fixture());
        let targets: Vec<Target> = ["A", "B", "C"]
            .iter()
            .map(|name| target_from_config(&server_target(name), false).unwrap())
            .collect();

        let providers = weaver.generate_all(&targets);
        let names: Vec<_> = providers
            .iter()
            .map(|p| p.as_ref().unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        // cmd、config 与 server 三个包各解析一次
        assert_eq!(weaver.cached_packages(), 3);
    }

    #[test]
    fn test_generate_batches_more_targets_than_workers() {
        let weaver = weaver(fixture());
        let names = ["A", "B", "C", "D", "E"];
        let targets: Vec<Target> = names
            .iter()
            .map(|name| target_from_config(&server_target(name), false).unwrap())
            .collect();

        let providers = weaver.generate_batched(&targets, 2);
        assert_eq!(providers.len(), names.len());
        for (provider, name) in providers.iter().zip(names) {
            assert_eq!(provider.as_ref().unwrap().name, name);
        }
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("InitializeWeb"), "initialize_web");
        assert_eq!(snake_case("NewHTTPServer"), "new_http_server");
        assert_eq!(snake_case("load"), "load");
    }
}
