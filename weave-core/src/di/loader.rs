//! 依赖图加载
//!
//! 从请求的结果出发递归查找声明，构造依赖图。
//!
//! # 解析顺序
//! 1. 沿别名链替换描述符
//! 2. 已经在图中的节点直接复用
//! 3. 正在解析的节点说明存在环
//! 4. 调用方提供的依赖成为外部节点
//! 5. 否则查找声明并递归解析它的依赖

use super::declaration::Construct;
use super::dependency::Dependency;
use super::error::{DiError, DiErrorKind};
use super::finder::Finder;
use super::graph::{Graph, Node, NodeId};
use super::hoist::hoist;
use super::target::Target;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument, trace};

/// 加载目标的依赖图；`target.hoist` 为真时同时应用提升变换
#[instrument(target = "weave::loader", skip_all, fields(name = %target.name))]
pub fn load(finder: &Finder<'_>, target: &Target) -> Result<Graph, DiError> {
    let mut loader = Loader::new(finder, target);
    if let Some(name) = finder
        .package_name(&target.module_id)
        .map_err(|kind| DiError::new(kind, Vec::new()))?
    {
        loader.graph.record_package(&target.module_id, &name);
    }
    for result in &target.results {
        let root = loader.resolve(result)?;
        loader.graph.add_root(root);
    }
    debug!(target: "weave::loader", nodes = loader.graph.len(), "Loaded dependency graph");

    if target.hoist {
        Ok(hoist(&loader.graph))
    } else {
        Ok(loader.graph)
    }
}

struct Loader<'a, 'f> {
    finder: &'a Finder<'f>,
    /// 依赖 ID → 声明的参数形式
    externals: HashMap<String, Dependency>,
    external_ids: HashSet<String>,
    /// 依赖 ID → 替换目标
    aliases: HashMap<String, Dependency>,
    graph: Graph,
    /// 正在解析的依赖
    resolving: Vec<Dependency>,
}

impl<'a, 'f> Loader<'a, 'f> {
    fn new(finder: &'a Finder<'f>, target: &Target) -> Self {
        let externals: HashMap<String, Dependency> = target
            .params
            .iter()
            .map(|param| (param.id(), param.clone()))
            .collect();
        let external_ids = externals.keys().cloned().collect();
        let aliases = target
            .aliases
            .iter()
            .map(|(from, to)| (from.id(), to.clone()))
            .collect();
        Self {
            finder,
            externals,
            external_ids,
            aliases,
            graph: Graph::new(),
            resolving: Vec::new(),
        }
    }

    fn error(&self, kind: DiErrorKind) -> DiError {
        DiError::new(
            kind,
            self.resolving.iter().map(|d| d.to_string()).collect(),
        )
    }

    /// 沿别名链替换，别名成环时报错
    fn follow_aliases(&self, wanted: &Dependency) -> Result<Dependency, DiError> {
        let mut current = wanted.clone();
        let mut seen = vec![current.id()];
        while let Some(next) = self.aliases.get(&current.id()) {
            let id = next.id();
            if id == current.id() {
                current = next.clone();
                break;
            }
            if seen.contains(&id) {
                seen.push(id);
                return Err(self.error(DiErrorKind::CycleDetected { chain: seen }));
            }
            trace!(target: "weave::loader", from = %current, to = %next, "Following alias");
            seen.push(id);
            current = next.clone();
        }
        Ok(current)
    }

    fn resolve(&mut self, wanted: &Dependency) -> Result<NodeId, DiError> {
        let dependency = self.follow_aliases(wanted)?;
        let id = dependency.id();

        if let Some(node) = self.graph.find(&id) {
            return Ok(node);
        }

        if self.resolving.iter().any(|d| d.id() == id) {
            let mut chain: Vec<String> = self.resolving.iter().map(|d| d.id()).collect();
            chain.push(id);
            return Err(self.error(DiErrorKind::CycleDetected { chain }));
        }

        if let Some(external) = self.externals.get(&id) {
            trace!(target: "weave::loader", dependency = %external, "External dependency");
            if !external.is_builtin() {
                // 外部类型的包不一定可读，读不到时按路径推断
                if let Ok(Some(name)) = self.finder.package_name(&external.module_id) {
                    self.graph.record_package(&external.module_id, &name);
                }
            }
            return Ok(self.graph.push(Node::external(external.clone())));
        }

        let declaration = self
            .finder
            .find(&dependency, &self.external_ids)
            .map_err(|kind| self.error(kind))?;
        debug!(
            target: "weave::loader",
            dependency = %dependency,
            declaration = %declaration.describe(),
            "Resolved dependency"
        );
        if self.graph.package_name(&dependency.module_id).is_none() {
            if let Some(name) = self
                .finder
                .package_name(&dependency.module_id)
                .map_err(|kind| self.error(kind))?
            {
                self.graph.record_package(&dependency.module_id, &name);
            }
        }

        self.resolving.push(dependency.clone());
        let children: Result<Vec<NodeId>, DiError> = declaration
            .dependencies()
            .iter()
            .map(|child| self.resolve(child))
            .collect();
        self.resolving.pop();
        let children = children?;

        let produced = dependency.with_reference(declaration.produces_reference());
        Ok(self
            .graph
            .push(Node::constructed(produced, declaration, children)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ModuleMap, SourceParser};
    use std::sync::Arc;
    use weave_vfs::MemoryFileSystem;

    const APP: &str = "example.com/app";

    fn load_target(source: &str, target: Target) -> Result<Graph, DiError> {
        let fs = Arc::new(MemoryFileSystem::with_files(vec![(
            "/app/app.go",
            source.as_bytes().to_vec(),
        )]));
        let resolver = ModuleMap::new(fs.clone(), APP, "/app");
        let parser = SourceParser::new(fs);
        let finder = Finder::new(&resolver, &parser);
        load(&finder, &target)
    }

    #[test]
    fn test_shared_dependency_is_one_node() {
        let graph = load_target(
            r#"package app
func NewDB() *DB { return nil }
func NewRepo(db *DB) *Repo { return nil }
func NewService(db DB, r *Repo) *Service { return nil }
"#,
            Target::new("Init", APP).with_result(Dependency::pointer(APP, "Service")),
        )
        .unwrap();

        assert_eq!(graph.len(), 3);
        let ids: Vec<String> = graph.nodes().iter().map(|n| n.id()).collect();
        assert_eq!(
            ids,
            vec!["example.com/app.DB", "example.com/app.Repo", "example.com/app.Service"]
        );
        let service = graph.node(graph.roots()[0]);
        assert!(service.unhoistable);
        assert_eq!(service.dependencies, vec![0, 1]);
        assert!(graph.node(0).dependency.reference);
    }

    #[test]
    fn test_external_params_are_leaves() {
        let graph = load_target(
            r#"package app
func NewConfig() *Config { return nil }
func NewDB(cfg *Config, dsn string) *DB { return nil }
"#,
            Target::new("Init", APP)
                .with_param(Dependency::new(APP, "Config"))
                .with_param(Dependency::builtin("string"))
                .with_result(Dependency::pointer(APP, "DB")),
        )
        .unwrap();

        let config = graph.node(graph.find("example.com/app.Config").unwrap());
        assert!(config.external);
        assert!(config.declaration.is_none());
        assert!(!config.dependency.reference);
        assert!(graph.node(graph.find("string").unwrap()).external);
    }

    #[test]
    fn test_alias_chain() {
        let graph = load_target(
            r#"package app
func NewFileStore() *FileStore { return nil }
func NewService(s Store) *Service { return nil }
"#,
            Target::new("Init", APP)
                .with_alias(Dependency::new(APP, "Store"), Dependency::new(APP, "Backend"))
                .with_alias(Dependency::new(APP, "Backend"), Dependency::pointer(APP, "FileStore"))
                .with_result(Dependency::pointer(APP, "Service")),
        )
        .unwrap();
        assert!(graph.find("example.com/app.Store").is_none());
        assert!(graph.find("example.com/app.FileStore").is_some());
    }

    #[test]
    fn test_alias_loop_is_a_cycle() {
        let err = load_target(
            "package app\n",
            Target::new("Init", APP)
                .with_alias(Dependency::new(APP, "A"), Dependency::new(APP, "B"))
                .with_alias(Dependency::new(APP, "B"), Dependency::new(APP, "A"))
                .with_result(Dependency::new(APP, "A")),
        )
        .unwrap_err();
        assert_eq!(
            err.kind,
            DiErrorKind::CycleDetected {
                chain: vec![
                    "example.com/app.A".to_string(),
                    "example.com/app.B".to_string(),
                    "example.com/app.A".to_string(),
                ]
            }
        );
    }

    #[test]
    fn test_cycle_detected() {
        let err = load_target(
            r#"package app
func NewA(b *B) *A { return nil }
func NewB(c *C) *B { return nil }
func NewC(a *A) *C { return nil }
"#,
            Target::new("Init", APP).with_result(Dependency::pointer(APP, "A")),
        )
        .unwrap_err();
        assert!(err.is_cycle());
        assert_eq!(
            err.to_string(),
            "dependency cycle detected: example.com/app.A -> example.com/app.B -> \
             example.com/app.C -> example.com/app.A (required by *example.com/app.A -> \
             *example.com/app.B -> *example.com/app.C)"
        );
    }

    #[test]
    fn test_not_found_carries_chain() {
        let err = load_target(
            "package app\nfunc NewService(r *Repo) *Service { return nil }\n",
            Target::new("Init", APP).with_result(Dependency::pointer(APP, "Service")),
        )
        .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.chain, vec!["*example.com/app.Service".to_string()]);
    }

    #[test]
    fn test_multiple_results_are_roots() {
        let graph = load_target(
            r#"package app
func NewDB() *DB { return nil }
func NewRepo(db *DB) *Repo { return nil }
"#,
            Target::new("Init", APP)
                .with_result(Dependency::pointer(APP, "Repo"))
                .with_result(Dependency::pointer(APP, "DB")),
        )
        .unwrap();
        assert_eq!(graph.roots().len(), 2);
        assert!(graph.roots().iter().all(|&r| graph.node(r).unhoistable));
    }
}
