//! 代码生成器
//!
//! 对依赖图做带记忆的后序遍历：每个节点最多生成一次构造语句，
//! 外部节点成为函数参数。

use super::declaration::{Construct, Declaration};
use super::dependency::Dependency;
use super::error::GenerateError;
use super::graph::{Graph, NodeId};
use super::names::{import_base, lower_camel, NameTable};
use super::provider::{External, Import, Provider, ResultValue, Statement, Variable};
use super::target::Target;
use crate::source::Import as SourceImport;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, instrument, trace};

/// 生成上下文：名字表、import 与已生成的语句
#[derive(Debug, Clone)]
pub struct Scope {
    module_id: String,
    names: NameTable,
    /// import 路径 → 别名
    imports: BTreeMap<String, String>,
    /// 模块标识符 → 已知的包名
    packages: BTreeMap<String, String>,
    statements: Vec<Statement>,
    fallible: bool,
    /// 错误提前返回时各结果的零值
    zero_results: Vec<String>,
}

impl Scope {
    pub fn new(module_id: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            names: NameTable::new(),
            imports: BTreeMap::new(),
            packages: BTreeMap::new(),
            statements: Vec::new(),
            fallible: false,
            zero_results: Vec::new(),
        }
    }

    /// 使用解析得到的包名作为 import 的首选别名
    pub fn with_packages(mut self, packages: BTreeMap<String, String>) -> Self {
        self.packages = packages;
        self
    }

    /// 目标模块内的名字不加限定，其他模块按需登记 import
    pub fn qualify(&mut self, module_id: &str, name: &str) -> String {
        if module_id.is_empty() || module_id == self.module_id {
            return name.to_string();
        }
        format!("{}.{}", self.import(module_id), name)
    }

    fn import(&mut self, module_id: &str) -> String {
        if let Some(alias) = self.imports.get(module_id) {
            return alias.clone();
        }
        let preferred = match self.packages.get(module_id) {
            Some(name) => name.clone(),
            None => import_base(module_id),
        };
        let alias = self.names.claim([preferred]);
        trace!(target: "weave::generator", path = module_id, %alias, "Added import");
        self.imports.insert(module_id.to_string(), alias.clone());
        alias
    }

    /// 渲染类型：`*alias.Type`
    pub fn type_string(&mut self, dependency: &Dependency) -> String {
        let name = self.qualify(&dependency.module_id, &dependency.type_name);
        if dependency.reference {
            format!("*{name}")
        } else {
            name
        }
    }

    /// 分配变量名：类型名小驼峰，冲突时加上包别名前缀，再冲突时追加序号
    pub fn variable(&mut self, dependency: &Dependency) -> Variable {
        let candidates = if dependency.is_builtin() {
            vec![format!("{}Value", dependency.type_name)]
        } else if dependency.module_id == self.module_id {
            vec![lower_camel(&dependency.type_name)]
        } else {
            let alias = self.import(&dependency.module_id);
            vec![
                lower_camel(&dependency.type_name),
                format!("{}{}", alias, dependency.type_name),
            ]
        };
        Variable {
            name: self.names.claim(candidates),
            dependency: dependency.clone(),
        }
    }

    pub fn emit(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// 追加错误检查，生成的函数因此带上 error 返回值
    pub fn error_guard(&mut self) {
        self.fallible = true;
        self.statements.push(Statement::ErrorGuard {
            zeros: self.zero_results.clone(),
        });
    }

    pub fn set_zero_results(&mut self, zeros: Vec<String>) {
        self.zero_results = zeros;
    }

    /// 结束生成，返回 (按路径排序的 import, 语句, 是否可能失败)
    pub fn finish(self) -> (Vec<Import>, Vec<Statement>, bool) {
        let packages = self.packages;
        let imports = self
            .imports
            .into_iter()
            .map(|(path, name)| {
                let package = match packages.get(&path) {
                    Some(package) => package.clone(),
                    None => default_package(&path),
                };
                Import {
                    name,
                    path,
                    package,
                }
            })
            .collect();
        (imports, self.statements, self.fallible)
    }
}

/// 为目标生成 Provider
#[instrument(target = "weave::generator", skip_all, fields(name = %target.name))]
pub fn generate(graph: &Graph, target: &Target) -> Result<Provider, GenerateError> {
    Generator::new(graph, target).run()
}

struct Generator<'a> {
    graph: &'a Graph,
    target: &'a Target,
    scope: Scope,
    generated: HashMap<NodeId, Variable>,
    externals: Vec<External>,
    /// 子树中是否存在可能失败的构造
    fallible_subtree: Vec<bool>,
}

impl<'a> Generator<'a> {
    fn new(graph: &'a Graph, target: &'a Target) -> Self {
        let mut fallible_subtree = vec![false; graph.len()];
        for (id, node) in graph.nodes().iter().enumerate() {
            fallible_subtree[id] = node.declaration.as_ref().is_some_and(|d| d.is_fallible())
                || node.dependencies.iter().any(|&dep| fallible_subtree[dep]);
        }
        Self {
            graph,
            target,
            scope: Scope::new(target.module_id.as_str()).with_packages(graph.packages().clone()),
            generated: HashMap::new(),
            externals: Vec::new(),
            fallible_subtree,
        }
    }

    fn run(mut self) -> Result<Provider, GenerateError> {
        let graph = self.graph;
        let target = self.target;
        let roots = graph.roots();
        if roots.len() != target.results.len() {
            return Err(GenerateError::ArityMismatch {
                subject: format!("results of {}", target.name),
                expected: target.results.len(),
                found: roots.len(),
            });
        }

        let result_types: Vec<String> = target
            .results
            .iter()
            .map(|result| self.scope.type_string(result))
            .collect();
        let zeros = target
            .results
            .iter()
            .zip(roots)
            .map(|(result, &root)| self.zero_value(result, root))
            .collect();
        self.scope.set_zero_results(zeros);

        let mut values = Vec::with_capacity(roots.len());
        for (result, &root) in target.results.iter().zip(roots) {
            let variable = self.visit(root)?;
            values.push(variable.expr_for(result));
        }

        // 未用到的参数仍然保留在签名里
        let mut used: HashSet<String> = self.externals.iter().map(|e| e.key.clone()).collect();
        for param in &target.params {
            if used.insert(param.id()) {
                self.external(param, false);
            }
        }

        let Generator {
            scope,
            mut externals,
            ..
        } = self;
        externals.sort_by(|a, b| a.variable.name.cmp(&b.variable.name));
        let (imports, statements, fallible) = scope.finish();

        let provider = Provider {
            name: target.name.clone(),
            target: target.module_id.clone(),
            package: match graph.package_name(&target.module_id) {
                Some(name) => name.to_string(),
                None => default_package(&target.module_id).replace('-', "_"),
            },
            imports,
            externals,
            statements,
            results: result_types
                .into_iter()
                .zip(values)
                .map(|(type_expr, value)| ResultValue { type_expr, value })
                .collect(),
            fallible,
        };
        debug!(
            target: "weave::generator",
            statements = provider.statements.len(),
            params = provider.externals.len(),
            imports = provider.imports.len(),
            fallible = provider.fallible,
            "Generated provider"
        );
        Ok(provider)
    }

    fn visit(&mut self, id: NodeId) -> Result<Variable, GenerateError> {
        if let Some(variable) = self.generated.get(&id) {
            return Ok(variable.clone());
        }
        let graph = self.graph;
        let node = graph.node(id);

        if node.external {
            let variable = self.external(&node.dependency, node.hoisted);
            self.generated.insert(id, variable.clone());
            return Ok(variable);
        }

        let declaration = node
            .declaration
            .as_ref()
            .ok_or_else(|| GenerateError::MissingDeclaration {
                dependency: node.dependency.to_string(),
            })?;

        // 可能失败的子树先生成，出错时不会执行其余构造
        let mut order: Vec<usize> = (0..node.dependencies.len()).collect();
        order.sort_by_key(|&i| !self.fallible_subtree[node.dependencies[i]]);
        let mut inputs: Vec<Option<Variable>> = vec![None; node.dependencies.len()];
        for i in order {
            inputs[i] = Some(self.visit(node.dependencies[i])?);
        }
        let inputs: Vec<Variable> = inputs.into_iter().flatten().collect();

        let variable = declaration.generate(&mut self.scope, &inputs)?;
        trace!(
            target: "weave::generator",
            declaration = %declaration.id(),
            variable = %variable.name,
            "Generated construction"
        );
        self.generated.insert(id, variable.clone());
        Ok(variable)
    }

    fn external(&mut self, dependency: &Dependency, hoisted: bool) -> Variable {
        let variable = self.scope.variable(dependency);
        let type_expr = self.scope.type_string(dependency);
        self.externals.push(External {
            variable: variable.clone(),
            type_expr,
            key: dependency.id(),
            hoisted,
        });
        variable
    }

    /// 提前返回时结果的零值
    fn zero_value(&mut self, result: &Dependency, root: NodeId) -> String {
        if result.reference {
            return "nil".to_string();
        }
        if result.is_builtin() {
            return builtin_zero(&result.type_name).to_string();
        }
        let type_expr = self.scope.qualify(&result.module_id, &result.type_name);
        let node = self.graph.node(root);
        match &node.declaration {
            Some(Declaration::Struct(_)) if node.id() == result.id() => format!("{type_expr}{{}}"),
            _ => format!("*new({type_expr})"),
        }
    }
}

fn builtin_zero(name: &str) -> &'static str {
    match name {
        "bool" => "false",
        "string" => "\"\"",
        "error" | "any" | "comparable" => "nil",
        _ => "0",
    }
}

/// 目录中没有源文件时按路径推断包名
fn default_package(module_id: &str) -> String {
    SourceImport {
        alias: None,
        path: module_id.to_string(),
    }
    .local_name()
    .to_string()
}
