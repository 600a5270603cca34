//! 依赖图
//!
//! 节点存放在 arena 中，按后序插入：任何节点的依赖都排在它前面。

use super::declaration::Declaration;
use super::dependency::Dependency;
use std::collections::{BTreeMap, HashMap, HashSet};

pub type NodeId = usize;

/// 图节点
///
/// 外部节点既没有声明也没有依赖；其余节点一定有声明。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// 外部节点为声明的参数形式，其余为构造产出的形式
    pub dependency: Dependency,
    pub declaration: Option<Declaration>,
    pub dependencies: Vec<NodeId>,
    pub external: bool,
    /// 由提升变换变成的外部节点
    pub hoisted: bool,
    /// 请求的结果，不参与提升
    pub unhoistable: bool,
}

impl Node {
    pub fn external(dependency: Dependency) -> Self {
        Self {
            dependency,
            declaration: None,
            dependencies: Vec::new(),
            external: true,
            hoisted: false,
            unhoistable: false,
        }
    }

    pub fn constructed(
        dependency: Dependency,
        declaration: Declaration,
        dependencies: Vec<NodeId>,
    ) -> Self {
        Self {
            dependency,
            declaration: Some(declaration),
            dependencies,
            external: false,
            hoisted: false,
            unhoistable: false,
        }
    }

    pub fn id(&self) -> String {
        self.dependency.id()
    }
}

/// 依赖图
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
    /// 模块标识符 → package 子句中的包名
    packages: BTreeMap<String, String>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入节点；依赖必须已经在图中
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.index.insert(node.id(), id);
        self.nodes.push(node);
        id
    }

    /// 登记请求的结果
    pub fn add_root(&mut self, id: NodeId) {
        self.nodes[id].unhoistable = true;
        self.roots.push(id);
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// 与请求结果一一对应
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 登记模块声明的包名，已登记的模块保持不变
    pub fn record_package(&mut self, module_id: &str, name: &str) {
        self.packages
            .entry(module_id.to_string())
            .or_insert_with(|| name.to_string());
    }

    pub fn package_name(&self, module_id: &str) -> Option<&str> {
        self.packages.get(module_id).map(String::as_str)
    }

    pub fn packages(&self) -> &BTreeMap<String, String> {
        &self.packages
    }

    /// 按依赖 ID 查找节点
    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    pub fn externals(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.external)
    }

    /// 调试用的树形文本，共享子树只展开一次
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut seen = HashSet::new();
        for &root in &self.roots {
            self.render_node(root, 0, &mut seen, &mut out);
        }
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, seen: &mut HashSet<NodeId>, out: &mut String) {
        let node = &self.nodes[id];
        out.push_str(&"  ".repeat(depth));
        out.push_str(&node.dependency.to_string());
        if let Some(declaration) = &node.declaration {
            out.push_str(&format!(" <- {}", declaration.describe()));
        }
        if node.hoisted {
            out.push_str(" [hoisted]");
        } else if node.external {
            out.push_str(" [external]");
        }
        if !seen.insert(id) && !node.dependencies.is_empty() {
            out.push_str(" (shared)\n");
            return;
        }
        out.push('\n');
        for &child in &node.dependencies {
            self.render_node(child, depth + 1, seen, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::declaration::Struct;

    #[test]
    fn test_push_and_find() {
        let mut graph = Graph::new();
        let db = graph.push(Node::external(Dependency::pointer("example.com/app/db", "DB")));
        let web = graph.push(Node::constructed(
            Dependency::pointer("example.com/app", "Web"),
            Declaration::Struct(Struct {
                module_id: "example.com/app".to_string(),
                name: "Web".to_string(),
                needs_reference_wrap: true,
                fields: Vec::new(),
            }),
            vec![db],
        ));
        graph.add_root(web);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.find("example.com/app/db.DB"), Some(db));
        assert_eq!(graph.find("example.com/app.Web"), Some(web));
        assert_eq!(graph.find("missing.X"), None);
        assert!(graph.node(web).unhoistable);
        assert_eq!(graph.roots(), &[web]);
        assert_eq!(graph.externals().count(), 1);
        assert_eq!(
            graph.render(),
            "*example.com/app.Web <- struct Web\n  *example.com/app/db.DB [external]\n"
        );
    }
}
