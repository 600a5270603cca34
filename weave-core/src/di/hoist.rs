//! 提升变换
//!
//! 不依赖任何外部节点的子树与单次调用无关，把它变成由调用方提供的参数。
//! 请求的结果本身永远不会被提升。

use super::graph::{Graph, Node, NodeId};
use tracing::{debug, instrument, trace};

/// 返回提升后的新图
#[instrument(target = "weave::hoist", skip_all, fields(nodes = graph.len()))]
pub fn hoist(graph: &Graph) -> Graph {
    // 节点按后序排列，一次正向遍历即可
    let mut needs_external = vec![false; graph.len()];
    for (id, node) in graph.nodes().iter().enumerate() {
        needs_external[id] =
            node.external || node.dependencies.iter().any(|&dep| needs_external[dep]);
    }

    let mut rebuild = Rebuild {
        source: graph,
        needs_external,
        copied: vec![None; graph.len()],
        graph: Graph::new(),
        hoisted: 0,
    };
    for &root in graph.roots() {
        let id = rebuild.copy(root);
        rebuild.graph.add_root(id);
    }
    for (module_id, name) in graph.packages() {
        rebuild.graph.record_package(module_id, name);
    }

    debug!(
        target: "weave::hoist",
        hoisted = rebuild.hoisted,
        before = graph.len(),
        after = rebuild.graph.len(),
        "Hoisted request-invariant dependencies"
    );
    rebuild.graph
}

struct Rebuild<'a> {
    source: &'a Graph,
    needs_external: Vec<bool>,
    /// 旧节点 → 新节点
    copied: Vec<Option<NodeId>>,
    graph: Graph,
    hoisted: usize,
}

impl Rebuild<'_> {
    fn copy(&mut self, old: NodeId) -> NodeId {
        if let Some(id) = self.copied[old] {
            return id;
        }
        let source = self.source;
        let node = source.node(old);

        let id = if !node.external && !node.unhoistable && !self.needs_external[old] {
            trace!(target: "weave::hoist", dependency = %node.dependency, "Hoisting");
            self.hoisted += 1;
            let mut external = Node::external(node.dependency.clone());
            external.hoisted = true;
            self.graph.push(external)
        } else {
            let dependencies = node.dependencies.iter().map(|&dep| self.copy(dep)).collect();
            self.graph.push(Node {
                dependencies,
                ..node.clone()
            })
        };

        self.copied[old] = Some(id);
        id
    }
}
