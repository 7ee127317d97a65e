//! Parent → child containment, as a directed graph.
//!
//! Built on demand from a store's `parent` links. Links to nodes that
//! are not on the board are ignored, so such a node behaves as a root.

use crate::id::NodeId;
use crate::store::GraphStore;
use petgraph::Direction;
use petgraph::algo::{has_path_connecting, is_cyclic_directed};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    graph: DiGraph<NodeId, ()>,
    index: HashMap<NodeId, NodeIndex>,
}

impl Hierarchy {
    pub fn build<S: GraphStore + ?Sized>(store: &S) -> Self {
        let mut graph = DiGraph::with_capacity(store.nodes().len(), store.nodes().len());
        let mut index = HashMap::with_capacity(store.nodes().len());
        // Insert in store order so `NodeIndex` order is document order.
        for node in store.nodes() {
            index.insert(node.id, graph.add_node(node.id));
        }
        for node in store.nodes() {
            let Some(parent) = node.parent else { continue };
            if parent == node.id {
                log::warn!("node {} lists itself as parent", node.id);
                continue;
            }
            if let (Some(&p), Some(&c)) = (index.get(&parent), index.get(&node.id)) {
                graph.add_edge(p, c, ());
            }
        }
        Self { graph, index }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// The parent of `id`, if it is nested under a node on the board.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let idx = *self.index.get(&id)?;
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
            .map(|p| self.graph[p])
    }

    /// Direct children of `id` in document order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&idx) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        children.sort();
        children.into_iter().map(|c| self.graph[c]).collect()
    }

    /// Parent hops from `id` to a root.
    pub fn depth(&self, id: NodeId) -> usize {
        self.depth_bounded(id, self.graph.node_count())
    }

    /// Parent hops from `id` to a root, walking at most `max_steps` hops.
    ///
    /// A repeated ancestor or the step bound ends the walk early and the
    /// depth reached so far is returned.
    pub fn depth_bounded(&self, id: NodeId, max_steps: usize) -> usize {
        let mut depth = 0;
        let mut visited = HashSet::from([id]);
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            if !visited.insert(parent) {
                log::warn!("parent loop above {id} at depth {depth}");
                break;
            }
            if depth >= max_steps {
                log::warn!("ancestry of {id} exceeds {max_steps} levels");
                break;
            }
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        if ancestor == descendant {
            return false;
        }
        match (self.index.get(&ancestor), self.index.get(&descendant)) {
            (Some(&a), Some(&d)) => has_path_connecting(&self.graph, a, d, None),
            _ => false,
        }
    }

    /// Every node nested (transitively) under `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&start) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(idx) = dfs.next(&self.graph) {
            if idx != start {
                out.push(self.graph[idx]);
            }
        }
        out
    }

    /// Whether nesting `child` under `new_parent` would close a loop.
    pub fn would_cycle(&self, child: NodeId, new_parent: NodeId) -> bool {
        child == new_parent || self.is_ancestor_of(child, new_parent)
    }

    /// Whether the parent links contain a loop.
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }
}
