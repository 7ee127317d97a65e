//! Internal clipboard: copy, paste with cascading offsets, duplicate.
//!
//! The clipboard holds a detached copy of the selected nodes and of the
//! edges running between them. Each paste clones that copy again with
//! fresh ids, shifted one more `step` down and to the right than the
//! previous paste, so repeated pastes fan out instead of stacking.

use crate::history::Snapshot;
use board_core::{Edge, GraphStore, Node, NodeId};
use std::collections::{HashMap, HashSet};

/// Clones produced by one paste, ready to be appended to the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pasted {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Pasted {
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    contents: Option<Snapshot>,
    /// Pastes since the last copy.
    generation: u32,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_none()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Copy the nodes in `selection` (store order) and every edge with
    /// both ends among them. An empty or unmatched selection leaves the
    /// clipboard untouched and returns `false`.
    pub fn copy<S: GraphStore + ?Sized>(&mut self, selection: &[NodeId], store: &S) -> bool {
        let Some(contents) = extract(selection, store) else {
            return false;
        };
        log::debug!(
            "copied {} nodes, {} edges",
            contents.nodes.len(),
            contents.edges.len()
        );
        self.contents = Some(contents);
        self.generation = 0;
        true
    }

    /// Clone the clipboard contents with fresh ids, offset by
    /// `step × generation` on both axes. `None` when the clipboard is empty.
    pub fn paste<S: GraphStore + ?Sized>(&mut self, store: &S, step: f64) -> Option<Pasted> {
        let contents = self.contents.as_ref()?;
        self.generation += 1;
        let offset = step * f64::from(self.generation);
        let pasted = instantiate(contents, store, offset);
        log::debug!(
            "paste #{}: {} nodes, {} edges at +{offset}",
            self.generation,
            pasted.nodes.len(),
            pasted.edges.len()
        );
        Some(pasted)
    }

    pub fn clear(&mut self) {
        self.contents = None;
        self.generation = 0;
    }
}

/// One-shot copy + paste of `selection` at a single `step` offset,
/// leaving any clipboard alone.
pub fn duplicate<S: GraphStore + ?Sized>(selection: &[NodeId], store: &S, step: f64) -> Option<Pasted> {
    let contents = extract(selection, store)?;
    Some(instantiate(&contents, store, step))
}

fn extract<S: GraphStore + ?Sized>(selection: &[NodeId], store: &S) -> Option<Snapshot> {
    let wanted: HashSet<NodeId> = selection.iter().copied().collect();
    let nodes: Vec<Node> = store
        .nodes()
        .iter()
        .filter(|n| wanted.contains(&n.id))
        .cloned()
        .collect();
    if nodes.is_empty() {
        return None;
    }
    let edges = store
        .edges()
        .iter()
        .filter(|e| wanted.contains(&e.source) && wanted.contains(&e.target))
        .cloned()
        .collect();
    Some(Snapshot { nodes, edges })
}

fn instantiate<S: GraphStore + ?Sized>(contents: &Snapshot, store: &S, offset: f64) -> Pasted {
    let mut remap: HashMap<NodeId, NodeId> = HashMap::with_capacity(contents.nodes.len());
    for node in &contents.nodes {
        let fresh = NodeId::fresh("node", |id| store.is_taken(id));
        remap.insert(node.id, fresh);
    }

    let nodes = contents
        .nodes
        .iter()
        .map(|node| {
            let mut clone = node.clone();
            clone.id = remap[&node.id];
            clone.selected = false;
            match node.parent.and_then(|p| remap.get(&p)) {
                // Nested inside another clone: keep the relative position.
                Some(&parent) => clone.parent = Some(parent),
                None => clone.position = node.position.offset(offset, offset),
            }
            clone
        })
        .collect();

    let edges = contents
        .edges
        .iter()
        .filter_map(|edge| {
            let (Some(&source), Some(&target)) = (remap.get(&edge.source), remap.get(&edge.target))
            else {
                return None;
            };
            let mut clone = edge.clone();
            clone.id = NodeId::fresh("edge", |id| store.is_taken(id));
            clone.source = source;
            clone.target = target;
            clone.selected = false;
            Some(clone)
        })
        .collect();

    Pasted { nodes, edges }
}
