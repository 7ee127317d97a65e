//! Derived paint order.
//!
//! Every node gets `depth × K + index`, where `depth` is its number of
//! parent hops, `index` its position in the node list and `K` exceeds
//! the node count. Deeper nodes therefore always paint above shallower
//! ones, and document order breaks ties. Edges take the key of their
//! source node and are kept sorted by it, so a connector paints in the
//! layer of the shape it leaves from.

use crate::hierarchy::Hierarchy;
use crate::id::NodeId;
use crate::model::Edge;
use crate::store::GraphStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZOrderConfig {
    /// Hard bound on parent hops per node.
    pub max_depth: usize,
}

impl Default for ZOrderConfig {
    fn default() -> Self {
        Self { max_depth: 1024 }
    }
}

/// Order key of every node on the board.
pub fn order_keys<S: GraphStore + ?Sized>(store: &S, config: &ZOrderConfig) -> HashMap<NodeId, i64> {
    let hierarchy = Hierarchy::build(store);
    let k = store.nodes().len() as i64 + 1;
    store
        .nodes()
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let depth = hierarchy.depth_bounded(node.id, config.max_depth) as i64;
            (node.id, depth * k + index as i64)
        })
        .collect()
}

/// Recompute keys and edge order, writing back only what changed.
/// Returns `true` if the store was modified.
pub fn apply_z_order<S: GraphStore + ?Sized>(store: &mut S, config: &ZOrderConfig) -> bool {
    let keys = order_keys(store, config);
    let mut changed = false;

    for node in store.nodes_mut() {
        let key = keys.get(&node.id).copied().unwrap_or_default();
        if node.z_index != key {
            node.z_index = key;
            changed = true;
        }
    }

    let mut edges: Vec<Edge> = store.edges().to_vec();
    for edge in &mut edges {
        edge.z_index = keys.get(&edge.source).copied().unwrap_or_default();
    }
    edges.sort_by_key(|e| e.z_index);

    let unchanged = edges.len() == store.edges().len()
        && edges
            .iter()
            .zip(store.edges())
            .all(|(a, b)| a.id == b.id && a.z_index == b.z_index);
    if !unchanged {
        log::trace!("re-sorting {} edges by paint order", edges.len());
        store.set_edges(edges);
        changed = true;
    }
    changed
}
