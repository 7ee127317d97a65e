//! The graph store the editing engine operates on.
//!
//! `GraphStore` is the abstract collection of nodes and edges the engine
//! reads and writes. Writes are whole-list replacement or append, never
//! partial patches. `Board` is the in-memory implementation used by the
//! wasm bridge and the tests.

use crate::error::{BoardError, BoardResult};
use crate::id::NodeId;
use crate::model::{Edge, Node, Viewport};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};

/// A mutable, ordered collection of nodes and edges.
pub trait GraphStore {
    fn nodes(&self) -> &[Node];
    fn edges(&self) -> &[Edge];

    /// Replace every node. Edges left without an endpoint are dropped.
    fn set_nodes(&mut self, nodes: Vec<Node>);

    /// Replace every edge. Invalid edges are dropped.
    fn set_edges(&mut self, edges: Vec<Edge>);

    /// Field-level access for move/resize/style edits. Callers must not
    /// change `id` through these; use `set_nodes`/`set_edges` instead.
    fn nodes_mut(&mut self) -> &mut [Node];
    fn edges_mut(&mut self) -> &mut [Edge];

    fn add_nodes(&mut self, nodes: Vec<Node>) {
        if nodes.is_empty() {
            return;
        }
        let mut all = self.nodes().to_vec();
        all.extend(nodes);
        self.set_nodes(all);
    }

    fn add_edges(&mut self, edges: Vec<Edge>) {
        if edges.is_empty() {
            return;
        }
        let mut all = self.edges().to_vec();
        all.extend(edges);
        self.set_edges(all);
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes().iter().find(|n| n.id == id)
    }

    fn edge(&self, id: NodeId) -> Option<&Edge> {
        self.edges().iter().find(|e| e.id == id)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes_mut().iter_mut().find(|n| n.id == id)
    }

    fn edge_mut(&mut self, id: NodeId) -> Option<&mut Edge> {
        self.edges_mut().iter_mut().find(|e| e.id == id)
    }

    fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Whether `id` names any node or edge.
    fn is_taken(&self, id: NodeId) -> bool {
        self.contains_node(id) || self.edge(id).is_some()
    }
}

/// Check that `edge` can be added to `store` as-is.
pub fn validate_edge<S: GraphStore + ?Sized>(store: &S, edge: &Edge) -> BoardResult<()> {
    if edge.source == edge.target {
        return Err(BoardError::SelfLoop(edge.source));
    }
    for end in [edge.source, edge.target] {
        if !store.contains_node(end) {
            return Err(BoardError::UnknownNode(end));
        }
    }
    if store.is_taken(edge.id) {
        return Err(BoardError::DuplicateId(edge.id));
    }
    Ok(())
}

// ─── In-memory board ─────────────────────────────────────────────────────

/// The in-memory graph store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Board {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    viewport: Viewport,

    /// Index from node id → position in `nodes`.
    #[serde(skip)]
    id_index: HashMap<NodeId, usize>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board, applying the same sanitizing rules as the setters.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut board = Self::new();
        board.set_nodes(nodes);
        board.set_edges(edges);
        board
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn rebuild_index(&mut self) {
        self.id_index.clear();
        for (i, node) in self.nodes.iter().enumerate() {
            self.id_index.insert(node.id, i);
        }
    }

    /// Drop self-loops, dangling edges and repeated edge ids.
    fn sanitize_edges(&self, edges: Vec<Edge>) -> Vec<Edge> {
        let mut seen = HashSet::with_capacity(edges.len());
        edges
            .into_iter()
            .filter(|e| {
                let keep = e.source != e.target
                    && self.id_index.contains_key(&e.source)
                    && self.id_index.contains_key(&e.target)
                    && !self.id_index.contains_key(&e.id)
                    && seen.insert(e.id);
                if !keep {
                    log::debug!("dropping invalid edge {} ({} -> {})", e.id, e.source, e.target);
                }
                keep
            })
            .collect()
    }
}

impl GraphStore for Board {
    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn edges(&self) -> &[Edge] {
        &self.edges
    }

    fn set_nodes(&mut self, nodes: Vec<Node>) {
        let mut seen = HashSet::with_capacity(nodes.len());
        self.nodes = nodes
            .into_iter()
            .filter(|n| {
                let fresh = seen.insert(n.id);
                if !fresh {
                    log::debug!("dropping node with repeated id {}", n.id);
                }
                fresh
            })
            .collect();
        self.rebuild_index();

        let edges = std::mem::take(&mut self.edges);
        self.edges = self.sanitize_edges(edges);
    }

    fn set_edges(&mut self, edges: Vec<Edge>) {
        self.edges = self.sanitize_edges(edges);
    }

    fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.id_index.get(&id).map(|&i| &self.nodes[i])
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.id_index.get(&id).copied().map(|i| &mut self.nodes[i])
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Parts {
            #[serde(default)]
            nodes: Vec<Node>,
            #[serde(default)]
            edges: Vec<Edge>,
            #[serde(default)]
            viewport: Viewport,
        }
        let parts = Parts::deserialize(deserializer)?;
        let mut board = Board::from_parts(parts.nodes, parts.edges);
        board.viewport = parts.viewport;
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Position, ShapeKind};

    fn node(id: &str) -> Node {
        Node::new(NodeId::intern(id), ShapeKind::Rectangle, Position::default())
    }

    fn edge(id: &str, s: &str, t: &str) -> Edge {
        Edge::new(id.into(), s.into(), t.into())
    }

    #[test]
    fn dangling_and_self_loop_edges_are_dropped() {
        let board = Board::from_parts(
            vec![node("a"), node("b")],
            vec![
                edge("e1", "a", "b"),
                edge("e2", "a", "a"),
                edge("e3", "a", "ghost"),
                edge("e1", "b", "a"),
            ],
        );
        let ids: Vec<&str> = board.edges().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1"]);
    }

    #[test]
    fn replacing_nodes_prunes_orphaned_edges() {
        let mut board = Board::from_parts(
            vec![node("a"), node("b"), node("c")],
            vec![edge("ab", "a", "b"), edge("bc", "b", "c")],
        );
        board.set_nodes(vec![node("a"), node("b")]);
        assert_eq!(board.edges().len(), 1);
        assert_eq!(board.edges()[0].id, NodeId::intern("ab"));
    }

    #[test]
    fn repeated_node_ids_keep_first() {
        let mut first = node("dup");
        first.position = Position::new(1.0, 1.0);
        let board = Board::from_parts(vec![first, node("dup")], vec![]);
        assert_eq!(board.nodes().len(), 1);
        assert_eq!(board.node("dup".into()).unwrap().position.x, 1.0);
    }

    #[test]
    fn append_keeps_order_and_index() {
        let mut board = Board::from_parts(vec![node("a")], vec![]);
        board.add_nodes(vec![node("b"), node("c")]);
        let ids: Vec<&str> = board.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(board.node_mut("c".into()).is_some());
    }

    #[test]
    fn validate_edge_rejections() {
        let board = Board::from_parts(vec![node("a"), node("b")], vec![edge("ab", "a", "b")]);
        assert_eq!(
            validate_edge(&board, &edge("x", "a", "a")),
            Err(BoardError::SelfLoop("a".into()))
        );
        assert_eq!(
            validate_edge(&board, &edge("x", "a", "zz")),
            Err(BoardError::UnknownNode("zz".into()))
        );
        assert_eq!(
            validate_edge(&board, &edge("ab", "b", "a")),
            Err(BoardError::DuplicateId("ab".into()))
        );
        assert!(validate_edge(&board, &edge("ba", "b", "a")).is_ok());
    }

    #[test]
    fn board_deserializes_through_sanitizer() {
        let json = r#"{
            "nodes": [
                {"id": "a", "type": "rectangle", "position": {"x": 0, "y": 0}},
                {"id": "b", "type": "text", "position": {"x": 10, "y": 0}}
            ],
            "edges": [
                {"id": "ab", "source": "a", "target": "b"},
                {"id": "loop", "source": "b", "target": "b"}
            ]
        }"#;
        let board: Board = serde_json::from_str(json).unwrap();
        assert_eq!(board.nodes().len(), 2);
        assert_eq!(board.edges().len(), 1);
        assert!(board.node("b".into()).is_some());
        assert_eq!(board.viewport(), Viewport::default());
    }

    #[test]
    fn viewport_survives_save_and_load() {
        let mut board = Board::from_parts(vec![node("a")], vec![]);
        board.set_viewport(Viewport {
            x: -120.0,
            y: 40.0,
            zoom: 1.5,
        });
        let json = serde_json::to_string(&board).unwrap();
        let loaded: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.viewport(), board.viewport());

        let zoom_only: Board = serde_json::from_str(r#"{"viewport": {"zoom": 2}}"#).unwrap();
        assert_eq!(zoom_only.viewport().zoom, 2.0);
        assert_eq!(zoom_only.viewport().x, 0.0);
    }
}
