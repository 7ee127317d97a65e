//! The editing engine: one board plus its history, clipboard and config.
//!
//! Every structural edit goes through here so that it is recorded
//! (snapshot first, mutate second) and so the derived paint order is
//! recomputed afterwards. Live edits (move, resize, restyle) are applied
//! without recording; wrap them in a gesture to make them undoable.
//!
//! Undo and redo open a *restore window*: until the UI reports the next
//! settled frame, change listeners see `suppress_history_capture` and
//! must not record the restore as a fresh edit.

use crate::clipboard::{self, Clipboard, Pasted};
use crate::commands::BoardCommand;
use crate::config::EditorConfig;
use crate::history::{EditContext, History};
use crate::shortcuts::ShortcutAction;
use board_core::geometry::absolute_position;
use board_core::{
    Board, BoardError, BoardResult, Edge, EdgeStyle, GraphStore, Hierarchy, Node, NodeId, Position,
    Route, ShapeKind, ShapeStyle, Size, apply_z_order, route_edges, validate_edge,
};
use smallvec::SmallVec;
use std::collections::HashSet;

/// Ids of the selected nodes or edges, in store order.
pub type Selection = SmallVec<[NodeId; 8]>;

pub struct BoardEngine<S: GraphStore = Board> {
    store: S,
    history: History,
    clipboard: Clipboard,
    config: EditorConfig,
    /// An undo/redo restore has not been rendered yet.
    restoring: bool,
}

impl Default for BoardEngine<Board> {
    fn default() -> Self {
        Self::new(Board::new())
    }
}

impl<S: GraphStore> BoardEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, EditorConfig::default())
    }

    pub fn with_config(mut store: S, config: EditorConfig) -> Self {
        apply_z_order(&mut store, &config.z_order);
        Self {
            store,
            history: History::new(config.history),
            clipboard: Clipboard::new(),
            config,
            restoring: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access. Edits made here are not recorded and do not
    /// re-run z-order; call `refresh_z_order` afterwards.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.history.set_config(config.history);
        self.config = config;
        self.refresh_z_order();
    }

    /// Recompute paint order. Returns `true` if anything changed.
    pub fn refresh_z_order(&mut self) -> bool {
        apply_z_order(&mut self.store, &self.config.z_order)
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn context(&self) -> EditContext {
        EditContext {
            suppress_history_capture: self.restoring,
        }
    }

    /// Record the current board, unless a restore is being rendered.
    pub fn commit_snapshot(&mut self) -> bool {
        let ctx = self.context();
        self.history.commit(&self.store, &ctx)
    }

    /// Record ahead of an explicit edit. Explicit edits are never part of
    /// a restore, so the restore window does not apply.
    fn record(&mut self) -> bool {
        self.history.commit(&self.store, &EditContext::default())
    }

    pub fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.store) {
            return false;
        }
        self.restoring = true;
        self.refresh_z_order();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo(&mut self.store) {
            return false;
        }
        self.restoring = true;
        self.refresh_z_order();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The UI finished rendering; closes the restore window.
    pub fn frame_settled(&mut self) {
        if self.restoring {
            log::trace!("restore settled");
        }
        self.restoring = false;
    }

    /// Change listener for edges the UI is about to remove (e.g. the
    /// canvas's own Backspace handling). Records the board first unless
    /// a restore is being rendered.
    pub fn on_edges_removed(&mut self, ids: &[NodeId]) -> bool {
        if ids.is_empty() {
            return false;
        }
        self.commit_snapshot()
    }

    /// Remove edges as reported by the UI, running the removal listener.
    pub fn remove_edges(&mut self, ids: &[NodeId]) -> bool {
        let doomed: HashSet<NodeId> = ids.iter().copied().collect();
        if !self.store.edges().iter().any(|e| doomed.contains(&e.id)) {
            return false;
        }
        self.on_edges_removed(ids);
        let kept = self
            .store
            .edges()
            .iter()
            .filter(|e| !doomed.contains(&e.id))
            .cloned()
            .collect();
        self.store.set_edges(kept);
        true
    }

    pub fn begin_gesture(&mut self) {
        self.history.begin_gesture(&self.store);
    }

    pub fn end_gesture(&mut self) -> bool {
        self.history.end_gesture(&self.store)
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    pub fn copy_selection(&mut self, node_ids: &[NodeId]) -> bool {
        self.clipboard.copy(node_ids, &self.store)
    }

    /// Paste the clipboard one step further out than the last paste.
    /// Returns the new node ids, or `None` when the clipboard is empty.
    pub fn paste_clipboard(&mut self) -> Option<Vec<NodeId>> {
        if self.clipboard.is_empty() {
            return None;
        }
        self.record();
        let pasted = self.clipboard.paste(&self.store, self.config.paste_step)?;
        Some(self.insert(pasted))
    }

    /// Copy then delete.
    pub fn cut_selection(&mut self, node_ids: &[NodeId]) -> bool {
        if !self.copy_selection(node_ids) {
            return false;
        }
        self.delete_selection(node_ids, &[])
    }

    /// Clone the nodes in `node_ids` one step out, without touching the
    /// clipboard.
    pub fn duplicate_selection(&mut self, node_ids: &[NodeId]) -> Option<Vec<NodeId>> {
        let pasted = clipboard::duplicate(node_ids, &self.store, self.config.paste_step)?;
        self.record();
        Some(self.insert(pasted))
    }

    /// Append pasted nodes and edges. The pasted nodes become the whole
    /// selection.
    fn insert(&mut self, mut pasted: Pasted) -> Vec<NodeId> {
        let ids = pasted.node_ids();
        self.deselect_all();
        for node in &mut pasted.nodes {
            node.selected = true;
        }
        self.store.add_nodes(pasted.nodes);
        self.store.add_edges(pasted.edges);
        self.refresh_z_order();
        ids
    }

    // ─── Structural edits ────────────────────────────────────────────────

    /// Delete nodes (with everything nested inside them and every edge
    /// touching any of them) plus the listed edges.
    pub fn delete_selection(&mut self, node_ids: &[NodeId], edge_ids: &[NodeId]) -> bool {
        if node_ids.is_empty() && edge_ids.is_empty() {
            return false;
        }
        let hierarchy = Hierarchy::build(&self.store);
        let mut doomed: HashSet<NodeId> = HashSet::new();
        for &id in node_ids {
            if hierarchy.contains(id) {
                doomed.insert(id);
                doomed.extend(hierarchy.descendants(id));
            }
        }
        let doomed_edges: HashSet<NodeId> = edge_ids.iter().copied().collect();
        let edges: Vec<Edge> = self
            .store
            .edges()
            .iter()
            .filter(|e| !doomed_edges.contains(&e.id) && !doomed.iter().any(|&n| e.touches(n)))
            .cloned()
            .collect();
        if doomed.is_empty() && edges.len() == self.store.edges().len() {
            return false;
        }

        self.record();
        let nodes = self
            .store
            .nodes()
            .iter()
            .filter(|n| !doomed.contains(&n.id))
            .cloned()
            .collect();
        log::debug!(
            "delete: {} nodes, {} edges",
            doomed.len(),
            self.store.edges().len() - edges.len()
        );
        self.store.set_nodes(nodes);
        self.store.set_edges(edges);
        self.refresh_z_order();
        true
    }

    /// Record the board, then empty it.
    pub fn clear_all(&mut self) -> bool {
        self.record();
        let had_content = !self.store.nodes().is_empty() || !self.store.edges().is_empty();
        self.store.set_edges(Vec::new());
        self.store.set_nodes(Vec::new());
        log::debug!("board cleared");
        had_content
    }

    /// Connect `source` to `target`. The edge joins the source's paint layer.
    pub fn connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        style: Option<EdgeStyle>,
    ) -> BoardResult<NodeId> {
        let id = NodeId::fresh("edge", |id| self.store.is_taken(id));
        let mut edge = Edge::new(id, source, target).with_style(style.unwrap_or_default());
        validate_edge(&self.store, &edge)?;
        edge.z_index = self.store.node(source).map(|n| n.z_index).unwrap_or_default();

        self.record();
        self.store.add_edges(vec![edge]);
        self.refresh_z_order();
        log::debug!("connected {source} -> {target} as {id}");
        Ok(id)
    }

    /// Append `node` and make it the only selected node.
    pub fn add_node(&mut self, mut node: Node) -> BoardResult<NodeId> {
        if self.store.is_taken(node.id) {
            return Err(BoardError::DuplicateId(node.id));
        }
        if let Some(parent) = node.parent.filter(|&p| !self.store.contains_node(p)) {
            return Err(BoardError::UnknownNode(parent));
        }
        self.record();
        self.deselect_all();
        let id = node.id;
        node.selected = true;
        self.store.add_nodes(vec![node]);
        self.refresh_z_order();
        Ok(id)
    }

    /// Place a toolbar shape at `position` with a fresh id and default size.
    pub fn place_node(&mut self, kind: ShapeKind, position: Position) -> BoardResult<NodeId> {
        let node = Node::place(kind, position, |id| self.store.is_taken(id));
        self.add_node(node)
    }

    /// Nest `child` under `parent` (or un-nest it with `None`), keeping
    /// its on-screen position. Returns `Ok(false)` when nothing changes.
    pub fn reparent(&mut self, child: NodeId, parent: Option<NodeId>) -> BoardResult<bool> {
        let node = self.store.node(child).ok_or(BoardError::UnknownNode(child))?;
        if node.parent == parent {
            return Ok(false);
        }
        let absolute = absolute_position(&self.store, node);
        let origin = match parent {
            Some(p) => {
                let parent_node = self.store.node(p).ok_or(BoardError::UnknownNode(p))?;
                if Hierarchy::build(&self.store).would_cycle(child, p) {
                    return Err(BoardError::ParentCycle { child, parent: p });
                }
                absolute_position(&self.store, parent_node)
            }
            None => Default::default(),
        };

        self.record();
        if let Some(node) = self.store.node_mut(child) {
            node.parent = parent;
            node.position = Position::new(absolute.x - origin.x, absolute.y - origin.y);
        }
        self.refresh_z_order();
        Ok(true)
    }

    // ─── Live edits ──────────────────────────────────────────────────────

    /// Translate nodes. A node whose ancestor also moves is skipped, since
    /// it already travels with that ancestor.
    pub fn move_nodes(&mut self, ids: &[NodeId], dx: f64, dy: f64) -> bool {
        let hierarchy = Hierarchy::build(&self.store);
        let moving: HashSet<NodeId> = ids.iter().copied().collect();
        let roots: HashSet<NodeId> = moving
            .iter()
            .copied()
            .filter(|&id| !moving.iter().any(|&other| hierarchy.is_ancestor_of(other, id)))
            .collect();

        let mut changed = false;
        for node in self.store.nodes_mut() {
            if roots.contains(&node.id) {
                node.position = node.position.offset(dx, dy);
                changed = true;
            }
        }
        changed
    }

    pub fn resize_node(&mut self, id: NodeId, width: f64, height: f64) -> bool {
        let Some(node) = self.store.node_mut(id) else {
            return false;
        };
        node.size = Some(Size::new(width.max(0.0), height.max(0.0)));
        true
    }

    pub fn set_node_style(&mut self, id: NodeId, style: ShapeStyle) -> bool {
        let Some(node) = self.store.node_mut(id) else {
            return false;
        };
        node.style = style;
        true
    }

    pub fn set_edge_style(&mut self, id: NodeId, style: EdgeStyle) -> bool {
        let Some(edge) = self.store.edge_mut(id) else {
            return false;
        };
        edge.style = style;
        true
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select exactly `ids` among the nodes and clear the edge selection.
    pub fn select_nodes(&mut self, ids: &[NodeId]) {
        let wanted: HashSet<NodeId> = ids.iter().copied().collect();
        for node in self.store.nodes_mut() {
            node.selected = wanted.contains(&node.id);
        }
        for edge in self.store.edges_mut() {
            edge.selected = false;
        }
    }

    /// Select exactly `ids` among the edges, leaving nodes alone.
    pub fn select_edges(&mut self, ids: &[NodeId]) {
        let wanted: HashSet<NodeId> = ids.iter().copied().collect();
        for edge in self.store.edges_mut() {
            edge.selected = wanted.contains(&edge.id);
        }
    }

    pub fn select_all(&mut self) -> bool {
        let mut changed = false;
        for node in self.store.nodes_mut() {
            changed |= !node.selected;
            node.selected = true;
        }
        for edge in self.store.edges_mut() {
            changed |= !edge.selected;
            edge.selected = true;
        }
        changed
    }

    pub fn deselect_all(&mut self) -> bool {
        let mut changed = false;
        for node in self.store.nodes_mut() {
            changed |= node.selected;
            node.selected = false;
        }
        for edge in self.store.edges_mut() {
            changed |= edge.selected;
            edge.selected = false;
        }
        changed
    }

    pub fn selected_node_ids(&self) -> Selection {
        self.store
            .nodes()
            .iter()
            .filter(|n| n.selected)
            .map(|n| n.id)
            .collect()
    }

    pub fn selected_edge_ids(&self) -> Selection {
        self.store
            .edges()
            .iter()
            .filter(|e| e.selected)
            .map(|e| e.id)
            .collect()
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Route every connector, in paint order.
    pub fn routes(&self) -> Vec<(NodeId, Route)> {
        route_edges(&self.store, &self.config.route)
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Execute a board command. Returns `true` if the board or its
    /// history changed.
    pub fn dispatch(&mut self, command: BoardCommand) -> bool {
        log::debug!("dispatch {command}");
        match command {
            BoardCommand::Undo => self.undo(),
            BoardCommand::Redo => self.redo(),
            BoardCommand::Clear => self.clear_all(),
            BoardCommand::Commit => self.commit_snapshot(),
        }
    }

    /// Run a shortcut against the current selection. Returns `true` if
    /// the board changed.
    pub fn apply_shortcut(&mut self, action: ShortcutAction) -> bool {
        let nodes = self.selected_node_ids();
        match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Copy => {
                self.copy_selection(&nodes);
                false
            }
            ShortcutAction::Cut => self.cut_selection(&nodes),
            ShortcutAction::Paste => self.paste_clipboard().is_some(),
            ShortcutAction::Duplicate => self.duplicate_selection(&nodes).is_some(),
            ShortcutAction::SelectAll => self.select_all(),
            ShortcutAction::Delete => {
                let edges = self.selected_edge_ids();
                self.delete_selection(&nodes, &edges)
            }
            ShortcutAction::Deselect => self.deselect_all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node(id: &str, x: f64, y: f64) -> Node {
        Node::new(id.into(), ShapeKind::Rectangle, Position::new(x, y)).with_size(100.0, 50.0)
    }

    fn engine() -> BoardEngine {
        BoardEngine::new(Board::from_parts(
            vec![node("a", 0.0, 0.0), node("b", 300.0, 0.0), node("c", 0.0, 300.0)],
            vec![Edge::new("ab".into(), "a".into(), "b".into())],
        ))
    }

    fn node_ids(engine: &BoardEngine) -> Vec<&str> {
        engine.store().nodes().iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn connect_validates_and_records() {
        let mut e = engine();
        assert_eq!(
            e.connect("a".into(), "a".into(), None),
            Err(BoardError::SelfLoop("a".into()))
        );
        assert_eq!(
            e.connect("a".into(), "zz".into(), None),
            Err(BoardError::UnknownNode("zz".into()))
        );
        assert!(!e.can_undo());

        let id = e.connect("b".into(), "c".into(), None).unwrap();
        assert!(e.store().edge(id).is_some());
        assert!(e.undo());
        assert!(e.store().edge(id).is_none());
    }

    #[test]
    fn connector_takes_source_layer() {
        let mut e = engine();
        e.reparent("c".into(), Some("a".into())).unwrap();
        let id = e.connect("c".into(), "b".into(), None).unwrap();
        let c_z = e.store().node("c".into()).unwrap().z_index;
        assert_eq!(e.store().edge(id).unwrap().z_index, c_z);
    }

    #[test]
    fn add_node_selects_only_it() {
        let mut e = engine();
        e.select_nodes(&["a".into()]);
        let id = e
            .place_node(ShapeKind::Tag, Position::new(10.0, 10.0))
            .unwrap();
        assert_eq!(e.selected_node_ids().as_slice(), &[id]);
        assert_eq!(e.store().node(id).unwrap().size, Some(Size::new(96.0, 28.0)));
        assert_eq!(
            e.add_node(node("a", 0.0, 0.0)),
            Err(BoardError::DuplicateId("a".into()))
        );
    }

    #[test]
    fn reparent_keeps_screen_position() {
        let mut e = engine();
        assert_eq!(e.reparent("b".into(), Some("c".into())), Ok(true));
        let b = e.store().node("b".into()).unwrap();
        assert_eq!(b.position, Position::new(300.0, -300.0));
        assert_eq!(absolute_position(e.store(), b), board_core::Point::new(300.0, 0.0));

        assert_eq!(e.reparent("b".into(), None), Ok(true));
        assert_eq!(
            e.store().node("b".into()).unwrap().position,
            Position::new(300.0, 0.0)
        );
        assert_eq!(e.reparent("b".into(), None), Ok(false));
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut e = engine();
        e.reparent("b".into(), Some("a".into())).unwrap();
        let before = e.history().past_len();
        assert_eq!(
            e.reparent("a".into(), Some("b".into())),
            Err(BoardError::ParentCycle {
                child: "a".into(),
                parent: "b".into()
            })
        );
        assert_eq!(e.history().past_len(), before);
    }

    #[test]
    fn delete_cascades_to_children_and_edges() {
        let mut e = engine();
        e.reparent("b".into(), Some("a".into())).unwrap();
        assert!(e.delete_selection(&["a".into()], &[]));
        assert_eq!(node_ids(&e), vec!["c"]);
        assert!(e.store().edges().is_empty());
    }

    #[test]
    fn delete_nothing_is_a_noop() {
        let mut e = engine();
        assert!(!e.delete_selection(&[], &[]));
        assert!(!e.delete_selection(&["ghost".into()], &["nope".into()]));
        assert!(!e.can_undo());
    }

    #[test]
    fn delete_edge_only() {
        let mut e = engine();
        assert!(e.delete_selection(&[], &["ab".into()]));
        assert_eq!(node_ids(&e).len(), 3);
        assert!(e.store().edges().is_empty());
    }

    #[test]
    fn move_skips_nodes_riding_on_a_moving_parent() {
        let mut e = engine();
        e.reparent("c".into(), Some("a".into())).unwrap();
        assert!(e.move_nodes(&["a".into(), "c".into()], 10.0, 5.0));
        assert_eq!(e.store().node("a".into()).unwrap().position, Position::new(10.0, 5.0));
        assert_eq!(e.store().node("c".into()).unwrap().position, Position::new(0.0, 300.0));
    }

    #[test]
    fn gesture_is_one_undo_step() {
        let mut e = engine();
        e.begin_gesture();
        for _ in 0..5 {
            e.move_nodes(&["a".into()], 2.0, 0.0);
        }
        e.resize_node("a".into(), 120.0, 60.0);
        assert!(e.end_gesture());
        assert!(e.undo());
        let a = e.store().node("a".into()).unwrap();
        assert_eq!(a.position.x, 0.0);
        assert_eq!(a.size, Some(Size::new(100.0, 50.0)));
    }

    #[test]
    fn dispatch_clear_then_undo() {
        let mut e = engine();
        assert!(e.dispatch(BoardCommand::Clear));
        assert!(e.store().nodes().is_empty());
        assert!(e.dispatch(BoardCommand::Undo));
        assert_eq!(node_ids(&e), vec!["a", "b", "c"]);
        assert_eq!(e.store().edges().len(), 1);
    }

    #[test]
    fn shortcuts_act_on_selection() {
        let mut e = engine();
        e.select_nodes(&["a".into(), "b".into()]);
        assert!(!e.apply_shortcut(ShortcutAction::Copy));
        assert!(e.apply_shortcut(ShortcutAction::Paste));
        assert_eq!(e.store().nodes().len(), 5);
        assert_eq!(e.store().edges().len(), 2);
        let pasted = e.selected_node_ids();
        assert_eq!(pasted.len(), 2);
        assert!(!pasted.contains(&"a".into()) && !pasted.contains(&"b".into()));

        e.select_nodes(&["c".into()]);
        assert!(e.apply_shortcut(ShortcutAction::Delete));
        assert!(e.store().node("c".into()).is_none());
        assert!(e.apply_shortcut(ShortcutAction::Undo));
        assert!(e.store().node("c".into()).is_some());
    }

    #[test]
    fn cut_removes_and_fills_clipboard() {
        let mut e = engine();
        assert!(e.cut_selection(&["a".into()]));
        assert!(e.store().node("a".into()).is_none());
        let ids = e.paste_clipboard().unwrap();
        let pasted = e.store().node(ids[0]).unwrap();
        assert_eq!(pasted.position, Position::new(24.0, 24.0));
    }

    #[test]
    fn style_edits_are_live() {
        let mut e = engine();
        let style = ShapeStyle {
            label: "API".into(),
            ..ShapeStyle::default()
        };
        assert!(e.set_node_style("a".into(), style));
        assert_eq!(e.store().node("a".into()).unwrap().style.label, "API");
        assert!(!e.set_node_style("ghost".into(), ShapeStyle::default()));
        assert!(e.set_edge_style(
            "ab".into(),
            EdgeStyle {
                animated: true,
                ..EdgeStyle::default()
            }
        ));
        assert!(!e.can_undo());
    }
}
