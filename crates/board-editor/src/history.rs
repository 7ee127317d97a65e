//! Snapshot-based undo/redo.
//!
//! Every structural edit first commits a full copy of the board to the
//! `past` stack. Undo swaps the current board for the newest past entry
//! and parks the current one on `future`; redo does the reverse. There
//! are no per-mutation inverses: restoring is always whole-list
//! replacement through the store setters.
//!
//! Drag gestures use **snapshot batching**: the board is captured when
//! the gesture starts and pushed once when it ends, but only if the
//! gesture actually changed something. A gesture entry differs from the
//! board after it only in attributes, so the next commit always compares
//! against it by content, whatever the configured policy.

use board_core::{Edge, GraphStore, Node};
use serde::{Deserialize, Serialize};

/// A deep copy of the board's node and edge lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Snapshot {
    pub fn capture<S: GraphStore + ?Sized>(store: &S) -> Self {
        Self {
            nodes: store.nodes().to_vec(),
            edges: store.edges().to_vec(),
        }
    }

    /// Replace the store's contents with this snapshot.
    pub fn restore<S: GraphStore + ?Sized>(self, store: &mut S) {
        store.set_nodes(self.nodes);
        store.set_edges(self.edges);
    }

    /// Same counts and the same ordered id sequences.
    pub fn same_identity(&self, other: &Snapshot) -> bool {
        self.nodes.len() == other.nodes.len()
            && self.edges.len() == other.edges.len()
            && self.nodes.iter().map(|n| n.id).eq(other.nodes.iter().map(|n| n.id))
            && self.edges.iter().map(|e| e.id).eq(other.edges.iter().map(|e| e.id))
    }
}

/// When two consecutive commits count as the same history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicy {
    /// Same node/edge counts and ids in the same order. Cheap, but an
    /// attribute-only edit (move, restyle) is folded into the previous
    /// entry.
    #[default]
    Identity,
    /// Full value equality.
    Content,
}

impl DedupPolicy {
    pub fn is_duplicate(self, newest: &Snapshot, candidate: &Snapshot) -> bool {
        match self {
            DedupPolicy::Identity => newest.same_identity(candidate),
            DedupPolicy::Content => newest == candidate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Maximum number of undo steps; `None` keeps everything.
    pub max_depth: Option<usize>,
    pub dedup: DedupPolicy,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: Some(200),
            dedup: DedupPolicy::Identity,
        }
    }
}

/// One `past` entry.
#[derive(Debug, Clone)]
struct Entry {
    snapshot: Snapshot,
    /// Pushed by `end_gesture`.
    gesture: bool,
}

/// Flags describing the edit currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditContext {
    /// Set while an undo/redo restore is being rendered; commits made
    /// by change listeners during that window are skipped.
    pub suppress_history_capture: bool,
}

/// Past/future snapshot stacks with gesture batching.
#[derive(Debug, Clone, Default)]
pub struct History {
    past: Vec<Entry>,
    future: Vec<Snapshot>,
    config: HistoryConfig,
    /// Gesture nesting depth (0 = no gesture).
    gesture_depth: usize,
    /// Board captured when the outermost gesture began.
    gesture_snapshot: Option<Snapshot>,
}

impl History {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: HistoryConfig) {
        self.config = config;
        self.enforce_depth();
    }

    /// Record the current board as an undo step. Returns `true` if an
    /// entry was pushed.
    pub fn commit<S: GraphStore + ?Sized>(&mut self, store: &S, ctx: &EditContext) -> bool {
        if ctx.suppress_history_capture {
            log::debug!("commit skipped: restore in progress");
            return false;
        }
        let snapshot = Snapshot::capture(store);
        let duplicate = self.past.last().is_some_and(|newest| {
            let policy = if newest.gesture {
                DedupPolicy::Content
            } else {
                self.config.dedup
            };
            policy.is_duplicate(&newest.snapshot, &snapshot)
        });
        if duplicate {
            log::trace!("commit skipped: duplicate of newest entry");
            return false;
        }
        self.push_past(snapshot, false);
        self.future.clear();
        log::debug!("commit: {} undo steps", self.past.len());
        true
    }

    /// Step back one entry. Returns `false` when there is nothing to undo.
    pub fn undo<S: GraphStore + ?Sized>(&mut self, store: &mut S) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        self.future.push(Snapshot::capture(store));
        previous.snapshot.restore(store);
        log::debug!("undo: {} left, {} redoable", self.past.len(), self.future.len());
        true
    }

    /// Step forward one entry. Returns `false` when there is nothing to redo.
    pub fn redo<S: GraphStore + ?Sized>(&mut self, store: &mut S) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        self.push_past(Snapshot::capture(store), false);
        next.restore(store);
        log::debug!("redo: {} undo steps, {} redoable", self.past.len(), self.future.len());
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Start a gesture. Nested calls only bump the depth.
    pub fn begin_gesture<S: GraphStore + ?Sized>(&mut self, store: &S) {
        if self.gesture_depth == 0 {
            self.gesture_snapshot = Some(Snapshot::capture(store));
        }
        self.gesture_depth += 1;
    }

    /// End a gesture. When the outermost gesture closes and the board
    /// differs from the captured one, the capture becomes one undo step.
    pub fn end_gesture<S: GraphStore + ?Sized>(&mut self, store: &S) -> bool {
        if self.gesture_depth == 0 {
            return false;
        }
        self.gesture_depth -= 1;
        if self.gesture_depth > 0 {
            return false;
        }
        let Some(before) = self.gesture_snapshot.take() else {
            return false;
        };
        if before == Snapshot::capture(store) {
            return false;
        }
        self.push_past(before, true);
        self.future.clear();
        log::debug!("gesture committed: {} undo steps", self.past.len());
        true
    }

    /// Forget every entry, including any open gesture.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.gesture_depth = 0;
        self.gesture_snapshot = None;
    }

    fn push_past(&mut self, snapshot: Snapshot, gesture: bool) {
        self.past.push(Entry { snapshot, gesture });
        self.enforce_depth();
    }

    fn enforce_depth(&mut self) {
        let Some(max) = self.config.max_depth else {
            return;
        };
        if self.past.len() > max {
            let excess = self.past.len() - max;
            self.past.drain(..excess);
        }
    }
}
