//! WASM bridge for the board — exposes the editing engine to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Everything crosses the
//! boundary as strings: ids as plain strings, lists and records as JSON.
//! Failures come back as `false` or `{"ok":false,"error":"..."}`; nothing
//! here panics on bad input.

use board_core::{
    Board, EdgeStyle, GraphStore, Node, NodeId, Position, ShapeKind, ShapeStyle, Viewport,
};
use board_editor::{BoardCommand, BoardEngine, EditorConfig, Modifiers, ShortcutMap};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;

/// The JS-facing board controller.
///
/// Holds the engine (store, history, clipboard). The UI renders from
/// `nodes_json`/`edges_json`/`routes_json` and reports interaction back
/// through the methods below.
#[wasm_bindgen]
pub struct BoardCanvas {
    engine: BoardEngine,
}

impl Default for BoardCanvas {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl BoardCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook_setup();
        Self {
            engine: BoardEngine::default(),
        }
    }

    // ─── Store I/O ───────────────────────────────────────────────────────

    /// Replace the whole board from `{"nodes":[...],"edges":[...]}`.
    /// Clears history and the restore window.
    pub fn load_json(&mut self, json: &str) -> bool {
        let Some(board) = parse::<Board>(json) else {
            return false;
        };
        let config = self.engine.config().clone();
        self.engine = BoardEngine::with_config(board, config);
        true
    }

    pub fn board_json(&self) -> String {
        to_json(self.engine.store())
    }

    /// Remember the canvas pan/zoom so `board_json` saves it. Not an
    /// undo step.
    pub fn set_viewport(&mut self, x: f64, y: f64, zoom: f64) -> bool {
        if !(zoom.is_finite() && zoom > 0.0) {
            log::warn!("rejected viewport zoom {zoom}");
            return false;
        }
        self.engine.store_mut().set_viewport(Viewport { x, y, zoom });
        true
    }

    pub fn viewport_json(&self) -> String {
        to_json(&self.engine.store().viewport())
    }

    pub fn set_nodes_json(&mut self, json: &str) -> bool {
        let Some(nodes) = parse::<Vec<Node>>(json) else {
            return false;
        };
        self.engine.store_mut().set_nodes(nodes);
        self.engine.refresh_z_order();
        true
    }

    pub fn set_edges_json(&mut self, json: &str) -> bool {
        let Some(edges) = parse(json) else {
            return false;
        };
        self.engine.store_mut().set_edges(edges);
        self.engine.refresh_z_order();
        true
    }

    pub fn add_nodes_json(&mut self, json: &str) -> bool {
        let Some(nodes) = parse::<Vec<Node>>(json) else {
            return false;
        };
        self.engine.store_mut().add_nodes(nodes);
        self.engine.refresh_z_order();
        true
    }

    pub fn nodes_json(&self) -> String {
        to_json(self.engine.store().nodes())
    }

    pub fn edges_json(&self) -> String {
        to_json(self.engine.store().edges())
    }

    /// Merge partial editor config, e.g. `{"pasteStep":16}`, into the
    /// current one. Fields not sent keep their current values; anything
    /// but a JSON object is rejected.
    pub fn set_config_json(&mut self, json: &str) -> bool {
        let Some(patch) = parse::<Value>(json) else {
            return false;
        };
        if !patch.is_object() {
            log::warn!("rejected config from UI: not an object");
            return false;
        }
        let mut merged = match serde_json::to_value(self.engine.config()) {
            Ok(current) => current,
            Err(e) => {
                log::warn!("config serialization failed: {e}");
                return false;
            }
        };
        merge_json(&mut merged, patch);
        match serde_json::from_value::<EditorConfig>(merged) {
            Ok(config) => {
                self.engine.set_config(config);
                true
            }
            Err(e) => {
                log::warn!("rejected config from UI: {e}");
                false
            }
        }
    }

    pub fn config_json(&self) -> String {
        to_json(self.engine.config())
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.engine.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.engine.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.engine.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.engine.can_redo()
    }

    pub fn commit(&mut self) -> bool {
        self.engine.commit_snapshot()
    }

    /// Call once the frame after an undo/redo has been drawn.
    pub fn frame_settled(&mut self) {
        self.engine.frame_settled();
    }

    /// Edge-removal listener; `ids_json` is an array of edge ids.
    pub fn on_edges_removed(&mut self, ids_json: &str) -> bool {
        let Some(ids) = parse::<Vec<NodeId>>(ids_json) else {
            return false;
        };
        self.engine.on_edges_removed(&ids)
    }

    pub fn remove_edges_json(&mut self, ids_json: &str) -> bool {
        let Some(ids) = parse::<Vec<NodeId>>(ids_json) else {
            return false;
        };
        self.engine.remove_edges(&ids)
    }

    pub fn begin_gesture(&mut self) {
        self.engine.begin_gesture();
    }

    pub fn end_gesture(&mut self) -> bool {
        self.engine.end_gesture()
    }

    /// Run a board signal such as `"board:undo"`.
    pub fn dispatch(&mut self, signal: &str) -> bool {
        match signal.parse::<BoardCommand>() {
            Ok(cmd) => self.engine.dispatch(cmd),
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    // ─── Selection & clipboard ───────────────────────────────────────────

    pub fn select_by_ids(&mut self, ids_json: &str) -> bool {
        let Some(ids) = parse::<Vec<NodeId>>(ids_json) else {
            return false;
        };
        self.engine.select_nodes(&ids);
        true
    }

    pub fn select_edges_by_ids(&mut self, ids_json: &str) -> bool {
        let Some(ids) = parse::<Vec<NodeId>>(ids_json) else {
            return false;
        };
        self.engine.select_edges(&ids);
        true
    }

    pub fn deselect_all(&mut self) -> bool {
        self.engine.deselect_all()
    }

    /// JSON array of selected node ids.
    pub fn get_selected_ids(&self) -> String {
        to_json(&self.engine.selected_node_ids().to_vec())
    }

    pub fn get_selected_edge_ids(&self) -> String {
        to_json(&self.engine.selected_edge_ids().to_vec())
    }

    pub fn copy_selected(&mut self) -> bool {
        let ids = self.engine.selected_node_ids();
        self.engine.copy_selection(&ids)
    }

    pub fn cut_selected(&mut self) -> bool {
        let ids = self.engine.selected_node_ids();
        self.engine.cut_selection(&ids)
    }

    /// Paste; returns a JSON array of the new node ids (empty if nothing).
    pub fn paste(&mut self) -> String {
        to_json(&self.engine.paste_clipboard().unwrap_or_default())
    }

    pub fn duplicate_selected(&mut self) -> String {
        let ids = self.engine.selected_node_ids();
        to_json(&self.engine.duplicate_selection(&ids).unwrap_or_default())
    }

    pub fn delete_selected(&mut self) -> bool {
        let nodes = self.engine.selected_node_ids();
        let edges = self.engine.selected_edge_ids();
        self.engine.delete_selection(&nodes, &edges)
    }

    pub fn clear_all(&mut self) -> bool {
        self.engine.clear_all()
    }

    // ─── Structural edits ────────────────────────────────────────────────

    /// Returns `{"ok":true,"id":"..."}` or `{"ok":false,"error":"..."}`.
    pub fn connect(&mut self, source: &str, target: &str) -> String {
        let result = self
            .engine
            .connect(NodeId::intern(source), NodeId::intern(target), None);
        id_result(result)
    }

    /// Place a toolbar shape (`"rectangle"`, `"text"`, …) at canvas `(x, y)`.
    pub fn create_node_at(&mut self, kind: &str, x: f64, y: f64) -> String {
        let Ok(kind) = serde_json::from_value::<ShapeKind>(json!({ "type": kind })) else {
            return error_json(&format!("unknown shape kind: {kind}"));
        };
        id_result(self.engine.place_node(kind, Position::new(x, y)))
    }

    /// Place a catalog icon at canvas `(x, y)`.
    pub fn create_icon_at(&mut self, src: &str, x: f64, y: f64) -> String {
        let kind = ShapeKind::Icon { src: src.to_string() };
        id_result(self.engine.place_node(kind, Position::new(x, y)))
    }

    /// Nest `child` under `parent`; an empty `parent` un-nests it.
    pub fn reparent(&mut self, child: &str, parent: &str) -> String {
        let parent = (!parent.is_empty()).then(|| NodeId::intern(parent));
        match self.engine.reparent(NodeId::intern(child), parent) {
            Ok(changed) => json!({ "ok": true, "changed": changed }).to_string(),
            Err(e) => error_json(&e.to_string()),
        }
    }

    // ─── Live edits ──────────────────────────────────────────────────────

    pub fn move_nodes_json(&mut self, ids_json: &str, dx: f64, dy: f64) -> bool {
        let Some(ids) = parse::<Vec<NodeId>>(ids_json) else {
            return false;
        };
        self.engine.move_nodes(&ids, dx, dy)
    }

    pub fn resize_node(&mut self, id: &str, width: f64, height: f64) -> bool {
        self.engine.resize_node(NodeId::intern(id), width, height)
    }

    pub fn set_node_style_json(&mut self, id: &str, json: &str) -> bool {
        let Some(style) = parse::<ShapeStyle>(json) else {
            return false;
        };
        self.engine.set_node_style(NodeId::intern(id), style)
    }

    pub fn set_edge_style_json(&mut self, id: &str, json: &str) -> bool {
        let Some(style) = parse::<EdgeStyle>(json) else {
            return false;
        };
        self.engine.set_edge_style(NodeId::intern(id), style)
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Routed connectors in paint order:
    /// `[{"id","path","label":{"x","y"},"sourceSide","targetSide","zIndex"}]`.
    pub fn routes_json(&self) -> String {
        let store = self.engine.store();
        let routes: Vec<serde_json::Value> = self
            .engine
            .routes()
            .into_iter()
            .map(|(id, route)| {
                let z = store.edge(id).map(|e| e.z_index).unwrap_or_default();
                json!({
                    "id": id,
                    "path": route.svg(),
                    "label": { "x": route.label.x, "y": route.label.y },
                    "sourceSide": route.sides.source,
                    "targetSide": route.sides.target,
                    "zIndex": z,
                })
            })
            .collect();
        serde_json::Value::Array(routes).to_string()
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. Returns `{"changed":bool,"action":"<name>"}`.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        editing_text: bool,
    ) -> String {
        let mods = Modifiers {
            ctrl,
            shift,
            alt,
            meta,
        };
        let Some(action) = ShortcutMap::resolve(key, mods, editing_text) else {
            return r#"{"changed":false,"action":"none"}"#.to_string();
        };
        let changed = self.engine.apply_shortcut(action);
        json!({ "changed": changed, "action": action.name() }).to_string()
    }
}

// ─── JSON helpers ────────────────────────────────────────────────────────

fn parse<T: DeserializeOwned>(json: &str) -> Option<T> {
    serde_json::from_str(json)
        .map_err(|e| log::warn!("rejected JSON from UI: {e}"))
        .ok()
}

/// Overlay `patch` onto `base`: objects merge key by key, anything else
/// replaces.
fn merge_json(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                merge_json(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, patch) => *base = patch,
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| error_json(&format!("serialization error: {e}")))
}

fn error_json(message: &str) -> String {
    json!({ "ok": false, "error": message }).to_string()
}

fn id_result(result: board_core::BoardResult<NodeId>) -> String {
    match result {
        Ok(id) => json!({ "ok": true, "id": id }).to_string(),
        Err(e) => error_json(&e.to_string()),
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("board WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
