//! Integration tests: paint order and routing after engine edits.

use board_core::{Board, GraphStore, Hierarchy, NodeId, Side, order_keys};
use board_editor::BoardEngine;

fn make_engine() -> BoardEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    let board: Board = serde_json::from_str(include_str!("fixtures/checkout_flow.json")).unwrap();
    BoardEngine::new(board)
}

fn assert_monotonic(engine: &BoardEngine) {
    let store = engine.store();
    let h = Hierarchy::build(store);
    for node in store.nodes() {
        for d in h.descendants(node.id) {
            let child = store.node(d).unwrap();
            assert!(
                child.z_index > node.z_index,
                "{} ({}) must paint above {} ({})",
                d,
                child.z_index,
                node.id,
                node.z_index
            );
        }
    }
    for edge in store.edges() {
        assert_eq!(edge.z_index, store.node(edge.source).unwrap().z_index);
    }
}

#[test]
fn loaded_board_is_ordered() {
    let engine = make_engine();
    assert_monotonic(&engine);
}

#[test]
fn order_survives_edits_and_undo() {
    let mut engine = make_engine();
    engine.reparent("pay".into(), Some("group".into())).unwrap();
    assert_monotonic(&engine);
    engine.copy_selection(&["group".into(), "db".into()]);
    engine.paste_clipboard();
    assert_monotonic(&engine);
    engine.delete_selection(&["db".into()], &[]);
    assert_monotonic(&engine);
    while engine.undo() {
        assert_monotonic(&engine);
    }
}

#[test]
fn stored_keys_match_derived_keys() {
    let engine = make_engine();
    let keys = order_keys(engine.store(), &engine.config().z_order);
    for node in engine.store().nodes() {
        assert_eq!(node.z_index, keys[&node.id]);
    }
}

#[test]
fn routes_follow_moves() {
    let mut engine = make_engine();
    let side = |engine: &BoardEngine| {
        engine
            .routes()
            .into_iter()
            .find(|(id, _)| *id == NodeId::intern("web-cart"))
            .map(|(_, r)| r.sides.source)
    };
    assert_eq!(side(&engine), Some(Side::Right));

    // Drag the cart below the storefront: the connector flips to the bottom.
    engine.move_nodes(&["cart".into()], -240.0, 300.0);
    assert_eq!(side(&engine), Some(Side::Bottom));
}

#[test]
fn deleted_endpoint_is_not_routed() {
    let mut engine = make_engine();
    let before = engine.routes().len();
    engine.delete_selection(&["pay".into()], &[]);
    assert_eq!(engine.routes().len(), before - 2);
}
