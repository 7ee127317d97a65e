//! Integration tests: paint order over a nested board fixture.

use board_core::hierarchy::Hierarchy;
use board_core::zorder::{ZOrderConfig, apply_z_order, order_keys};
use board_core::{Board, GraphStore, NodeId};
use pretty_assertions::assert_eq;

fn load() -> Board {
    serde_json::from_str(include_str!("fixtures/nested_flow.json")).unwrap()
}

#[test]
fn descendants_always_paint_above_ancestors() {
    let board = load();
    let keys = order_keys(&board, &ZOrderConfig::default());
    let h = Hierarchy::build(&board);

    for p in board.nodes() {
        for c in h.descendants(p.id) {
            assert!(
                keys[&c] > keys[&p.id],
                "{c} (key {}) should be above {} (key {})",
                keys[&c],
                p.id,
                keys[&p.id]
            );
        }
    }
}

#[test]
fn monotonic_even_when_children_precede_parents() {
    // Reverse document order: every child is listed before its parent.
    let mut board = load();
    let mut nodes = board.nodes().to_vec();
    nodes.reverse();
    board.set_nodes(nodes);

    let keys = order_keys(&board, &ZOrderConfig::default());
    let h = Hierarchy::build(&board);
    for p in board.nodes() {
        for c in h.descendants(p.id) {
            assert!(keys[&c] > keys[&p.id]);
        }
    }
}

#[test]
fn connectors_layer_with_their_source() {
    let mut board = load();
    apply_z_order(&mut board, &ZOrderConfig::default());

    for edge in board.edges() {
        let source = board.node(edge.source).unwrap();
        assert_eq!(edge.z_index, source.z_index, "edge {}", edge.id);
    }
    let keys: Vec<i64> = board.edges().iter().map(|e| e.z_index).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn reparenting_reorders_connectors() {
    let mut board = load();
    apply_z_order(&mut board, &ZOrderConfig::default());
    let before: Vec<NodeId> = board.edges().iter().map(|e| e.id).collect();

    // Pull the note deep inside the subnet: its connector now paints last.
    board.node_mut("note".into()).unwrap().parent = Some("subnet".into());
    assert!(apply_z_order(&mut board, &ZOrderConfig::default()));
    let after: Vec<NodeId> = board.edges().iter().map(|e| e.id).collect();

    assert_ne!(before, after);
    assert_eq!(after.last().copied(), Some(NodeId::intern("note-client")));
}
