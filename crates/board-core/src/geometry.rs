//! Bounding boxes, centers, and attachment-side selection.
//!
//! Pure functions over the store. Boxes are absolute canvas rectangles
//! (`kurbo::Rect`); nested positions are resolved by walking parents.

use crate::id::NodeId;
use crate::model::Node;
use crate::store::GraphStore;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A side of a node's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Unit vector pointing out of the box through this side.
    pub fn direction(self) -> (f64, f64) {
        match self {
            Side::Left => (-1.0, 0.0),
            Side::Right => (1.0, 0.0),
            Side::Top => (0.0, -1.0),
            Side::Bottom => (0.0, 1.0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

/// Exit side on the source and entry side on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePair {
    pub source: Side,
    pub target: Side,
}

/// Choose sides from the source → target center delta.
///
/// Ties (`|dx| == |dy|`) route horizontally; a zero delta routes
/// Left → Right.
pub fn pick_sides(dx: f64, dy: f64) -> SidePair {
    if dx.abs() >= dy.abs() {
        if dx > 0.0 {
            SidePair {
                source: Side::Right,
                target: Side::Left,
            }
        } else {
            SidePair {
                source: Side::Left,
                target: Side::Right,
            }
        }
    } else if dy > 0.0 {
        SidePair {
            source: Side::Bottom,
            target: Side::Top,
        }
    } else {
        SidePair {
            source: Side::Top,
            target: Side::Bottom,
        }
    }
}

/// Midpoint of `side` on `rect`, pushed `gap` units outward.
pub fn anchor(side: Side, rect: Rect, gap: f64) -> Point {
    let c = rect.center();
    match side {
        Side::Left => Point::new(rect.x0 - gap, c.y),
        Side::Right => Point::new(rect.x1 + gap, c.y),
        Side::Top => Point::new(c.x, rect.y0 - gap),
        Side::Bottom => Point::new(c.x, rect.y1 + gap),
    }
}

/// Absolute top-left of `node`, summing parent offsets.
///
/// Stops at the first missing parent, or when a parent repeats.
pub fn absolute_position<S: GraphStore + ?Sized>(store: &S, node: &Node) -> Point {
    let mut x = node.position.x;
    let mut y = node.position.y;
    let mut visited = HashSet::from([node.id]);
    let mut next = node.parent;
    while let Some(pid) = next {
        if !visited.insert(pid) {
            log::warn!("parent loop through {pid} while resolving {}", node.id);
            break;
        }
        let Some(parent) = store.node(pid) else { break };
        x += parent.position.x;
        y += parent.position.y;
        next = parent.parent;
    }
    Point::new(x, y)
}

/// Absolute bounding box of a node; an unmeasured node is a zero-size box.
pub fn bounds_of<S: GraphStore + ?Sized>(store: &S, node: &Node) -> Rect {
    let origin = absolute_position(store, node);
    let size = node.size_or_zero();
    Rect::from_origin_size(origin, (size.width, size.height))
}

/// Absolute bounding box of the node `id`, if it is on the board.
pub fn node_bounds<S: GraphStore + ?Sized>(store: &S, id: NodeId) -> Option<Rect> {
    store.node(id).map(|n| bounds_of(store, n))
}

/// Absolute center of the node `id`, if it is on the board.
pub fn node_center<S: GraphStore + ?Sized>(store: &S, id: NodeId) -> Option<Point> {
    node_bounds(store, id).map(|r| r.center())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Position, ShapeKind};
    use crate::store::Board;

    fn sized(id: &str, x: f64, y: f64, w: f64, h: f64) -> Node {
        Node::new(id.into(), ShapeKind::Rectangle, Position::new(x, y)).with_size(w, h)
    }

    #[test]
    fn horizontal_when_dx_dominates() {
        let sides = pick_sides(100.0, 10.0);
        assert_eq!(sides.source, Side::Right);
        assert_eq!(sides.target, Side::Left);

        let back = pick_sides(-100.0, 10.0);
        assert_eq!(back.source, Side::Left);
        assert_eq!(back.target, Side::Right);
    }

    #[test]
    fn vertical_when_dy_dominates() {
        let sides = pick_sides(10.0, 100.0);
        assert_eq!(sides.source, Side::Bottom);
        assert_eq!(sides.target, Side::Top);

        let up = pick_sides(10.0, -100.0);
        assert_eq!(up.source, Side::Top);
        assert_eq!(up.target, Side::Bottom);
    }

    #[test]
    fn diagonal_tie_is_horizontal() {
        assert_eq!(pick_sides(50.0, 50.0).source, Side::Right);
        assert_eq!(pick_sides(0.0, 0.0).source, Side::Left);
    }

    #[test]
    fn anchors_sit_outside_the_box() {
        let r = Rect::new(0.0, 0.0, 100.0, 40.0);
        assert_eq!(anchor(Side::Left, r, 10.0), Point::new(-10.0, 20.0));
        assert_eq!(anchor(Side::Right, r, 10.0), Point::new(110.0, 20.0));
        assert_eq!(anchor(Side::Top, r, 10.0), Point::new(50.0, -10.0));
        assert_eq!(anchor(Side::Bottom, r, 10.0), Point::new(50.0, 50.0));
    }

    #[test]
    fn nested_positions_are_parent_relative() {
        let board = Board::from_parts(
            vec![
                sized("frame", 100.0, 50.0, 400.0, 300.0),
                sized("child", 20.0, 30.0, 40.0, 40.0).with_parent("frame".into()),
            ],
            vec![],
        );
        let r = node_bounds(&board, "child".into()).unwrap();
        assert_eq!(r, Rect::new(120.0, 80.0, 160.0, 120.0));
        assert_eq!(node_center(&board, "child".into()), Some(Point::new(140.0, 100.0)));
    }

    #[test]
    fn unmeasured_node_is_a_point() {
        let board = Board::from_parts(
            vec![Node::new("n".into(), ShapeKind::Text, Position::new(5.0, 6.0))],
            vec![],
        );
        let r = node_bounds(&board, "n".into()).unwrap();
        assert_eq!(r.width(), 0.0);
        assert_eq!(r.center(), Point::new(5.0, 6.0));
        assert!(node_bounds(&board, "missing".into()).is_none());
    }

    #[test]
    fn parent_loop_terminates() {
        let board = Board::from_parts(
            vec![
                sized("a", 1.0, 0.0, 1.0, 1.0).with_parent("b".into()),
                sized("b", 2.0, 0.0, 1.0, 1.0).with_parent("a".into()),
            ],
            vec![],
        );
        let p = absolute_position(&board, board.node("a".into()).unwrap());
        assert_eq!(p, Point::new(3.0, 0.0));
    }
}
