//! Connector routing: attachment sides and orthogonal rounded paths.
//!
//! Routing is state-free. Every call re-reads both endpoint boxes, picks
//! the sides from their relative position, and builds a "smooth step"
//! path: axis-aligned segments with quadratic rounded corners. A
//! connector therefore flips sides live as a node is dragged past its
//! neighbor; nothing about the chosen side is ever stored.

use crate::geometry::{Side, SidePair, anchor, node_bounds, pick_sides};
use crate::id::NodeId;
use crate::model::Edge;
use crate::store::GraphStore;
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Config ───────────────────────────────────────────────────────────────

/// Routing constants, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouteConfig {
    /// Distance outside the node box where the connector ends, so the
    /// arrowhead stays visible.
    pub gap: f64,
    /// Corner rounding radius.
    pub corner_radius: f64,
    /// Length of the straight stub leaving each anchor before the first bend.
    pub step_offset: f64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            gap: 10.0,
            corner_radius: 8.0,
            step_offset: 20.0,
        }
    }
}

// ─── Route ────────────────────────────────────────────────────────────────

/// A routed connector.
#[derive(Debug, Clone)]
pub struct Route {
    pub sides: SidePair,
    /// Source anchor (path start).
    pub start: Point,
    /// Target anchor (path end).
    pub end: Point,
    /// Orthogonal polyline from `start` to `end`, before corner rounding.
    pub points: SmallVec<[Point; 6]>,
    /// Where a label sits: the middle of the longest run.
    pub label: Point,
    pub path: BezPath,
}

impl Route {
    /// SVG path data (`d` attribute).
    pub fn svg(&self) -> String {
        self.path.to_svg()
    }
}

/// Route between two absolute boxes.
pub fn route_between(source: Rect, target: Rect, config: &RouteConfig) -> Route {
    let delta = target.center() - source.center();
    let sides = pick_sides(delta.x, delta.y);
    let start = anchor(sides.source, source, config.gap);
    let end = anchor(sides.target, target, config.gap);
    let hint = start.midpoint(end);

    let (points, label) = step_points(
        start,
        sides.source,
        end,
        sides.target,
        hint,
        config.step_offset,
    );
    let path = rounded_path(&points, config.corner_radius);
    Route {
        sides,
        start,
        end,
        points,
        label,
        path,
    }
}

/// Route one edge. `None` when either endpoint is not on the board, e.g.
/// while a deletion is in flight: the connector is simply not drawn.
pub fn route_edge<S: GraphStore + ?Sized>(
    store: &S,
    edge: &Edge,
    config: &RouteConfig,
) -> Option<Route> {
    let Some(source) = node_bounds(store, edge.source) else {
        log::trace!("edge {}: source {} unresolved", edge.id, edge.source);
        return None;
    };
    let Some(target) = node_bounds(store, edge.target) else {
        log::trace!("edge {}: target {} unresolved", edge.id, edge.target);
        return None;
    };
    Some(route_between(source, target, config))
}

/// Route every edge on the board, in paint order, skipping unresolvable ones.
pub fn route_edges<S: GraphStore + ?Sized>(
    store: &S,
    config: &RouteConfig,
) -> Vec<(NodeId, Route)> {
    store
        .edges()
        .iter()
        .filter_map(|e| route_edge(store, e, config).map(|r| (e.id, r)))
        .collect()
}

// ─── Step routing ─────────────────────────────────────────────────────────

/// Lay out the orthogonal polyline between two anchors.
///
/// Each anchor first extends `offset` units straight out of its side.
/// Opposite sides (Right → Left, Bottom → Top) bend through `center`;
/// same or perpendicular sides bend through a single corner point.
/// Returns the points (anchors included) and the label position.
pub fn step_points(
    source: Point,
    source_side: Side,
    target: Point,
    target_side: Side,
    center: Point,
    offset: f64,
) -> (SmallVec<[Point; 6]>, Point) {
    let s_dir = source_side.direction();
    let t_dir = target_side.direction();
    let source_gapped = Point::new(source.x + s_dir.0 * offset, source.y + s_dir.1 * offset);
    let target_gapped = Point::new(target.x + t_dir.0 * offset, target.y + t_dir.1 * offset);

    // Main axis follows the source side; `dir` is the heading along it.
    let horizontal = source_side.is_horizontal();
    let main = |p: Point| if horizontal { p.x } else { p.y };
    let cross = |p: Point| if horizontal { p.y } else { p.x };
    let along = |d: (f64, f64)| if horizontal { d.0 } else { d.1 };
    let across = |d: (f64, f64)| if horizontal { d.1 } else { d.0 };
    let dir = if main(source_gapped) < main(target_gapped) {
        1.0
    } else {
        -1.0
    };

    let mut bends: SmallVec<[Point; 2]> = SmallVec::new();
    let mut source_shift = 0.0;
    let mut target_shift = 0.0;
    let label;

    if along(s_dir) * along(t_dir) == -1.0 {
        let vertical_split = [
            Point::new(center.x, source_gapped.y),
            Point::new(center.x, target_gapped.y),
        ];
        let horizontal_split = [
            Point::new(source_gapped.x, center.y),
            Point::new(target_gapped.x, center.y),
        ];
        let split = if (along(s_dir) == dir) == horizontal {
            vertical_split
        } else {
            horizontal_split
        };
        bends.extend(split);
        label = center;
    } else {
        let source_target = Point::new(source_gapped.x, target_gapped.y);
        let target_source = Point::new(target_gapped.x, source_gapped.y);
        let mut corner = if horizontal {
            if s_dir.0 == dir {
                target_source
            } else {
                source_target
            }
        } else if s_dir.1 == dir {
            source_target
        } else {
            target_source
        };

        if source_side == target_side {
            // Same-side anchors closer than the stub would overlap the
            // corner; pull the leading stub back.
            let diff = (main(source) - main(target)).abs();
            if diff <= offset {
                let shift = (offset - 1.0).min(offset - diff);
                if along(s_dir) == dir {
                    let sign = if main(source_gapped) > main(source) { -1.0 } else { 1.0 };
                    source_shift = sign * shift;
                } else {
                    let sign = if main(target_gapped) > main(target) { -1.0 } else { 1.0 };
                    target_shift = sign * shift;
                }
            }
        } else {
            let same_dir = along(s_dir) == across(t_dir);
            let s_gt = cross(source_gapped) > cross(target_gapped);
            let s_lt = cross(source_gapped) < cross(target_gapped);
            let flip = if along(s_dir) == 1.0 {
                (!same_dir && s_gt) || (same_dir && s_lt)
            } else {
                (!same_dir && s_lt) || (same_dir && s_gt)
            };
            if flip {
                corner = if horizontal { source_target } else { target_source };
            }
        }

        let sg = shift_main(source_gapped, horizontal, source_shift);
        let tg = shift_main(target_gapped, horizontal, target_shift);
        let max_x = (sg.x - corner.x).abs().max((tg.x - corner.x).abs());
        let max_y = (sg.y - corner.y).abs().max((tg.y - corner.y).abs());
        label = if max_x >= max_y {
            Point::new((sg.x + tg.x) / 2.0, corner.y)
        } else {
            Point::new(corner.x, (sg.y + tg.y) / 2.0)
        };
        bends.push(corner);
    }

    let mut points = SmallVec::new();
    points.push(source);
    points.push(shift_main(source_gapped, horizontal, source_shift));
    points.extend(bends);
    points.push(shift_main(target_gapped, horizontal, target_shift));
    points.push(target);
    (points, label)
}

fn shift_main(p: Point, horizontal: bool, by: f64) -> Point {
    if horizontal {
        Point::new(p.x + by, p.y)
    } else {
        Point::new(p.x, p.y + by)
    }
}

/// Trace `points` with every interior corner rounded by up to `radius`.
pub fn rounded_path(points: &[Point], radius: f64) -> BezPath {
    let mut path = BezPath::new();
    let Some((&first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(first);
    for w in points.windows(3) {
        push_bend(&mut path, w[0], w[1], w[2], radius);
    }
    if let Some(&last) = rest.last() {
        path.line_to(last);
    }
    path
}

fn push_bend(path: &mut BezPath, a: Point, b: Point, c: Point, radius: f64) {
    let size = (a.distance(b) / 2.0).min(b.distance(c) / 2.0).min(radius);

    // Collinear: no corner to round.
    if (a.x == b.x && b.x == c.x) || (a.y == b.y && b.y == c.y) {
        path.line_to(b);
        return;
    }

    if a.y == b.y {
        // Horizontal in, vertical out.
        let x_dir = if a.x < c.x { -1.0 } else { 1.0 };
        let y_dir = if a.y < c.y { 1.0 } else { -1.0 };
        path.line_to(Point::new(b.x + size * x_dir, b.y));
        path.quad_to(b, Point::new(b.x, b.y + size * y_dir));
    } else {
        let x_dir = if a.x < c.x { 1.0 } else { -1.0 };
        let y_dir = if a.y < c.y { -1.0 } else { 1.0 };
        path.line_to(Point::new(b.x, b.y + size * y_dir));
        path.quad_to(b, Point::new(b.x + size * x_dir, b.y));
    }
}
