pub mod error;
pub mod geometry;
pub mod hierarchy;
pub mod id;
pub mod model;
pub mod route;
pub mod store;
pub mod zorder;

pub use error::{BoardError, BoardResult};
pub use geometry::{Side, SidePair, node_bounds, pick_sides};
pub use hierarchy::Hierarchy;
pub use id::NodeId;
pub use model::*;
pub use route::{Route, RouteConfig, route_edge, route_edges};
pub use store::{Board, GraphStore, validate_edge};
pub use zorder::{ZOrderConfig, apply_z_order, order_keys};

// Re-export kurbo geometry so downstream crates don't need a direct dependency
pub use kurbo::{BezPath, Point, Rect};
