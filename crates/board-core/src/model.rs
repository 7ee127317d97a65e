//! Core data model for board documents.
//!
//! A board is a flat, ordered list of shape nodes plus a list of
//! directional connectors (edges) between them. Nesting is expressed by a
//! node's optional `parent`; a child's position is relative to its
//! parent's top-left corner. Styles are closed, per-kind structs so the
//! engine never has to inspect free-form dictionaries.

use crate::id::NodeId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque color from 8-bit channels.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA` or `transparent`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.eq_ignore_ascii_case("transparent") {
            return Some(Self::TRANSPARENT);
        }
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let short = |i: usize| hex_val(bytes[i]).map(|v| (v * 17) as f32 / 255.0);
        let long = |i: usize| -> Option<f32> {
            let v = hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?;
            Some(v as f32 / 255.0)
        };

        match bytes.len() {
            3 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, 1.0)),
            4 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, 1.0)),
            8 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (
            channel(self.r),
            channel(self.g),
            channel(self.b),
            channel(self.a),
        );
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color: {s}")))
    }
}

// ─── Geometry primitives ─────────────────────────────────────────────────

/// Top-left position of a node, parent-relative when the node is nested.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Measured node size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Pan/zoom of the canvas. Saved with the board for the UI; editing
/// never reads it and undo never restores it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

// ─── Styling ─────────────────────────────────────────────────────────────

/// Horizontal label alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Border / connector line pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

/// Default border and connector gray.
pub const NEUTRAL_GRAY: Color = Color::rgb8(0xA3, 0xA3, 0xA3);

/// Visual payload of a shape. Opaque to the engine apart from cloning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeStyle {
    pub label: String,
    pub fill: Color,
    pub font_color: Color,
    pub align: TextAlign,
    pub font_weight: u16,
    pub font_size: f32,
    pub border_color: Color,
    pub border_style: LineStyle,
    pub border_width: f32,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            label: String::new(),
            fill: Color::BLACK,
            font_color: Color::WHITE,
            align: TextAlign::Center,
            font_weight: 400,
            font_size: 8.0,
            border_color: NEUTRAL_GRAY,
            border_style: LineStyle::Solid,
            border_width: 1.0,
        }
    }
}

impl ShapeStyle {
    /// The style a freshly placed shape of `kind` starts with.
    pub fn for_kind(kind: &ShapeKind) -> Self {
        match kind {
            ShapeKind::Text => Self {
                label: "Text".into(),
                fill: Color::TRANSPARENT,
                align: TextAlign::Left,
                ..Self::default()
            },
            ShapeKind::Tag => Self {
                fill: Color::rgb8(0xE5, 0xE7, 0xEB),
                font_color: Color::rgb8(0x11, 0x11, 0x11),
                font_weight: 600,
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

/// Connector styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: Color,
    pub stroke_width: f32,
    pub line: LineStyle,
    pub animated: bool,
    /// Draw an arrowhead at the target end.
    pub arrow_end: bool,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            stroke: NEUTRAL_GRAY,
            stroke_width: 1.0,
            line: LineStyle::Solid,
            animated: false,
            arrow_end: true,
        }
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// The shape kinds a node can take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Triangle,
    Diamond,
    Hexagon,
    Text,
    Tag,
    /// Catalog icon, referenced by its asset path.
    Icon {
        src: String,
    },
}

impl ShapeKind {
    /// Size a shape gets when placed from the toolbar.
    pub fn default_size(&self) -> Size {
        match self {
            ShapeKind::Text => Size::new(120.0, 28.0),
            ShapeKind::Tag => Size::new(96.0, 28.0),
            ShapeKind::Icon { .. } => Size::new(48.0, 48.0),
            _ => Size::new(140.0, 56.0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Hexagon => "hexagon",
            ShapeKind::Text => "text",
            ShapeKind::Tag => "tag",
            ShapeKind::Icon { .. } => "icon",
        }
    }
}

/// A placed shape on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,

    #[serde(flatten)]
    pub kind: ShapeKind,

    /// Top-left corner, relative to the parent when `parent` is set.
    pub position: Position,

    /// Measured size. `None` until the UI has laid the node out once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,

    /// Containing node, for nesting/grouping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,

    #[serde(default)]
    pub style: ShapeStyle,

    /// Derived paint order. Written by the z-order engine.
    #[serde(default)]
    pub z_index: i64,

    #[serde(default)]
    pub selected: bool,
}

impl Node {
    pub fn new(id: NodeId, kind: ShapeKind, position: Position) -> Self {
        let style = ShapeStyle::for_kind(&kind);
        Self {
            id,
            kind,
            position,
            size: None,
            parent: None,
            style,
            z_index: 0,
            selected: false,
        }
    }

    /// A toolbar-placed node: fresh `n_<k>` id and the kind's default size.
    pub fn place(kind: ShapeKind, position: Position, taken: impl Fn(NodeId) -> bool) -> Self {
        let size = kind.default_size();
        Self::new(NodeId::fresh("n", taken), kind, position).with_size(size.width, size.height)
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Size with the "not yet measured" case treated as zero.
    pub fn size_or_zero(&self) -> Size {
        self.size.unwrap_or_default()
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// A directional connector between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: NodeId,
    pub source: NodeId,
    pub target: NodeId,

    #[serde(default)]
    pub style: EdgeStyle,

    /// Derived paint order, inherited from the source node.
    #[serde(default)]
    pub z_index: i64,

    #[serde(default)]
    pub selected: bool,
}

impl Edge {
    pub fn new(id: NodeId, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            source,
            target,
            style: EdgeStyle::default(),
            z_index: 0,
            selected: false,
        }
    }

    pub fn with_style(mut self, style: EdgeStyle) -> Self {
        self.style = style;
        self
    }

    /// Whether either end of this edge is `id`.
    pub fn touches(&self, id: NodeId) -> bool {
        self.source == id || self.target == id
    }
}
