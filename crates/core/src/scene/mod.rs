pub mod snapshot;
pub mod tree;

use serde::{Deserialize, Serialize};

pub use snapshot::SnapshotError;
pub use tree::{NodeSpec, SceneTree};

/// Handle to a node inside one document. Only meaningful for the document
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Axis-aligned rectangle in global document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn scaled(self, scale: f64) -> Self {
        Self::new(
            self.x * scale,
            self.y * scale,
            self.width * scale,
            self.height * scale,
        )
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Node kind, decided once when the document is read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Artboard,
    Group,
    RepeatGrid,
    BooleanGroup,
    SymbolInstance,
    Rectangle,
    Ellipse,
    Line,
    Path,
    Text,
    /// Anything the host reports that the compiler has no rule for.
    Other(String),
}

impl NodeKind {
    /// Accepts both snapshot tags (`repeatGrid`, `repeat-grid`) and host class
    /// names (`RepeatGrid`).
    pub fn from_tag(tag: &str) -> Self {
        let normalized: String = tag
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "artboard" => Self::Artboard,
            "group" => Self::Group,
            "repeatgrid" => Self::RepeatGrid,
            "booleangroup" => Self::BooleanGroup,
            "symbolinstance" => Self::SymbolInstance,
            "rectangle" => Self::Rectangle,
            "ellipse" => Self::Ellipse,
            "line" => Self::Line,
            "path" => Self::Path,
            "text" => Self::Text,
            _ => Self::Other(tag.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Artboard => "Artboard",
            Self::Group => "Group",
            Self::RepeatGrid => "RepeatGrid",
            Self::BooleanGroup => "BooleanGroup",
            Self::SymbolInstance => "SymbolInstance",
            Self::Rectangle => "Rectangle",
            Self::Ellipse => "Ellipse",
            Self::Line => "Line",
            Self::Path => "Path",
            Self::Text => "Text",
            Self::Other(tag) => tag,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// How a node follows its parent's horizontal size change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalConstraint {
    #[default]
    Left,
    Right,
    Center,
    Stretch,
}

/// How a node follows its parent's vertical size change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalConstraint {
    #[default]
    Top,
    Bottom,
    Middle,
    Stretch,
}

/// Host-side resize rules. The compiler never reads these directly; it only
/// observes their effect through the responsive probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub horizontal: HorizontalConstraint,
    #[serde(default)]
    pub vertical: VerticalConstraint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAttributes {
    #[serde(alias = "text")]
    pub content: String,
    pub font_family: String,
    pub font_size: f64,
    /// Packed ARGB fill color.
    #[serde(default)]
    pub fill: u32,
    #[serde(default = "default_align")]
    pub align: String,
    /// Area text (fixed box) rather than point text.
    #[serde(default)]
    pub area_box: bool,
}

fn default_align() -> String {
    "left".to_string()
}

/// Layout of a repeated-cell grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridMetrics {
    pub rows: u32,
    pub columns: u32,
    pub cell_width: f64,
    pub cell_height: f64,
    #[serde(default)]
    pub padding_x: f64,
    #[serde(default)]
    pub padding_y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Stable unique id assigned by the host.
    pub guid: String,
    /// Raw label, including any naming-convention prefixes and annotations.
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// Back-to-front paint order.
    pub children: Vec<NodeId>,
    /// Layout bounds, global.
    pub bounds: Bounds,
    /// Visual extent including strokes and effects, global.
    pub draw_bounds: Bounds,
    pub marked_for_export: bool,
    pub constraints: Constraints,
    pub text: Option<TextAttributes>,
    pub grid: Option<GridMetrics>,
}

/// Read and resize capability of the host design document.
pub trait DesignDocument {
    /// Nodes directly under the document root (artboards and loose items).
    fn top_level(&self) -> &[NodeId];

    fn node(&self, id: NodeId) -> &SceneNode;

    /// Resize a container; the host recomputes every descendant's geometry.
    fn resize(&mut self, id: NodeId, width: f64, height: f64);

    fn parent_kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).parent.map(|p| &self.node(p).kind)
    }

    /// `id` and all of its descendants, depth-first, parents before children.
    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.node(next).children.iter().rev().copied());
        }
        out
    }

    /// Closest artboard containing `id`, or `id` itself when it is one.
    fn enclosing_artboard(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(c) = current {
            let node = self.node(c);
            if node.kind == NodeKind::Artboard {
                return Some(c);
            }
            current = node.parent;
        }
        None
    }
}
