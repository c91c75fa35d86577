use std::collections::HashMap;

use super::{
    Bounds, Constraints, DesignDocument, GridMetrics, HorizontalConstraint, NodeId, NodeKind,
    SceneNode, TextAttributes, VerticalConstraint,
};

/// Arena-backed design document.
///
/// Nodes are appended in paint order and never removed. Resizing a node
/// re-lays its descendants according to their [`Constraints`], which is how
/// the host's layout engine reacts to the responsive probe.
///
/// Layout is always recomputed from the geometry a resized node's subtree had
/// before its first resize, and resizing back to that size restores it
/// exactly.
#[derive(Debug, Clone, Default)]
pub struct SceneTree {
    nodes: Vec<SceneNode>,
    top_level: Vec<NodeId>,
    resting: HashMap<NodeId, Resting>,
}

/// Subtree geometry of a node at its pre-resize size.
#[derive(Debug, Clone)]
struct Resting {
    width: f64,
    height: f64,
    layout: Vec<(NodeId, Bounds, Bounds)>,
}

/// Description of a node to insert.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    kind: NodeKind,
    name: String,
    bounds: Bounds,
    draw_bounds: Option<Bounds>,
    guid: Option<String>,
    marked_for_export: bool,
    constraints: Constraints,
    text: Option<TextAttributes>,
    grid: Option<GridMetrics>,
}

impl NodeSpec {
    pub fn new(kind: NodeKind, name: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            kind,
            name: name.into(),
            bounds,
            draw_bounds: None,
            guid: None,
            marked_for_export: false,
            constraints: Constraints::default(),
            text: None,
            grid: None,
        }
    }

    pub fn artboard(name: impl Into<String>, bounds: Bounds) -> Self {
        Self::new(NodeKind::Artboard, name, bounds).marked()
    }

    pub fn guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn draw_bounds(mut self, bounds: Bounds) -> Self {
        self.draw_bounds = Some(bounds);
        self
    }

    pub fn marked(mut self) -> Self {
        self.marked_for_export = true;
        self
    }

    pub fn unmarked(mut self) -> Self {
        self.marked_for_export = false;
        self
    }

    pub fn constrained(
        mut self,
        horizontal: HorizontalConstraint,
        vertical: VerticalConstraint,
    ) -> Self {
        self.constraints = Constraints {
            horizontal,
            vertical,
        };
        self
    }

    pub fn text(mut self, text: TextAttributes) -> Self {
        self.text = Some(text);
        self
    }

    pub fn grid(mut self, grid: GridMetrics) -> Self {
        self.grid = Some(grid);
        self
    }
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node under `parent` (or at the document root), after any
    /// existing siblings.
    pub fn insert(&mut self, parent: Option<NodeId>, spec: NodeSpec) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let guid = spec
            .guid
            .unwrap_or_else(|| format!("{:05x}-{}", id.0, spec.name.len()));
        self.nodes.push(SceneNode {
            guid,
            name: spec.name,
            kind: spec.kind,
            parent,
            children: Vec::new(),
            bounds: spec.bounds,
            draw_bounds: spec.draw_bounds.unwrap_or(spec.bounds),
            marked_for_export: spec.marked_for_export,
            constraints: spec.constraints,
            text: spec.text,
            grid: spec.grid,
        });
        match parent {
            Some(p) => self.nodes[p.index()].children.push(id),
            None => self.top_level.push(id),
        }
        id
    }

    pub fn add_root(&mut self, spec: NodeSpec) -> NodeId {
        self.insert(None, spec)
    }

    pub fn add_child(&mut self, parent: NodeId, spec: NodeSpec) -> NodeId {
        self.insert(Some(parent), spec)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes whose raw label equals `name`, in insertion order.
    pub fn find_by_name(&self, name: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.name == name)
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }

    pub fn find_by_guid(&self, guid: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.guid == guid)
            .map(|i| NodeId(i as u32))
    }

    /// Move a node and its subtree without going through constraints.
    pub fn translate(&mut self, id: NodeId, dx: f64, dy: f64) {
        for n in self.subtree(id) {
            let node = &mut self.nodes[n.index()];
            node.bounds.x += dx;
            node.bounds.y += dy;
            node.draw_bounds.x += dx;
            node.draw_bounds.y += dy;
        }
    }

    fn capture(&self, id: NodeId) -> Resting {
        let bounds = self.nodes[id.index()].bounds;
        Resting {
            width: bounds.width,
            height: bounds.height,
            layout: self
                .subtree(id)
                .into_iter()
                .map(|n| {
                    let node = &self.nodes[n.index()];
                    (n, node.bounds, node.draw_bounds)
                })
                .collect(),
        }
    }

    fn relayout(&mut self, id: NodeId, old: Bounds, new: Bounds) {
        let node = &mut self.nodes[id.index()];
        node.bounds = new;
        node.draw_bounds.x += new.x - old.x;
        node.draw_bounds.y += new.y - old.y;
        node.draw_bounds.width += new.width - old.width;
        node.draw_bounds.height += new.height - old.height;

        let children = node.children.clone();
        for child in children {
            let c = &self.nodes[child.index()];
            let (child_old, constraints) = (c.bounds, c.constraints);
            let child_new = constrain(child_old, old, new, constraints);
            self.relayout(child, child_old, child_new);
        }
    }
}

/// Where a child lands after its parent moves from `old` to `new`.
fn constrain(child: Bounds, old: Bounds, new: Bounds, constraints: Constraints) -> Bounds {
    let dx = new.x - old.x;
    let dy = new.y - old.y;
    let dw = new.width - old.width;
    let dh = new.height - old.height;

    let (x, width) = match constraints.horizontal {
        HorizontalConstraint::Left => (child.x + dx, child.width),
        HorizontalConstraint::Right => (child.x + dx + dw, child.width),
        HorizontalConstraint::Center => (child.x + dx + dw / 2.0, child.width),
        HorizontalConstraint::Stretch => (child.x + dx, child.width + dw),
    };
    let (y, height) = match constraints.vertical {
        VerticalConstraint::Top => (child.y + dy, child.height),
        VerticalConstraint::Bottom => (child.y + dy + dh, child.height),
        VerticalConstraint::Middle => (child.y + dy + dh / 2.0, child.height),
        VerticalConstraint::Stretch => (child.y + dy, child.height + dh),
    };
    Bounds::new(x, y, width, height)
}

impl DesignDocument for SceneTree {
    fn top_level(&self) -> &[NodeId] {
        &self.top_level
    }

    fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.index()]
    }

    fn resize(&mut self, id: NodeId, width: f64, height: f64) {
        let resting = self
            .resting
            .remove(&id)
            .unwrap_or_else(|| self.capture(id));
        for &(n, bounds, draw_bounds) in &resting.layout {
            let node = &mut self.nodes[n.index()];
            node.bounds = bounds;
            node.draw_bounds = draw_bounds;
        }
        if width == resting.width && height == resting.height {
            return;
        }

        let old = self.nodes[id.index()].bounds;
        let new = Bounds { width, height, ..old };
        self.relayout(id, old, new);
        self.resting.insert(id, resting);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> (SceneTree, NodeId) {
        let mut tree = SceneTree::new();
        let board = tree.add_root(NodeSpec::artboard(
            "Screen",
            Bounds::new(0.0, 0.0, 400.0, 300.0),
        ));
        (tree, board)
    }

    #[test]
    fn children_follow_constraints() {
        let (mut tree, board) = screen();
        let left = tree.add_child(
            board,
            NodeSpec::new(NodeKind::Rectangle, "a", Bounds::new(10.0, 10.0, 50.0, 50.0)),
        );
        let right = tree.add_child(
            board,
            NodeSpec::new(NodeKind::Rectangle, "b", Bounds::new(300.0, 10.0, 50.0, 50.0))
                .constrained(HorizontalConstraint::Right, VerticalConstraint::Bottom),
        );
        let wide = tree.add_child(
            board,
            NodeSpec::new(NodeKind::Rectangle, "c", Bounds::new(0.0, 100.0, 400.0, 20.0))
                .constrained(HorizontalConstraint::Stretch, VerticalConstraint::Middle),
        );

        tree.resize(board, 500.0, 400.0);

        assert_eq!(tree.node(left).bounds, Bounds::new(10.0, 10.0, 50.0, 50.0));
        assert_eq!(tree.node(right).bounds, Bounds::new(400.0, 110.0, 50.0, 50.0));
        assert_eq!(tree.node(wide).bounds, Bounds::new(0.0, 150.0, 500.0, 20.0));
    }

    #[test]
    fn resize_back_restores_geometry() {
        let (mut tree, board) = screen();
        let group = tree.add_child(
            board,
            NodeSpec::new(NodeKind::Group, "g", Bounds::new(100.0, 100.0, 80.0, 40.0))
                .constrained(HorizontalConstraint::Center, VerticalConstraint::Stretch),
        );
        let inner = tree.add_child(
            group,
            NodeSpec::new(NodeKind::Ellipse, "dot", Bounds::new(110.0, 110.0, 8.0, 8.0))
                .draw_bounds(Bounds::new(109.0, 109.0, 10.0, 10.0))
                .constrained(HorizontalConstraint::Right, VerticalConstraint::Bottom),
        );
        let before: Vec<_> = [group, inner].iter().map(|&n| tree.node(n).clone()).collect();

        tree.resize(board, 500.0, 400.0);
        assert_ne!(tree.node(inner).bounds, before[1].bounds);
        tree.resize(board, 400.0, 300.0);

        assert_eq!(tree.node(group), &before[0]);
        assert_eq!(tree.node(inner), &before[1]);
    }

    #[test]
    fn fractional_geometry_survives_a_round_trip() {
        let mut tree = SceneTree::new();
        let board = tree.add_root(NodeSpec::artboard(
            "Screen",
            Bounds::new(0.3, 0.7, 375.1, 667.3),
        ));
        let horizontal = [
            HorizontalConstraint::Left,
            HorizontalConstraint::Right,
            HorizontalConstraint::Center,
            HorizontalConstraint::Stretch,
        ];
        let vertical = [
            VerticalConstraint::Top,
            VerticalConstraint::Bottom,
            VerticalConstraint::Middle,
            VerticalConstraint::Stretch,
        ];
        let mut nodes = Vec::new();
        for (i, &h) in horizontal.iter().enumerate() {
            for (j, &v) in vertical.iter().enumerate() {
                let x = 0.1 + 12.3 * i as f64;
                let y = 12.3 + 0.7 * j as f64;
                let group = tree.add_child(
                    board,
                    NodeSpec::new(NodeKind::Group, "g", Bounds::new(x, y, 33.3, 10.1))
                        .constrained(h, v),
                );
                let leaf = tree.add_child(
                    group,
                    NodeSpec::new(NodeKind::Rectangle, "r", Bounds::new(x + 0.1, y + 0.2, 3.3, 1.1))
                        .draw_bounds(Bounds::new(x, y + 0.1, 3.5, 1.3))
                        .constrained(h, v),
                );
                nodes.extend([group, leaf]);
            }
        }
        let before: Vec<SceneNode> = nodes.iter().map(|&n| tree.node(n).clone()).collect();

        for _ in 0..3 {
            tree.resize(board, 475.1, 767.3);
            tree.resize(board, 375.1, 667.3);
        }

        for (&n, expected) in nodes.iter().zip(&before) {
            assert_eq!(tree.node(n), expected);
        }
    }

    #[test]
    fn later_moves_are_not_undone_by_resize() {
        let (mut tree, board) = screen();
        let shape = tree.add_child(
            board,
            NodeSpec::new(NodeKind::Rectangle, "s", Bounds::new(10.0, 10.0, 10.0, 10.0)),
        );
        tree.resize(board, 500.0, 400.0);
        tree.resize(board, 400.0, 300.0);
        tree.translate(shape, 0.0, 0.5);

        tree.resize(board, 500.0, 400.0);
        tree.resize(board, 400.0, 300.0);
        assert_eq!(tree.node(shape).bounds, Bounds::new(10.0, 10.5, 10.0, 10.0));
    }

    #[test]
    fn draw_bounds_move_with_layout_bounds() {
        let (mut tree, board) = screen();
        let shape = tree.add_child(
            board,
            NodeSpec::new(NodeKind::Rectangle, "s", Bounds::new(10.0, 10.0, 10.0, 10.0))
                .draw_bounds(Bounds::new(8.0, 8.0, 14.0, 14.0))
                .constrained(HorizontalConstraint::Stretch, VerticalConstraint::Bottom),
        );
        tree.resize(board, 500.0, 400.0);
        assert_eq!(tree.node(shape).draw_bounds, Bounds::new(8.0, 108.0, 114.0, 14.0));
    }

    #[test]
    fn lookup_helpers() {
        let (mut tree, board) = screen();
        let a = tree.add_child(
            board,
            NodeSpec::new(NodeKind::Rectangle, "dup", Bounds::default()).guid("abc"),
        );
        let b = tree.add_child(
            board,
            NodeSpec::new(NodeKind::Rectangle, "dup", Bounds::default()),
        );
        assert_eq!(tree.find_by_name("dup"), vec![a, b]);
        assert_eq!(tree.find_by_guid("abc"), Some(a));
        assert_eq!(tree.subtree(board), vec![board, a, b]);
        assert_eq!(tree.enclosing_artboard(b), Some(board));
        assert_eq!(tree.parent_kind(a), Some(&NodeKind::Artboard));
    }
}
