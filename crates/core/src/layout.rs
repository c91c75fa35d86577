use baumkit_protocol::{
    CanvasRect, HorizontalAnchor, LayoutDocument, LayoutElement, Pivot, VerticalAnchor,
};

use crate::scene::{DesignDocument, NodeId, NodeKind};

/// Scaled frame of `node` in the center-anchored space of `root`: `x`/`y` are
/// the top-left of its draw bounds measured from the root's center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

pub fn frame_in_root<D: DesignDocument>(
    doc: &D,
    node: NodeId,
    root: NodeId,
    scale: f64,
) -> Frame {
    let draw = doc.node(node).draw_bounds.scaled(scale);
    let base = doc.node(root).bounds.scaled(scale);
    Frame {
        x: draw.x - base.center_x(),
        y: draw.y - base.center_y(),
        w: draw.width,
        h: draw.height,
    }
}

/// Where the root canvas sits inside whatever contains it.
///
/// Artboards and parentless roots sit at the origin; a sub-prefab is placed
/// by the offset of its center from its parent's center.
pub fn canvas_base<D: DesignDocument>(doc: &D, root: NodeId, scale: f64) -> CanvasRect {
    let node = doc.node(root);
    let bounds = node.bounds.scaled(scale);
    match node.parent {
        Some(parent) if node.kind != NodeKind::Artboard => {
            let parent = doc.node(parent).bounds.scaled(scale);
            CanvasRect::placed(
                bounds.center_x() - parent.center_x(),
                bounds.center_y() - parent.center_y(),
                bounds.width,
                bounds.height,
            )
        }
        _ => CanvasRect::placed(0.0, 0.0, bounds.width, bounds.height),
    }
}

/// Move the canvas base to follow the root's anchor, so the exported canvas
/// reflects which edge of the container it is pinned to. Centered axes keep
/// their offset.
pub fn anchor_base<D: DesignDocument>(
    doc: &D,
    root: NodeId,
    scale: f64,
    mut base: CanvasRect,
    pivot: Option<&Pivot>,
) -> CanvasRect {
    let node = doc.node(root);
    let (Some(pivot), Some(parent)) = (pivot, node.parent) else {
        return base;
    };
    let own = node.bounds.scaled(scale);
    let parent = doc.node(parent).bounds.scaled(scale);

    match pivot.horizontal {
        Some(HorizontalAnchor::Left) => {
            base.x = Some(parent.x - own.x - own.width / 2.0);
        }
        Some(HorizontalAnchor::Right) => {
            base.x = Some(parent.x + parent.width - (own.x + own.width / 2.0));
        }
        _ => {}
    }
    match pivot.vertical {
        Some(VerticalAnchor::Top) => {
            base.y = Some(parent.y - own.y - own.height / 2.0);
        }
        Some(VerticalAnchor::Bottom) => {
            base.y = Some(parent.y + parent.height - (own.y + own.height / 2.0));
        }
        _ => {}
    }
    base
}

/// Wrap a compiled root element into its document, positioning the canvas.
pub fn build_document<D: DesignDocument>(
    doc: &D,
    root: NodeId,
    scale: f64,
    element: LayoutElement,
) -> LayoutDocument {
    let base = canvas_base(doc, root, scale);
    let base = anchor_base(doc, root, scale, base, element.pivot.as_ref());
    LayoutDocument::new(base, element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Bounds, NodeSpec, SceneTree};
    use baumkit_protocol::ElementKind;

    fn tree() -> (SceneTree, NodeId, NodeId, NodeId) {
        let mut tree = SceneTree::new();
        let board = tree.add_root(NodeSpec::artboard(
            "Screen",
            Bounds::new(100.0, 50.0, 400.0, 300.0),
        ));
        let popup = tree.add_child(
            board,
            NodeSpec::new(NodeKind::Group, "Popup/", Bounds::new(150.0, 100.0, 200.0, 100.0)),
        );
        let icon = tree.add_child(
            popup,
            NodeSpec::new(NodeKind::Rectangle, "icon", Bounds::new(160.0, 110.0, 20.0, 10.0))
                .draw_bounds(Bounds::new(159.0, 109.0, 22.0, 12.0)),
        );
        (tree, board, popup, icon)
    }

    #[test]
    fn frames_are_relative_to_root_center() {
        let (tree, board, _, icon) = tree();
        let frame = frame_in_root(&tree, icon, board, 2.0);
        // root center is (300, 200), scaled (600, 400)
        assert_eq!(
            frame,
            Frame {
                x: 318.0 - 600.0,
                y: 218.0 - 400.0,
                w: 44.0,
                h: 24.0
            }
        );
    }

    #[test]
    fn artboard_canvas_sits_at_origin() {
        let (tree, board, _, _) = tree();
        assert_eq!(
            canvas_base(&tree, board, 1.0),
            CanvasRect::placed(0.0, 0.0, 400.0, 300.0)
        );
    }

    #[test]
    fn sub_prefab_canvas_is_offset_from_parent_center() {
        let (tree, _, popup, _) = tree();
        // popup center (250, 150), board center (300, 200)
        assert_eq!(
            canvas_base(&tree, popup, 1.0),
            CanvasRect::placed(-50.0, -50.0, 200.0, 100.0)
        );
    }

    #[test]
    fn pivot_moves_base_to_anchored_edges() {
        let (tree, _, popup, _) = tree();
        let base = canvas_base(&tree, popup, 1.0);

        let right_bottom: Pivot = "rightbottom".parse().unwrap();
        let moved = anchor_base(&tree, popup, 1.0, base, Some(&right_bottom));
        assert_eq!(moved.x, Some(100.0 + 400.0 - 250.0));
        assert_eq!(moved.y, Some(50.0 + 300.0 - 150.0));

        let left_top = Pivot::LEFT_TOP;
        let moved = anchor_base(&tree, popup, 1.0, base, Some(&left_top));
        assert_eq!(moved.x, Some(100.0 - 150.0 - 100.0));
        assert_eq!(moved.y, Some(50.0 - 100.0 - 50.0));

        let center: Pivot = "centermiddle".parse().unwrap();
        assert_eq!(anchor_base(&tree, popup, 1.0, base, Some(&center)), base);
    }

    #[test]
    fn document_uses_root_size() {
        let (tree, board, _, _) = tree();
        let root = LayoutElement::new(ElementKind::Root { artboard: true }, "Screen")
            .with_elements(Vec::new());
        let document = build_document(&tree, board, 2.0, root);
        assert_eq!(document.info.canvas.size, CanvasRect::sized(800.0, 600.0));
        assert_eq!(document.info.canvas.image, CanvasRect::sized(800.0, 600.0));
    }
}
