use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use super::tree::{NodeSpec, SceneTree};
use super::{Bounds, Constraints, GridMetrics, NodeId, NodeKind, TextAttributes};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate node id {0:?}")]
    DuplicateId(String),
    #[error("text node {0:?} has no text attributes")]
    MissingText(String),
    #[error("snapshot contains no nodes")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct DocumentSnapshot {
    #[serde(default)]
    children: Vec<NodeSnapshot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeSnapshot {
    #[serde(default, alias = "guid")]
    id: Option<String>,
    name: String,
    kind: String,
    bounds: Bounds,
    #[serde(default)]
    draw_bounds: Option<Bounds>,
    #[serde(default)]
    marked_for_export: bool,
    #[serde(default)]
    constraints: Constraints,
    #[serde(default)]
    text: Option<TextAttributes>,
    #[serde(default)]
    grid: Option<GridMetrics>,
    #[serde(default)]
    children: Vec<NodeSnapshot>,
}

impl SceneTree {
    /// Build a tree from a JSON snapshot. Children are listed back-to-front,
    /// as the host reports them.
    ///
    /// ```json
    /// {"children": [{"id": "a1", "name": "Screen", "kind": "artboard",
    ///                "bounds": {"x": 0, "y": 0, "width": 375, "height": 667},
    ///                "children": []}]}
    /// ```
    pub fn from_json(data: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: DocumentSnapshot = serde_json::from_slice(data)?;
        if snapshot.children.is_empty() {
            return Err(SnapshotError::Empty);
        }

        let mut tree = SceneTree::new();
        let mut seen = HashSet::new();
        for node in snapshot.children {
            insert_snapshot(&mut tree, None, node, &mut seen)?;
        }
        Ok(tree)
    }
}

fn insert_snapshot(
    tree: &mut SceneTree,
    parent: Option<NodeId>,
    node: NodeSnapshot,
    seen: &mut HashSet<String>,
) -> Result<NodeId, SnapshotError> {
    let kind = NodeKind::from_tag(&node.kind);
    if kind == NodeKind::Text && node.text.is_none() {
        return Err(SnapshotError::MissingText(node.name));
    }

    let mut spec = NodeSpec::new(kind, node.name, node.bounds);
    if let Some(id) = node.id {
        if !seen.insert(id.clone()) {
            return Err(SnapshotError::DuplicateId(id));
        }
        spec = spec.guid(id);
    }
    if let Some(draw) = node.draw_bounds {
        spec = spec.draw_bounds(draw);
    }
    if node.marked_for_export {
        spec = spec.marked();
    }
    spec = spec.constrained(node.constraints.horizontal, node.constraints.vertical);
    if let Some(text) = node.text {
        spec = spec.text(text);
    }
    if let Some(grid) = node.grid {
        spec = spec.grid(grid);
    }

    let id = tree.insert(parent, spec);
    for child in node.children {
        insert_snapshot(tree, Some(id), child, seen)?;
    }
    Ok(id)
}
