use std::collections::HashMap;

use baumkit_protocol::{HorizontalAnchor, Pivot, VerticalAnchor};
use thiserror::Error;

use crate::context::ProbeThresholds;
use crate::scene::{Bounds, DesignDocument, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponsiveParameter {
    pub pivot: Option<Pivot>,
    pub stretch_x: bool,
    pub stretch_y: bool,
}

/// Measurements of one node across the three probe sweeps.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsiveRecord {
    pub name: String,
    /// Missing when the node only appeared after the resize.
    pub before: Option<Bounds>,
    pub after: Option<Bounds>,
    pub restore: Option<Bounds>,
    pub parameter: Option<ResponsiveParameter>,
}

impl ResponsiveRecord {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            before: None,
            after: None,
            restore: None,
            parameter: None,
        }
    }
}

/// A node whose geometry did not come back after the probe.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftedNode {
    pub id: NodeId,
    pub name: String,
    pub before: Bounds,
    pub restore: Bounds,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "bounds changed for {} node(s) during the responsive probe; \
     undo the export to restore the document",
    .nodes.len()
)]
pub struct BoundsDrift {
    pub nodes: Vec<DriftedNode>,
}

/// Anchors and stretch flags inferred by growing a root by a fixed delta,
/// measuring every descendant, then shrinking it back and measuring again.
#[derive(Debug, Clone, Default)]
pub struct ResponsiveMap {
    records: HashMap<NodeId, ResponsiveRecord>,
}

impl ResponsiveMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the probe over `root` and derive a parameter for every descendant.
    ///
    /// Leaves the document at its original size. Whether geometry actually
    /// came back is checked separately by [`ResponsiveMap::verify_restored`].
    pub fn probe<D: DesignDocument>(
        doc: &mut D,
        root: NodeId,
        thresholds: &ProbeThresholds,
    ) -> Self {
        let mut records: HashMap<NodeId, ResponsiveRecord> = HashMap::new();

        for id in doc.subtree(root) {
            let node = doc.node(id);
            records
                .entry(id)
                .or_insert_with(|| ResponsiveRecord::new(&node.name))
                .before = Some(node.bounds);
        }

        let original = doc.node(root).bounds;
        doc.resize(
            root,
            original.width + thresholds.delta_width,
            original.height + thresholds.delta_height,
        );
        for id in doc.subtree(root) {
            let node = doc.node(id);
            records
                .entry(id)
                .or_insert_with(|| ResponsiveRecord::new(&node.name))
                .after = Some(node.bounds);
        }

        doc.resize(root, original.width, original.height);
        for id in doc.subtree(root) {
            let node = doc.node(id);
            records
                .entry(id)
                .or_insert_with(|| ResponsiveRecord::new(&node.name))
                .restore = Some(node.bounds);
        }

        let parameters: Vec<(NodeId, ResponsiveParameter)> = records
            .keys()
            .filter_map(|&id| {
                let parent = doc.node(id).parent?;
                let own = records.get(&id)?;
                let parent = records.get(&parent)?;
                let parameter = derive_parameter(
                    own.before?,
                    own.after?,
                    parent.before?,
                    parent.after?,
                    thresholds,
                );
                Some((id, parameter))
            })
            .collect();
        for (id, parameter) in parameters {
            if let Some(record) = records.get_mut(&id) {
                record.parameter = Some(parameter);
            }
        }

        tracing::debug!(root = ?root, nodes = records.len(), "responsive probe finished");
        Self { records }
    }

    /// Merge another root's measurements into this map.
    pub fn extend(&mut self, other: ResponsiveMap) {
        self.records.extend(other.records);
    }

    pub fn record(&self, id: NodeId) -> Option<&ResponsiveRecord> {
        self.records.get(&id)
    }

    pub fn parameter(&self, id: NodeId) -> Option<&ResponsiveParameter> {
        self.records.get(&id)?.parameter.as_ref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ResponsiveRecord)> {
        self.records.iter().map(|(&id, r)| (id, r))
    }

    /// Every node must be back at exactly its pre-probe bounds.
    pub fn verify_restored(&self) -> Result<(), BoundsDrift> {
        let mut nodes: Vec<DriftedNode> = self
            .records
            .iter()
            .filter_map(|(&id, r)| {
                let (before, restore) = (r.before?, r.restore?);
                (before != restore).then(|| DriftedNode {
                    id,
                    name: r.name.clone(),
                    before,
                    restore,
                })
            })
            .collect();
        if nodes.is_empty() {
            return Ok(());
        }
        nodes.sort_by_key(|n| n.id);
        Err(BoundsDrift { nodes })
    }
}

/// Classify one node from its own and its parent's bounds before and after
/// the parent grew.
pub fn derive_parameter(
    before: Bounds,
    after: Bounds,
    parent_before: Bounds,
    parent_after: Bounds,
    thresholds: &ProbeThresholds,
) -> ResponsiveParameter {
    let grow_width = parent_after.width - parent_before.width;
    let grow_height = parent_after.height - parent_before.height;

    let mut horizontal = if before.x == after.x {
        Some(HorizontalAnchor::Left)
    } else {
        let dx = after.x - before.x;
        if dx > 0.0 && dx <= grow_width * thresholds.anchor_ratio {
            Some(HorizontalAnchor::Center)
        } else {
            Some(HorizontalAnchor::Right)
        }
    };

    let mut vertical = if before.y == after.y {
        Some(VerticalAnchor::Top)
    } else {
        let dy = after.y - before.y;
        if dy > 0.0 && dy <= grow_height * thresholds.anchor_ratio {
            Some(VerticalAnchor::Middle)
        } else {
            Some(VerticalAnchor::Bottom)
        }
    };

    let stretch_x = before.width * thresholds.stretch_slack < after.width;
    if stretch_x {
        horizontal = None;
    }
    let stretch_y = before.height * thresholds.stretch_slack < after.height;
    if stretch_y {
        vertical = None;
    }

    let pivot = Pivot::new(horizontal, vertical);
    ResponsiveParameter {
        pivot: (!pivot.is_empty()).then_some(pivot),
        stretch_x,
        stretch_y,
    }
}
