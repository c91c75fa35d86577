use indexmap::{IndexMap, IndexSet};

use crate::context::ExportOptions;
use crate::error::SelectionError;
use crate::names::{OptionKey, parse_name};
use crate::scene::{DesignDocument, NodeId, NodeKind};

/// Export roots keyed by display name, plus the artboards the responsive
/// probe has to resize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportPlan {
    /// First-seen order; a later node with the same name replaces the earlier
    /// one in place.
    pub roots: IndexMap<String, NodeId>,
    pub probe_artboards: IndexSet<NodeId>,
}

impl ExportPlan {
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn root_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots.values().copied()
    }
}

/// Collect every artboard and sub-prefab under `selection` (or the whole
/// document when nothing is selected).
///
/// Commented-out subtrees are never searched. With
/// [`ExportOptions::check_marked_for_export`], unmarked candidates are
/// skipped but their descendants are still searched.
pub fn plan_export<D: DesignDocument>(
    doc: &D,
    selection: &[NodeId],
    options: &ExportOptions,
) -> Result<ExportPlan, SelectionError> {
    let search = if selection.is_empty() {
        doc.top_level()
    } else {
        selection
    };

    let mut plan = ExportPlan::default();
    for &id in search {
        visit(doc, id, options, &mut plan);
    }
    if plan.roots.is_empty() {
        return Err(SelectionError::NothingToExport);
    }

    plan.probe_artboards = plan
        .roots
        .values()
        .filter_map(|&id| doc.enclosing_artboard(id))
        .collect();

    tracing::debug!(
        roots = ?plan.roots.keys().collect::<Vec<_>>(),
        artboards = plan.probe_artboards.len(),
        "export plan"
    );
    Ok(plan)
}

fn visit<D: DesignDocument>(
    doc: &D,
    id: NodeId,
    options: &ExportOptions,
    plan: &mut ExportPlan,
) {
    let node = doc.node(id);
    let parent_is_grid = matches!(doc.parent_kind(id), Some(NodeKind::RepeatGrid));
    let parsed = parse_name(&node.name, parent_is_grid, options.enable_extended);
    if parsed.options.is_set(OptionKey::CommentOut) {
        return;
    }

    let is_artboard = node.kind == NodeKind::Artboard;
    let is_candidate = is_artboard || options.is_active(&parsed.options, OptionKey::SubPrefab);
    if is_candidate {
        if options.check_marked_for_export && !node.marked_for_export {
            tracing::debug!(name = %parsed.name, "skipping unmarked candidate");
        } else {
            plan.roots.insert(parsed.name, id);
        }
    }

    for &child in &node.children {
        visit(doc, child, options, plan);
    }
}

/// Resolve the names given on a command line into node ids. Names are
/// compared against raw labels first, then against parsed display names.
pub fn select_by_name<D: DesignDocument>(
    doc: &D,
    names: &[String],
    extended: bool,
) -> Result<Vec<NodeId>, SelectionError> {
    let all: Vec<NodeId> = doc
        .top_level()
        .iter()
        .flat_map(|&id| doc.subtree(id))
        .collect();

    names
        .iter()
        .map(|wanted| {
            all.iter()
                .copied()
                .find(|&id| doc.node(id).name == *wanted)
                .or_else(|| {
                    all.iter().copied().find(|&id| {
                        let parent_is_grid =
                            matches!(doc.parent_kind(id), Some(NodeKind::RepeatGrid));
                        parse_name(&doc.node(id).name, parent_is_grid, extended).name == *wanted
                    })
                })
                .ok_or_else(|| SelectionError::UnknownNode(wanted.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Bounds, NodeSpec, SceneTree};

    fn b() -> Bounds {
        Bounds::new(0.0, 0.0, 100.0, 100.0)
    }

    fn names(plan: &ExportPlan) -> Vec<&str> {
        plan.roots.keys().map(String::as_str).collect()
    }

    #[test]
    fn artboards_and_sub_prefabs_are_found() {
        let mut tree = SceneTree::new();
        let screen = tree.add_root(NodeSpec::artboard("Screen", b()));
        let popup = tree.add_child(screen, NodeSpec::new(NodeKind::Group, "Popup/", b()).marked());
        tree.add_root(NodeSpec::new(NodeKind::Rectangle, "loose", b()));

        let plan = plan_export(&tree, &[], &ExportOptions::default()).unwrap();
        assert_eq!(names(&plan), ["Screen", "Popup"]);
        assert_eq!(plan.roots["Popup"], popup);
        assert_eq!(plan.probe_artboards.iter().copied().collect::<Vec<_>>(), [screen]);
    }

    #[test]
    fn unmarked_candidates_are_skipped_but_searched() {
        let mut tree = SceneTree::new();
        let screen = tree.add_root(NodeSpec::artboard("Screen", b()).unmarked());
        tree.add_child(screen, NodeSpec::new(NodeKind::Group, "Popup/", b()).marked());
        tree.add_child(screen, NodeSpec::new(NodeKind::Group, "Dialog/", b()));

        let plan = plan_export(&tree, &[], &ExportOptions::default()).unwrap();
        assert_eq!(names(&plan), ["Popup"]);
        assert_eq!(plan.probe_artboards.len(), 1);

        let options = ExportOptions {
            check_marked_for_export: false,
            ..ExportOptions::default()
        };
        let plan = plan_export(&tree, &[], &options).unwrap();
        assert_eq!(names(&plan), ["Screen", "Popup", "Dialog"]);
    }

    #[test]
    fn last_duplicate_wins_in_first_position() {
        let mut tree = SceneTree::new();
        tree.add_root(NodeSpec::artboard("Screen", b()));
        tree.add_root(NodeSpec::artboard("Other", b()));
        let second = tree.add_root(NodeSpec::artboard("Screen", b()));

        let plan = plan_export(&tree, &[], &ExportOptions::default()).unwrap();
        assert_eq!(names(&plan), ["Screen", "Other"]);
        assert_eq!(plan.roots["Screen"], second);
    }

    #[test]
    fn commented_out_subtrees_are_ignored() {
        let mut tree = SceneTree::new();
        let old = tree.add_root(NodeSpec::artboard("#Old", b()));
        tree.add_child(old, NodeSpec::new(NodeKind::Group, "Popup/", b()).marked());
        tree.add_root(NodeSpec::artboard("Screen", b()));

        let plan = plan_export(&tree, &[], &ExportOptions::default()).unwrap();
        assert_eq!(names(&plan), ["Screen"]);
    }

    #[test]
    fn selection_limits_the_search() {
        let mut tree = SceneTree::new();
        tree.add_root(NodeSpec::artboard("Screen", b()));
        let other = tree.add_root(NodeSpec::artboard("Other", b()));

        let plan = plan_export(&tree, &[other], &ExportOptions::default()).unwrap();
        assert_eq!(names(&plan), ["Other"]);
    }

    #[test]
    fn nothing_to_export() {
        let mut tree = SceneTree::new();
        tree.add_root(NodeSpec::new(NodeKind::Group, "loose", b()));
        tree.add_root(NodeSpec::artboard("Draft", b()).unmarked());
        assert_eq!(
            plan_export(&tree, &[], &ExportOptions::default()),
            Err(SelectionError::NothingToExport)
        );
    }

    #[test]
    fn sub_prefabs_need_the_toggle() {
        let mut tree = SceneTree::new();
        tree.add_root(NodeSpec::new(NodeKind::Group, "Popup/", b()).marked());
        let options = ExportOptions {
            enable_sub_prefab: false,
            ..ExportOptions::default()
        };
        assert!(plan_export(&tree, &[], &options).is_err());
    }

    #[test]
    fn orphan_sub_prefab_has_no_probe_artboard() {
        let mut tree = SceneTree::new();
        tree.add_root(NodeSpec::new(NodeKind::Group, "Popup/", b()).marked());
        let plan = plan_export(&tree, &[], &ExportOptions::default()).unwrap();
        assert_eq!(names(&plan), ["Popup"]);
        assert!(plan.probe_artboards.is_empty());
    }

    #[test]
    fn names_resolve_to_nodes() {
        let mut tree = SceneTree::new();
        let screen = tree.add_root(NodeSpec::artboard("Screen", b()));
        let popup = tree.add_child(screen, NodeSpec::new(NodeKind::Group, "Popup/", b()));

        let ids = select_by_name(&tree, &["Popup".into(), "Screen".into()], true).unwrap();
        assert_eq!(ids, [popup, screen]);
        assert_eq!(
            select_by_name(&tree, &["Missing".into()], true),
            Err(SelectionError::UnknownNode("Missing".into()))
        );
    }
}
