//! Visual selection into a forest
//!
//! The host hands over the ids of highlighted blocks. A selection nested
//! inside another selection is not a root of its own. A top-level selection
//! with selected descendants is narrowed to the paths reaching its deepest
//! selected blocks; one without them is copied whole.

use std::collections::HashSet;

use tracing::debug;

use crate::cache::{ExportCache, QueryShape};
use crate::model::{Forest, TreeNode};
use crate::order::sort_records;
use crate::prune::TargetSet;
use crate::source::BlockSource;

/// Selected ids that are not descendants of another selected id, in
/// document order. Ids the source cannot place keep their selection order
/// after the rest.
pub fn top_level_selections(
    selected: &[String],
    cache: &mut ExportCache,
    source: &dyn BlockSource,
) -> Vec<String> {
    let mut nested = HashSet::new();
    for id in selected {
        for descendant in cache.descendant_ids(source, id) {
            if descendant != id {
                nested.insert(descendant.clone());
            }
        }
    }

    let mut seen = HashSet::new();
    let top: Vec<String> = selected
        .iter()
        .filter(|id| !nested.contains(*id))
        .filter(|id| seen.insert(id.to_string()))
        .cloned()
        .collect();

    let mut placed = Vec::new();
    let mut unplaced = Vec::new();
    for id in top {
        match source.fetch_record(&id) {
            Ok(Some(record)) => placed.push(record),
            Ok(None) => unplaced.push(id),
            Err(e) => {
                debug!(id = %id, error = %e, "cannot place selection in document order");
                unplaced.push(id);
            }
        }
    }
    sort_records(&mut placed);

    placed.into_iter().map(|r| r.id).chain(unplaced).collect()
}

/// Selected descendants of `id` that have no selected descendant themselves
pub fn leaf_targets(
    id: &str,
    selected: &HashSet<String>,
    cache: &mut ExportCache,
    source: &dyn BlockSource,
) -> TargetSet {
    let candidates: Vec<String> = cache
        .descendant_ids(source, id)
        .iter()
        .filter(|d| selected.contains(*d))
        .cloned()
        .collect();

    let mut leaves = Vec::new();
    for candidate in candidates {
        let has_selected_below = cache
            .descendant_ids(source, &candidate)
            .iter()
            .any(|d| selected.contains(d));
        if !has_selected_below {
            leaves.push(candidate);
        }
    }
    TargetSet::from_ids(leaves)
}

/// Full tree below `id`, pulled one level at a time through the cache
pub fn visual_tree(
    id: &str,
    cache: &mut ExportCache,
    source: &dyn BlockSource,
) -> Option<TreeNode> {
    let mut visited = HashSet::new();
    pull_visual(id, cache, source, &mut visited, None)
}

/// Tree below `id` narrowed to the paths reaching `targets`.
///
/// A target without targets further down keeps all of its children.
pub fn visual_path_tree(
    id: &str,
    targets: &TargetSet,
    cache: &mut ExportCache,
    source: &dyn BlockSource,
) -> Option<TreeNode> {
    let mut visited = HashSet::new();
    pull_visual(id, cache, source, &mut visited, Some(targets))
}

fn has_target_below(
    id: &str,
    targets: &TargetSet,
    cache: &mut ExportCache,
    source: &dyn BlockSource,
) -> bool {
    cache
        .descendant_ids(source, id)
        .iter()
        .any(|d| targets.contains(d))
}

fn pull_visual(
    id: &str,
    cache: &mut ExportCache,
    source: &dyn BlockSource,
    visited: &mut HashSet<String>,
    targets: Option<&TargetSet>,
) -> Option<TreeNode> {
    if !visited.insert(id.to_string()) {
        return None;
    }
    let block = cache.block_info(source, id, QueryShape::ContentWithChildren)?;

    // Below a leaf target the whole subtree is kept
    let narrow_to = match targets {
        Some(t) if !t.contains(id) || has_target_below(id, t, cache, source) => Some(t),
        _ => None,
    };

    let mut node = TreeNode::new(block.id.clone(), block.content.clone(), block.order);
    node.is_target = targets.is_some_and(|t| t.contains(id));
    for child in block.sorted_children() {
        if let Some(t) = narrow_to {
            if !t.contains(&child.id) && !has_target_below(&child.id, t, cache, source) {
                continue;
            }
        }

        if let Some(mut child_node) = pull_visual(&child.id, cache, source, visited, narrow_to)
        {
            child_node.order = child.order;
            node.children.push(child_node);
        }
    }
    Some(node)
}

/// Turn a set of selected ids into a forest, one root per top-level
/// selection
pub fn selection_forest(
    selected: &[String],
    cache: &mut ExportCache,
    source: &dyn BlockSource,
) -> Forest {
    let selected_set: HashSet<String> = selected.iter().cloned().collect();
    let mut forest = Vec::new();

    for id in top_level_selections(selected, cache, source) {
        let targets = leaf_targets(&id, &selected_set, cache, source);
        let tree = if targets.is_empty() {
            visual_tree(&id, cache, source)
        } else {
            visual_path_tree(&id, &targets, cache, source)
        };

        match tree {
            Some(mut tree) => {
                tree.is_target = true;
                forest.push(tree);
            }
            None => debug!(id = %id, "selected block not found in source"),
        }
    }
    forest
}
