//! Selective path pruning
//!
//! A target keeps its whole subtree. Any other node keeps only the children
//! that lead to a target; everything else is dropped with its subtree.

use std::collections::HashSet;
use std::time::Instant;

use tracing::debug;

use crate::cache::ExportCache;
use crate::model::{forest_nodes, Forest, TreeNode};
use crate::source::BlockSource;
use crate::trace_time;

/// Ids the pruner keeps paths to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSet {
    ids: HashSet<String>,
}

impl TargetSet {
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Every node flagged `is_target` anywhere in the forest
    pub fn from_flags(forest: &[TreeNode]) -> Self {
        Self::matching(forest, |node| node.is_target)
    }

    /// Every node of the forest that satisfies `predicate`
    pub fn matching(forest: &[TreeNode], predicate: impl Fn(&TreeNode) -> bool) -> Self {
        Self::from_ids(
            forest_nodes(forest)
                .filter(|node| predicate(node))
                .map(|node| node.id.clone()),
        )
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Whether `node` is a target or leads to one.
///
/// Descendants come from the cache first. A host that cannot answer pulls
/// leaves the cached list empty, so the in-tree descendants are checked too.
fn leads_to_target(
    node: &TreeNode,
    targets: &TargetSet,
    cache: &mut ExportCache,
    source: &dyn BlockSource,
) -> bool {
    if targets.contains(&node.id) {
        return true;
    }
    if cache
        .descendant_ids(source, &node.id)
        .iter()
        .any(|id| targets.contains(id))
    {
        return true;
    }
    node.iter().skip(1).any(|n| targets.contains(&n.id))
}

/// Narrow one tree down to the paths that reach a target
pub fn prune(
    node: &TreeNode,
    targets: &TargetSet,
    cache: &mut ExportCache,
    source: &dyn BlockSource,
) -> TreeNode {
    if targets.contains(&node.id) {
        return node.clone();
    }

    let mut children = Vec::new();
    for child in &node.children {
        if leads_to_target(child, targets, cache, source) {
            children.push(prune(child, targets, cache, source));
        }
    }

    TreeNode {
        id: node.id.clone(),
        content: node.content.clone(),
        children,
        order: node.order,
        is_target: node.is_target,
        global_order_path: node.global_order_path.clone(),
    }
}

/// Prune every root, dropping roots with no target in their subtree
pub fn prune_forest(
    forest: &[TreeNode],
    targets: &TargetSet,
    cache: &mut ExportCache,
    source: &dyn BlockSource,
) -> Forest {
    let start = Instant::now();
    if targets.is_empty() {
        debug!(roots = forest.len(), "empty target set, nothing survives pruning");
        return Vec::new();
    }

    let mut pruned = Forest::new();
    for root in forest {
        if leads_to_target(root, targets, cache, source) {
            pruned.push(prune(root, targets, cache, source));
        }
    }

    trace_time!(start, "prune_forest", roots = pruned.len(), targets = targets.len());
    pruned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{DetachedSource, MemorySource};

    fn tree() -> TreeNode {
        TreeNode::new("P", "Parent", 0).with_children(vec![
            TreeNode::new("B", "Beta", 0).with_children(vec![
                TreeNode::new("B1", "Beta one", 0),
                TreeNode::new("B2", "Beta two", 1),
            ]),
            TreeNode::new("C", "Gamma", 1)
                .with_children(vec![TreeNode::new("C1", "Gamma one", 0)]),
        ])
    }

    fn ids(node: &TreeNode) -> Vec<&str> {
        node.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_sole_target_drops_sibling_subtree() {
        let forest = vec![tree()];
        let source = MemorySource::from_forest(&forest);
        let mut cache = ExportCache::new();

        let pruned = prune(&forest[0], &TargetSet::from_ids(["B"]), &mut cache, &source);
        assert_eq!(ids(&pruned), vec!["P", "B", "B1", "B2"]);
    }

    #[test]
    fn test_deep_target_keeps_only_its_path() {
        let forest = vec![tree()];
        let source = MemorySource::from_forest(&forest);
        let mut cache = ExportCache::new();

        let pruned = prune(&forest[0], &TargetSet::from_ids(["B2"]), &mut cache, &source);
        assert_eq!(ids(&pruned), vec!["P", "B", "B2"]);
    }

    #[test]
    fn test_all_leaves_keeps_everything() {
        let forest = vec![tree()];
        let source = MemorySource::from_forest(&forest);
        let mut cache = ExportCache::new();
        let leaves = TargetSet::matching(&forest, TreeNode::is_leaf);

        let pruned = prune_forest(&forest, &leaves, &mut cache, &source);
        assert_eq!(pruned, forest);
    }

    #[test]
    fn test_empty_target_set_yields_empty_forest() {
        let forest = vec![tree()];
        let mut cache = ExportCache::new();
        let pruned = prune_forest(&forest, &TargetSet::default(), &mut cache, &DetachedSource);
        assert!(pruned.is_empty());
    }

    #[test]
    fn test_roots_without_targets_are_dropped() {
        let forest = vec![tree(), TreeNode::new("Z", "Unrelated", 2)];
        let source = MemorySource::from_forest(&forest);
        let mut cache = ExportCache::new();

        let pruned = prune_forest(&forest, &TargetSet::from_ids(["C1"]), &mut cache, &source);
        assert_eq!(pruned.len(), 1);
        assert_eq!(ids(&pruned[0]), vec!["P", "C", "C1"]);
    }

    #[test]
    fn test_flags_used_when_host_cannot_pull() {
        let mut root = tree();
        root.children[1].is_target = true;
        let forest = vec![root];
        let targets = TargetSet::from_flags(&forest);
        assert_eq!(targets.len(), 1);

        let mut cache = ExportCache::new();
        let pruned = prune_forest(&forest, &targets, &mut cache, &DetachedSource);
        assert_eq!(ids(&pruned[0]), vec!["P", "C", "C1"]);
        assert!(pruned[0].children[0].is_target);
    }
}
