//! Cross-root ordering
//!
//! Roots of one export can come from unrelated places in the source
//! document. Each root gets a `global_order_path`: the sibling positions
//! walking from the page level down to the root, rebuilt from the record
//! that produced it. Roots are then sorted by comparing those paths.

use std::cmp::Ordering;

use tracing::debug;

use crate::model::{is_blank, BlockRecord, Order, TreeNode};

/// Rebuild the order path of one root from the first record that produced it
fn order_path(root: &TreeNode, records: &[BlockRecord]) -> Option<Vec<Order>> {
    // Records the builder rejects never produce a root
    for record in records.iter().filter(|r| r.is_well_formed()) {
        if record.id == root.id {
            if record.ancestors.is_empty() {
                return Some(vec![record.order]);
            }
            if record.ancestors.iter().all(|a| is_blank(&a.content)) {
                let mut path: Vec<Order> = record.ancestors.iter().map(|a| a.order).collect();
                path.push(record.order);
                return Some(path);
            }
        }

        if let Some(index) = record.ancestors.iter().position(|a| a.id == root.id) {
            return Some(record.ancestors[..=index].iter().map(|a| a.order).collect());
        }
    }
    None
}

/// Set `global_order_path` on every root of the forest
pub fn assign_order_paths(forest: &mut [TreeNode], records: &[BlockRecord]) {
    for root in forest.iter_mut() {
        root.global_order_path = order_path(root, records).unwrap_or_else(|| {
            debug!(id = %root.id, "no record produced this root, falling back to its order");
            vec![root.order]
        });
    }
}

/// Element-wise comparison, a missing element counts as 0
pub fn compare_order_paths(a: &[Order], b: &[Order]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let left = a.get(i).copied().unwrap_or(0);
            let right = b.get(i).copied().unwrap_or(0);
            left.cmp(&right)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Stable sort of records into document order. A block sorts before its
/// own descendants.
pub fn sort_records(records: &mut [BlockRecord]) {
    records.sort_by(|a, b| {
        let (left, right) = (a.document_path(), b.document_path());
        compare_order_paths(&left, &right).then(left.len().cmp(&right.len()))
    });
}

/// Stable sort of roots by their order paths
pub fn sort_roots(forest: &mut [TreeNode]) {
    forest.sort_by(|a, b| compare_order_paths(&a.global_order_path, &b.global_order_path));
}

pub fn assign_and_sort_roots(forest: &mut [TreeNode], records: &[BlockRecord]) {
    assign_order_paths(forest, records);
    sort_roots(forest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::build_forest;
    use crate::source::DetachedSource;

    fn root_ids(forest: &[TreeNode]) -> Vec<&str> {
        forest.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_compare_order_paths() {
        assert_eq!(compare_order_paths(&[0, 1], &[0, 2]), Ordering::Less);
        assert_eq!(compare_order_paths(&[3], &[1, 9]), Ordering::Greater);
        assert_eq!(compare_order_paths(&[1], &[1, 0]), Ordering::Equal);
        assert_eq!(compare_order_paths(&[], &[0, 0]), Ordering::Equal);
        assert_eq!(compare_order_paths(&[1], &[1, 2]), Ordering::Less);
    }

    #[test]
    fn test_paths_for_each_root_kind() {
        let records = vec![
            BlockRecord::new("A", "Alpha", 4),
            BlockRecord::new("B", "Beta", 0).with_ancestor("P", "Parent", 1),
            BlockRecord::new("C", "Gamma", 2)
                .with_ancestor("page", "", 0)
                .with_ancestor("X", "", 3),
            BlockRecord::new("D", "Delta", 0)
                .with_ancestor("Q", "Quebec", 5)
                .with_ancestor("R", "Romeo", 6),
        ];
        let mut forest = build_forest(&records, &DetachedSource);
        assign_order_paths(&mut forest, &records);

        let path = |id: &str| {
            forest
                .iter()
                .find(|n| n.id == id)
                .map(|n| n.global_order_path.clone())
                .unwrap()
        };
        assert_eq!(path("A"), vec![4]);
        assert_eq!(path("P"), vec![1]);
        assert_eq!(path("C"), vec![0, 3, 2]);
        assert_eq!(path("Q"), vec![5]);
    }

    #[test]
    fn test_rejected_record_does_not_supply_path() {
        let records = vec![
            BlockRecord::new("B", "Beta", 0)
                .with_ancestor("", "No id", 9)
                .with_ancestor("P", "Parent", 9),
            BlockRecord::new("C", "Gamma", 0).with_ancestor("P", "Parent", 1),
        ];
        let mut forest = build_forest(&records, &DetachedSource);
        assign_order_paths(&mut forest, &records);

        assert_eq!(root_ids(&forest), vec!["P"]);
        assert_eq!(forest[0].global_order_path, vec![1]);
    }

    #[test]
    fn test_sort_records_by_document_path() {
        let mut records = vec![
            BlockRecord::new("z", "Z", 0).with_ancestor("second", "", 1),
            BlockRecord::new("x", "X", 0)
                .with_ancestor("first", "", 0)
                .with_ancestor("y", "Y", 1),
            BlockRecord::new("y", "Y", 1).with_ancestor("first", "", 0),
            BlockRecord::new("w", "W", 0).with_ancestor("first", "", 0),
        ];
        sort_records(&mut records);

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["w", "y", "x", "z"]);
    }

    #[test]
    fn test_unknown_root_falls_back_to_order() {
        let mut forest = vec![TreeNode::new("orphan", "Orphan", 7)];
        assign_order_paths(&mut forest, &[]);
        assert_eq!(forest[0].global_order_path, vec![7]);
    }

    #[test]
    fn test_root_record_before_ancestor_root() {
        let records = vec![
            BlockRecord::new("B", "Beta", 0).with_ancestor("P", "Parent", 1),
            BlockRecord::new("A", "Alpha", 0),
        ];
        let mut forest = build_forest(&records, &DetachedSource);
        assert_eq!(root_ids(&forest), vec!["P", "A"]);

        assign_and_sort_roots(&mut forest, &records);
        assert_eq!(root_ids(&forest), vec!["A", "P"]);
    }

    #[test]
    fn test_sort_is_stable_and_idempotent() {
        let mut forest = vec![
            TreeNode::new("late", "Late", 0),
            TreeNode::new("tie-1", "Tie", 0),
            TreeNode::new("early", "Early", 0),
            TreeNode::new("tie-2", "Tie", 0),
        ];
        forest[0].global_order_path = vec![2];
        forest[1].global_order_path = vec![1, 0];
        forest[2].global_order_path = vec![0, 5];
        forest[3].global_order_path = vec![1];

        sort_roots(&mut forest);
        let once = forest.clone();
        assert_eq!(root_ids(&forest), vec!["early", "tie-1", "tie-2", "late"]);

        sort_roots(&mut forest);
        assert_eq!(forest, once);
    }
}
