//! Tree node model shared by the builder, resolver, pruner and renderers
//!
//! A [`BlockRecord`] is the flat shape a filter query produces: one matched
//! block plus its ancestor chain. A [`TreeNode`] is the canonical unit of an
//! export forest; a forest owns all of its descendants exclusively.

use serde::{Deserialize, Serialize};

/// Position of a block among its siblings
pub type Order = i64;

/// An ordered list of independent root trees
pub type Forest = Vec<TreeNode>;

/// Returns true when block content is empty or whitespace only.
///
/// Blank ancestors are unnamed containers; they are skipped by the builder
/// and never rendered.
pub fn is_blank(content: &str) -> bool {
    content.trim().is_empty()
}

/// One entry in a record's ancestor chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorEntry {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub order: Order,
}

/// A block that satisfied a filter, with its ancestors ordered root-to-leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub order: Order,
    #[serde(default)]
    pub ancestors: Vec<AncestorEntry>,
}

impl BlockRecord {
    pub fn new(id: impl Into<String>, content: impl Into<String>, order: Order) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            order,
            ancestors: Vec::new(),
        }
    }

    /// Append an ancestor below the ones already present (root-to-leaf order)
    pub fn with_ancestor(
        mut self,
        id: impl Into<String>,
        content: impl Into<String>,
        order: Order,
    ) -> Self {
        self.ancestors.push(AncestorEntry {
            id: id.into(),
            content: content.into(),
            order,
        });
        self
    }

    /// Has an id and every ancestor has one too
    pub fn is_well_formed(&self) -> bool {
        !is_blank(&self.id) && self.ancestors.iter().all(|a| !is_blank(&a.id))
    }

    /// Sibling positions from the top of the document down to this block
    pub fn document_path(&self) -> Vec<Order> {
        self.ancestors
            .iter()
            .map(|a| a.order)
            .chain(std::iter::once(self.order))
            .collect()
    }
}

/// A node of an export forest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub children: Vec<TreeNode>,
    #[serde(default)]
    pub order: Order,
    /// The block matched the originating filter directly
    #[serde(default)]
    pub is_target: bool,
    /// Cross-root ordering key, only meaningful on roots
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_order_path: Vec<Order>,
}

impl TreeNode {
    pub fn new(id: impl Into<String>, content: impl Into<String>, order: Order) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            children: Vec::new(),
            order,
            is_target: false,
            global_order_path: Vec::new(),
        }
    }

    /// Create a node flagged as a direct filter match
    pub fn target(id: impl Into<String>, content: impl Into<String>, order: Order) -> Self {
        Self {
            is_target: true,
            ..Self::new(id, content, order)
        }
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order iterator over this node and all of its descendants
    pub fn iter(&self) -> Nodes<'_> {
        Nodes { stack: vec![self] }
    }

    /// Number of nodes strictly below this one
    pub fn descendant_count(&self) -> usize {
        self.iter().count() - 1
    }

    /// Stable sort of every level of children by `order`
    pub fn sort_children_recursive(&mut self) {
        self.children.sort_by_key(|child| child.order);
        for child in &mut self.children {
            child.sort_children_recursive();
        }
    }
}

/// Pre-order traversal over a tree, driven by an explicit stack
pub struct Nodes<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Pre-order iterator over every node of a forest
pub fn forest_nodes(forest: &[TreeNode]) -> impl Iterator<Item = &TreeNode> {
    forest.iter().flat_map(TreeNode::iter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::new("p", "Parent", 0).with_children(vec![
            TreeNode::new("b", "Beta", 1)
                .with_children(vec![TreeNode::new("b1", "Beta one", 0)]),
            TreeNode::new("a", "Alpha", 0),
        ])
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   \n"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn test_preorder_iteration() {
        let node = sample();
        let ids: Vec<&str> = node.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["p", "b", "b1", "a"]);
        assert_eq!(node.descendant_count(), 3);
    }

    #[test]
    fn test_sort_children_is_stable() {
        let mut node = TreeNode::new("root", "Root", 0).with_children(vec![
            TreeNode::new("second", "x", 1),
            TreeNode::new("first-tie", "y", 0),
            TreeNode::new("second-tie", "z", 0),
        ]);
        node.sort_children_recursive();
        let ids: Vec<&str> = node.children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["first-tie", "second-tie", "second"]);
    }

    #[test]
    fn test_record_builder_keeps_root_to_leaf_order() {
        let record = BlockRecord::new("b", "Beta", 2)
            .with_ancestor("page", "Page", 0)
            .with_ancestor("p", "Parent", 1);
        assert_eq!(record.ancestors[0].id, "page");
        assert_eq!(record.ancestors[1].id, "p");
    }

    #[test]
    fn test_serialize_skips_empty_order_path() {
        let json = serde_json::to_value(TreeNode::new("a", "Alpha", 0)).unwrap();
        assert!(json.get("global_order_path").is_none());
        assert_eq!(json["is_target"], false);
    }
}
