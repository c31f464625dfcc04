//! Block source abstraction
//!
//! The engine never talks to an outliner directly. Everything it needs from
//! the host (filter queries, single-block pulls, full subtree pulls) goes
//! through [`BlockSource`], so the builder and pruner can be driven by the
//! in-memory JSON graph in [`memory`] or by any other adapter.

pub mod memory;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{BlockportError, Result};
use crate::model::{BlockRecord, Order, TreeNode};

pub use memory::MemorySource;

/// One level of child reference as returned by a pull
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRef {
    pub id: String,
    #[serde(default)]
    pub order: Order,
}

/// A single block with its direct children, unsorted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBlock {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub order: Order,
    #[serde(default)]
    pub children: Vec<ChildRef>,
}

impl RawBlock {
    /// Children sorted by `order`, ties kept in pull order
    pub fn sorted_children(&self) -> Vec<ChildRef> {
        let mut children = self.children.clone();
        children.sort_by_key(|child| child.order);
        children
    }
}

/// Trait for the host collaborator that answers queries and pulls
pub trait BlockSource {
    /// Blocks that satisfy `filter`, each with its root-to-leaf ancestor chain
    fn query_by_filter(&self, filter: &str) -> Result<Vec<BlockRecord>>;

    /// A single block with one level of child references
    fn fetch_block(&self, id: &str) -> Result<Option<RawBlock>>;

    /// A single block as a record, with its ancestor chain
    fn fetch_record(&self, id: &str) -> Result<Option<BlockRecord>>;

    /// Top-level blocks of a page, addressed by title or id
    fn page_blocks(&self, page: &str) -> Result<Vec<ChildRef>>;

    /// Whether the block or any of its descendants satisfies `filter`
    fn subtree_matches(&self, id: &str, filter: &str) -> Result<bool>;

    /// Blocks on one page that satisfy `filter`. Hosts that can scope the
    /// query themselves should; the default keeps records whose first
    /// ancestor is the page.
    fn query_by_filter_in(&self, page: &str, filter: &str) -> Result<Vec<BlockRecord>> {
        Ok(self
            .query_by_filter(filter)?
            .into_iter()
            .filter(|record| record.ancestors.first().is_some_and(|a| a.id == page))
            .collect())
    }

    /// Direct children of a block
    fn fetch_children(&self, id: &str) -> Result<Vec<ChildRef>> {
        Ok(self
            .fetch_block(id)?
            .map(|block| block.children)
            .unwrap_or_default())
    }

    /// The block with its full, depth-unbounded descendant tree
    fn fetch_subtree(&self, id: &str) -> Result<Option<TreeNode>> {
        let mut visited = HashSet::new();
        pull_tree(self, id, &mut visited)
    }
}

fn pull_tree<S: BlockSource + ?Sized>(
    source: &S,
    id: &str,
    visited: &mut HashSet<String>,
) -> Result<Option<TreeNode>> {
    if !visited.insert(id.to_string()) {
        tracing::warn!(id, "cycle in block children, skipping repeated block");
        return Ok(None);
    }

    let Some(block) = source.fetch_block(id)? else {
        return Ok(None);
    };

    let mut node = TreeNode::new(block.id.clone(), block.content.clone(), block.order);
    for child in block.sorted_children() {
        if let Some(mut child_node) = pull_tree(source, &child.id, visited)? {
            child_node.order = child.order;
            node.children.push(child_node);
        }
    }

    Ok(Some(node))
}

/// A source with no host behind it.
///
/// Used when records are supplied directly: pulls find nothing and queries
/// report the host as unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSource;

impl BlockSource for DetachedSource {
    fn query_by_filter(&self, _filter: &str) -> Result<Vec<BlockRecord>> {
        Err(BlockportError::source_unavailable("no block graph loaded"))
    }

    fn fetch_block(&self, _id: &str) -> Result<Option<RawBlock>> {
        Ok(None)
    }

    fn fetch_record(&self, _id: &str) -> Result<Option<BlockRecord>> {
        Ok(None)
    }

    fn page_blocks(&self, _page: &str) -> Result<Vec<ChildRef>> {
        Err(BlockportError::source_unavailable("no block graph loaded"))
    }

    fn subtree_matches(&self, _id: &str, _filter: &str) -> Result<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_children_stable() {
        let block = RawBlock {
            id: "p".into(),
            content: "Parent".into(),
            order: 0,
            children: vec![
                ChildRef { id: "c".into(), order: 2 },
                ChildRef { id: "a".into(), order: 0 },
                ChildRef { id: "b".into(), order: 0 },
            ],
        };
        let ids: Vec<String> = block.sorted_children().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_detached_source() {
        let source = DetachedSource;
        assert!(source.fetch_subtree("x").unwrap().is_none());
        assert!(source.fetch_children("x").unwrap().is_empty());
        assert!(matches!(
            source.query_by_filter("tag"),
            Err(BlockportError::SourceUnavailable { .. })
        ));
    }
}
