//! Descendant and block-info cache scoped to a single export operation
//!
//! Create one [`ExportCache`] right before an export or copy starts and let
//! it drop when the operation ends. Pruning and selection traversals ask the
//! same subtree questions from many candidate ancestors; the cache turns
//! those repeated pulls into map lookups.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::logging::ResourceMetrics;
use crate::source::{BlockSource, RawBlock};

/// Shape of a single-block pull, second half of the block-info cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryShape {
    /// Content plus one level of child references
    ContentWithChildren,
    /// Child references only; content is not retained
    ChildIds,
}

impl QueryShape {
    fn project(self, block: RawBlock) -> RawBlock {
        match self {
            QueryShape::ContentWithChildren => block,
            QueryShape::ChildIds => RawBlock {
                content: String::new(),
                ..block
            },
        }
    }
}

/// Memoized descendant lists and block pulls for one operation
#[derive(Debug, Default)]
pub struct ExportCache {
    descendant_ids: HashMap<String, Vec<String>>,
    block_info: HashMap<(String, QueryShape), Option<RawBlock>>,
    metrics: ResourceMetrics,
}

impl ExportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hit/miss statistics collected so far
    pub fn metrics(&self) -> &ResourceMetrics {
        &self.metrics
    }

    /// Number of memoized block pulls
    pub fn cached_blocks(&self) -> usize {
        self.block_info.len()
    }

    /// Number of memoized descendant lists
    pub fn cached_descendant_lists(&self) -> usize {
        self.descendant_ids.len()
    }

    /// Pull a single block, memoized by `(id, shape)`.
    ///
    /// A failed pull is logged and reported as `None`; failures are not
    /// memoized, so a later lookup retries the host.
    pub fn block_info(
        &mut self,
        source: &dyn BlockSource,
        id: &str,
        shape: QueryShape,
    ) -> Option<RawBlock> {
        let key = (id.to_string(), shape);
        if let Some(cached) = self.block_info.get(&key) {
            self.metrics.record_cache_hit();
            return cached.clone();
        }

        self.metrics.record_cache_miss();
        match source.fetch_block(id) {
            Ok(block) => {
                let block = block.map(|b| shape.project(b));
                let bytes = block
                    .as_ref()
                    .map(|b| b.content.len() + b.children.iter().map(|c| c.id.len()).sum::<usize>())
                    .unwrap_or(0);
                self.metrics.record_allocation(bytes as u64);
                self.block_info.insert(key, block.clone());
                block
            }
            Err(e) => {
                warn!(id, error = %e, "block pull failed");
                None
            }
        }
    }

    /// Every descendant id of a block in pre-order, memoized per block.
    ///
    /// The walk uses an explicit stack and stops at repeated ids, so deep or
    /// cyclic source data terminates. Lists already memoized for a child are
    /// reused instead of walked again.
    pub fn descendant_ids(&mut self, source: &dyn BlockSource, id: &str) -> &[String] {
        if self.descendant_ids.contains_key(id) {
            self.metrics.record_cache_hit();
        } else {
            self.metrics.record_cache_miss();
            let descendants = self.walk_descendants(source, id);
            let bytes: usize = descendants.iter().map(String::len).sum();
            self.metrics.record_allocation(bytes as u64);
            self.descendant_ids.insert(id.to_string(), descendants);
        }

        self.descendant_ids
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn walk_descendants(&mut self, source: &dyn BlockSource, id: &str) -> Vec<String> {
        let mut descendants = Vec::new();
        let mut visited = HashSet::from([id.to_string()]);
        let mut stack = self.sorted_child_ids(source, id);
        stack.reverse();

        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            descendants.push(current.clone());

            if let Some(known) = self.descendant_ids.get(&current) {
                for descendant in known {
                    if visited.insert(descendant.clone()) {
                        descendants.push(descendant.clone());
                    }
                }
                continue;
            }

            let mut children = self.sorted_child_ids(source, &current);
            children.reverse();
            stack.extend(children);
        }

        descendants
    }

    fn sorted_child_ids(&mut self, source: &dyn BlockSource, id: &str) -> Vec<String> {
        self.block_info(source, id, QueryShape::ChildIds)
            .map(|block| block.sorted_children().into_iter().map(|c| c.id).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeNode;
    use crate::source::MemorySource;

    fn source() -> MemorySource {
        MemorySource::from_forest(&[TreeNode::new("p", "Parent", 0).with_children(vec![
            TreeNode::new("b", "Beta", 0).with_children(vec![TreeNode::new("b1", "Leaf", 0)]),
            TreeNode::new("c", "Gamma", 1),
        ])])
    }

    #[test]
    fn test_descendant_ids_preorder() {
        let source = source();
        let mut cache = ExportCache::new();
        assert_eq!(cache.descendant_ids(&source, "p"), ["b", "b1", "c"]);
        assert_eq!(cache.descendant_ids(&source, "b"), ["b1"]);
        assert!(cache.descendant_ids(&source, "c").is_empty());
    }

    #[test]
    fn test_descendant_ids_memoized() {
        let source = source();
        let mut cache = ExportCache::new();
        cache.descendant_ids(&source, "p");
        let misses = cache.metrics().cache_misses();
        cache.descendant_ids(&source, "p");
        assert_eq!(cache.metrics().cache_misses(), misses);
        assert!(cache.metrics().cache_hits() >= 1);
    }

    #[test]
    fn test_descendant_ids_reuses_child_lists() {
        let source = source();
        let mut cache = ExportCache::new();
        cache.descendant_ids(&source, "b");
        let pulls = cache.cached_blocks();
        assert_eq!(cache.descendant_ids(&source, "p"), ["b", "b1", "c"]);
        // b's subtree was not pulled again, only p and c were added
        assert_eq!(cache.cached_blocks(), pulls + 2);
    }

    #[test]
    fn test_block_info_by_shape() {
        let source = source();
        let mut cache = ExportCache::new();
        let full = cache
            .block_info(&source, "b", QueryShape::ContentWithChildren)
            .unwrap();
        assert_eq!(full.content, "Beta");
        let ids_only = cache.block_info(&source, "b", QueryShape::ChildIds).unwrap();
        assert_eq!(ids_only.content, "");
        assert_eq!(ids_only.children.len(), 1);
        assert_eq!(cache.cached_blocks(), 2);
    }

    #[test]
    fn test_unknown_block() {
        let source = source();
        let mut cache = ExportCache::new();
        assert!(cache
            .block_info(&source, "missing", QueryShape::ContentWithChildren)
            .is_none());
        assert!(cache.descendant_ids(&source, "missing").is_empty());
    }
}
