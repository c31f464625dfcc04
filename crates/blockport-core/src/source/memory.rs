//! In-memory block graph loaded from JSON
//!
//! Accepts both the bare attribute names of an outliner's JSON export
//! (`uid`, `string`, `title`, `children`) and the namespaced pull shape
//! (`:block/uid`, `:block/string`, `:node/title`, `:block/children`).
//! Either a top-level array of pages or an object with a `pages` key is
//! accepted. Blocks without an explicit order take their index among
//! siblings.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{BlockSource, ChildRef, RawBlock};
use crate::error::{BlockportError, Result};
use crate::model::{is_blank, AncestorEntry, BlockRecord, Order, TreeNode};

#[derive(Deserialize)]
#[serde(untagged)]
enum GraphFile {
    Pages(Vec<RawPage>),
    Wrapped { pages: Vec<RawPage> },
}

#[derive(Deserialize)]
struct RawPage {
    #[serde(default, alias = ":block/uid", alias = "id")]
    uid: String,
    #[serde(default, alias = ":node/title")]
    title: String,
    #[serde(default, alias = ":block/children")]
    children: Vec<RawNode>,
}

#[derive(Deserialize)]
struct RawNode {
    #[serde(default, alias = ":block/uid", alias = "id")]
    uid: String,
    #[serde(default, alias = ":block/string", alias = "content")]
    string: String,
    #[serde(default, alias = ":block/order")]
    order: Option<Order>,
    #[serde(default, alias = ":block/refs")]
    refs: Vec<String>,
    #[serde(default, alias = ":block/children")]
    children: Vec<RawNode>,
}

#[derive(Debug, Clone)]
struct Entry {
    content: String,
    order: Order,
    parent: Option<String>,
    children: Vec<ChildRef>,
    refs: Vec<String>,
}

/// Matches blocks that reference a tag or page by name
struct TagMatcher<'a> {
    name: &'a str,
    pattern: Regex,
}

impl<'a> TagMatcher<'a> {
    fn new(name: &'a str) -> Result<Self> {
        let escaped = regex::escape(name);
        let pattern = Regex::new(&format!(
            r"#\[\[{0}\]\]|\[\[{0}\]\]|#{0}(?:[^\w/-]|$)",
            escaped
        ))
        .map_err(|e| BlockportError::invalid_value("filter", e))?;
        Ok(Self { name, pattern })
    }

    fn matches(&self, entry: &Entry) -> bool {
        entry.refs.iter().any(|r| r == self.name) || self.pattern.is_match(&entry.content)
    }
}

/// A block graph held entirely in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    blocks: HashMap<String, Entry>,
    pages: Vec<String>,
    titles: HashMap<String, String>,
}

impl MemorySource {
    /// Load a graph from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BlockportError::GraphNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| BlockportError::io_operation("read graph", path.display(), e))?;
        Self::from_json_str(&content)
    }

    /// Parse a graph from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: GraphFile = serde_json::from_str(json)?;
        let pages = match file {
            GraphFile::Pages(pages) | GraphFile::Wrapped { pages } => pages,
        };

        let mut source = Self::default();
        for page in pages {
            source.insert_page(page);
        }
        debug!(
            pages = source.pages.len(),
            blocks = source.blocks.len(),
            "loaded block graph"
        );
        Ok(source)
    }

    /// Build a graph whose top-level entries are the roots of `forest`
    pub fn from_forest(forest: &[TreeNode]) -> Self {
        let mut source = Self::default();
        for root in forest {
            if source.insert_tree(root, None) {
                source.titles.insert(root.content.clone(), root.id.clone());
                source.pages.push(root.id.clone());
            }
        }
        source
    }

    /// Page ids with their titles, in graph order
    pub fn pages(&self) -> Vec<(String, String)> {
        self.pages
            .iter()
            .filter_map(|id| {
                self.blocks
                    .get(id)
                    .map(|entry| (id.clone(), entry.content.clone()))
            })
            .collect()
    }

    /// Resolve a page title or id to its id
    pub fn resolve_page(&self, page: &str) -> Option<&str> {
        if let Some(id) = self.titles.get(page) {
            return Some(id.as_str());
        }
        self.pages
            .iter()
            .find(|id| id.as_str() == page)
            .map(String::as_str)
    }

    /// Whether a block (or page) with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.blocks.contains_key(id)
    }

    fn insert_page(&mut self, page: RawPage) {
        let id = if is_blank(&page.uid) {
            page.title.clone()
        } else {
            page.uid
        };
        if is_blank(&id) {
            warn!("skipping page without uid or title");
            return;
        }
        if self.blocks.contains_key(&id) {
            warn!(id = %id, "duplicate page id, keeping first occurrence");
            return;
        }

        // Pages are ordered by their position in the graph file
        let order = self.pages.len() as Order;
        self.blocks.insert(
            id.clone(),
            Entry {
                content: page.title.clone(),
                order,
                parent: None,
                children: Vec::new(),
                refs: Vec::new(),
            },
        );
        self.titles.insert(page.title, id.clone());
        self.pages.push(id.clone());

        for (index, child) in page.children.into_iter().enumerate() {
            self.insert_node(child, &id, index);
        }
    }

    fn insert_node(&mut self, node: RawNode, parent: &str, index: usize) {
        if is_blank(&node.uid) {
            warn!(parent, "skipping block without uid");
            return;
        }
        if self.blocks.contains_key(&node.uid) {
            warn!(id = %node.uid, "duplicate block id, keeping first occurrence");
            return;
        }

        let order = node.order.unwrap_or(index as Order);
        if let Some(parent_entry) = self.blocks.get_mut(parent) {
            parent_entry.children.push(ChildRef {
                id: node.uid.clone(),
                order,
            });
        }
        self.blocks.insert(
            node.uid.clone(),
            Entry {
                content: node.string,
                order,
                parent: Some(parent.to_string()),
                children: Vec::new(),
                refs: node.refs,
            },
        );

        for (child_index, child) in node.children.into_iter().enumerate() {
            self.insert_node(child, &node.uid, child_index);
        }
    }

    fn insert_tree(&mut self, node: &TreeNode, parent: Option<&str>) -> bool {
        if self.blocks.contains_key(&node.id) {
            return false;
        }
        if let Some(parent_entry) = parent.and_then(|p| self.blocks.get_mut(p)) {
            parent_entry.children.push(ChildRef {
                id: node.id.clone(),
                order: node.order,
            });
        }
        self.blocks.insert(
            node.id.clone(),
            Entry {
                content: node.content.clone(),
                order: node.order,
                parent: parent.map(str::to_string),
                children: Vec::new(),
                refs: Vec::new(),
            },
        );
        for child in &node.children {
            self.insert_tree(child, Some(&node.id));
        }
        true
    }

    /// Ancestor chain of a block, root-to-leaf, excluding the block itself.
    ///
    /// The page is the first entry and has blank content.
    fn ancestors(&self, id: &str) -> Vec<AncestorEntry> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.blocks.get(id).and_then(|e| e.parent.clone());

        while let Some(parent_id) = current {
            if !seen.insert(parent_id.clone()) {
                break;
            }
            let Some(entry) = self.blocks.get(&parent_id) else {
                break;
            };
            // Pages carry a title, not block text, so they read as blank containers
            let content = if entry.parent.is_some() {
                entry.content.clone()
            } else {
                String::new()
            };
            chain.push(AncestorEntry {
                id: parent_id.clone(),
                content,
                order: entry.order,
            });
            current = entry.parent.clone();
        }

        chain.reverse();
        chain
    }

    fn record_for(&self, id: &str) -> Option<BlockRecord> {
        let entry = self.blocks.get(id)?;
        Some(BlockRecord {
            id: id.to_string(),
            content: entry.content.clone(),
            order: entry.order,
            ancestors: self.ancestors(id),
        })
    }

    /// All block ids in document order: pages in load order, blocks pre-order
    fn document_order(&self) -> Vec<&str> {
        let mut ordered = Vec::with_capacity(self.blocks.len());
        let mut seen = HashSet::new();
        let mut stack: Vec<&str> = self.pages.iter().rev().map(String::as_str).collect();

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            ordered.push(id);
            if let Some(entry) = self.blocks.get(id) {
                let mut children: Vec<&ChildRef> = entry.children.iter().collect();
                children.sort_by_key(|c| c.order);
                stack.extend(children.into_iter().rev().map(|c| c.id.as_str()));
            }
        }

        ordered
    }
}

impl BlockSource for MemorySource {
    fn query_by_filter(&self, filter: &str) -> Result<Vec<BlockRecord>> {
        let matcher = TagMatcher::new(filter)?;
        let records: Vec<BlockRecord> = self
            .document_order()
            .into_iter()
            .filter(|id| !self.pages.iter().any(|p| p == id))
            .filter(|id| self.blocks.get(*id).is_some_and(|e| matcher.matches(e)))
            .filter_map(|id| self.record_for(id))
            .collect();
        debug!(filter, matches = records.len(), "query_by_filter");
        Ok(records)
    }

    fn query_by_filter_in(&self, page: &str, filter: &str) -> Result<Vec<BlockRecord>> {
        let page_id = self
            .resolve_page(page)
            .ok_or_else(|| BlockportError::not_found("page", page))?;
        let records: Vec<BlockRecord> = self
            .query_by_filter(filter)?
            .into_iter()
            .filter(|record| record.ancestors.first().is_some_and(|a| a.id == page_id))
            .collect();
        debug!(page, filter, matches = records.len(), "query_by_filter_in");
        Ok(records)
    }

    fn fetch_block(&self, id: &str) -> Result<Option<RawBlock>> {
        Ok(self.blocks.get(id).map(|entry| RawBlock {
            id: id.to_string(),
            content: entry.content.clone(),
            order: entry.order,
            children: entry.children.clone(),
        }))
    }

    fn fetch_record(&self, id: &str) -> Result<Option<BlockRecord>> {
        Ok(self.record_for(id))
    }

    fn page_blocks(&self, page: &str) -> Result<Vec<ChildRef>> {
        let id = self
            .resolve_page(page)
            .ok_or_else(|| BlockportError::not_found("page", page))?;
        let mut children = self
            .blocks
            .get(id)
            .map(|entry| entry.children.clone())
            .unwrap_or_default();
        children.sort_by_key(|c| c.order);
        Ok(children)
    }

    fn subtree_matches(&self, id: &str, filter: &str) -> Result<bool> {
        let matcher = TagMatcher::new(filter)?;
        let mut stack = vec![id];
        let mut seen = HashSet::new();

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let Some(entry) = self.blocks.get(current) else {
                continue;
            };
            if matcher.matches(entry) {
                return Ok(true);
            }
            stack.extend(entry.children.iter().map(|c| c.id.as_str()));
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAPH: &str = r##"{
        "pages": [
            {
                "uid": "page-1",
                "title": "Reading",
                "children": [
                    {
                        "uid": "b1",
                        "string": "Books #toread",
                        "children": [
                            { "uid": "b1a", "string": "Dune" },
                            { "uid": "b1b", "string": "Hyperion", "refs": ["scifi"] }
                        ]
                    },
                    {
                        "uid": "b2",
                        "string": "",
                        "children": [
                            { "uid": "b2a", "string": "Paper [[toread]]" }
                        ]
                    }
                ]
            }
        ]
    }"##;

    #[test]
    fn test_load_wrapped_graph() {
        let source = MemorySource::from_json_str(GRAPH).unwrap();
        assert!(source.contains("page-1"));
        assert!(source.contains("b2a"));
        assert_eq!(source.resolve_page("Reading"), Some("page-1"));
        assert_eq!(source.pages(), vec![("page-1".into(), "Reading".into())]);
    }

    #[test]
    fn test_pages_ordered_by_position() {
        let source = MemorySource::from_json_str(
            r#"[{ "uid": "p1", "title": "One" }, { "uid": "p2", "title": "Two",
                 "children": [{ "uid": "c", "string": "Child" }] }]"#,
        )
        .unwrap();
        assert_eq!(source.fetch_block("p1").unwrap().unwrap().order, 0);
        assert_eq!(source.fetch_block("p2").unwrap().unwrap().order, 1);
        let record = source.fetch_record("c").unwrap().unwrap();
        assert_eq!(record.document_path(), vec![1, 0]);
    }

    #[test]
    fn test_query_scoped_to_page() {
        let source = MemorySource::from_json_str(
            r##"[
                { "uid": "p1", "title": "One", "children": [{ "uid": "a", "string": "A #t" }] },
                { "uid": "p2", "title": "Two", "children": [{ "uid": "b", "string": "B #t" }] }
            ]"##,
        )
        .unwrap();

        let ids = |records: Vec<BlockRecord>| -> Vec<String> {
            records.into_iter().map(|r| r.id).collect()
        };
        assert_eq!(ids(source.query_by_filter("t").unwrap()), vec!["a", "b"]);
        assert_eq!(ids(source.query_by_filter_in("Two", "t").unwrap()), vec!["b"]);
        assert_eq!(ids(source.query_by_filter_in("p1", "t").unwrap()), vec!["a"]);
        assert!(matches!(
            source.query_by_filter_in("Three", "t"),
            Err(BlockportError::NotFound { .. })
        ));
    }

    #[test]
    fn test_load_prefixed_attribute_names() {
        let json = r#"[
            {
                ":node/title": "Daily",
                ":block/uid": "d1",
                ":block/children": [
                    { ":block/uid": "x", ":block/string": "Item", ":block/order": 3 }
                ]
            }
        ]"#;
        let source = MemorySource::from_json_str(json).unwrap();
        let block = source.fetch_block("x").unwrap().unwrap();
        assert_eq!(block.content, "Item");
        assert_eq!(block.order, 3);
        assert_eq!(source.page_blocks("Daily").unwrap()[0].id, "x");
    }

    #[test]
    fn test_query_by_filter_builds_ancestor_chains() {
        let source = MemorySource::from_json_str(GRAPH).unwrap();
        let records = source.query_by_filter("toread").unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b2a"]);

        let nested = &records[1];
        let chain: Vec<&str> = nested.ancestors.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(chain, vec!["page-1", "b2"]);
        assert_eq!(nested.ancestors[0].content, "");
        assert_eq!(nested.ancestors[1].content, "");
        assert_eq!(nested.order, 0);
    }

    #[test]
    fn test_query_matches_explicit_refs() {
        let source = MemorySource::from_json_str(GRAPH).unwrap();
        let records = source.query_by_filter("scifi").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "b1b");
        assert_eq!(records[0].order, 1);
    }

    #[test]
    fn test_tag_does_not_match_longer_tag() {
        let source = MemorySource::from_json_str(GRAPH).unwrap();
        assert!(source.query_by_filter("toreadlater").unwrap().is_empty());
        assert!(source.query_by_filter("to").unwrap().is_empty());
    }

    #[test]
    fn test_fetch_subtree() {
        let source = MemorySource::from_json_str(GRAPH).unwrap();
        let tree = source.fetch_subtree("b1").unwrap().unwrap();
        let ids: Vec<&str> = tree.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b1a", "b1b"]);
        assert!(source.fetch_subtree("missing").unwrap().is_none());
    }

    #[test]
    fn test_subtree_matches() {
        let source = MemorySource::from_json_str(GRAPH).unwrap();
        assert!(source.subtree_matches("b1", "scifi").unwrap());
        assert!(source.subtree_matches("b2", "toread").unwrap());
        assert!(!source.subtree_matches("b2", "scifi").unwrap());
    }

    #[test]
    fn test_unknown_page() {
        let source = MemorySource::from_json_str(GRAPH).unwrap();
        assert!(matches!(
            source.page_blocks("Nope"),
            Err(BlockportError::NotFound { .. })
        ));
    }

    #[test]
    fn test_from_forest_round_trips_structure() {
        let forest = vec![TreeNode::new("p", "Parent", 0).with_children(vec![
            TreeNode::new("b", "Beta", 0),
            TreeNode::new("c", "Gamma", 1),
        ])];
        let source = MemorySource::from_forest(&forest);
        let children: Vec<String> = source
            .fetch_children("p")
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(children, vec!["b", "c"]);
        assert_eq!(source.fetch_subtree("p").unwrap().unwrap(), forest[0]);
    }

    #[test]
    fn test_missing_graph_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = MemorySource::load(&dir.path().join("graph.json"));
        assert!(matches!(result, Err(BlockportError::GraphNotFound { .. })));
    }
}
