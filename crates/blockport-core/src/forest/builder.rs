use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tracing::{debug, warn};

use crate::model::{is_blank, BlockRecord, Forest, Order, TreeNode};
use crate::source::BlockSource;
use crate::trace_time;

/// A node while the forest is still being assembled; children are ids
#[derive(Debug)]
struct Slot {
    content: String,
    order: Order,
    is_target: bool,
    children: Vec<String>,
    /// Full descendant tree pulled from the host, replaces `children`
    fetched: Option<Vec<TreeNode>>,
}

impl Slot {
    fn new(content: &str, order: Order, is_target: bool) -> Self {
        Self {
            content: content.to_string(),
            order,
            is_target,
            children: Vec::new(),
            fetched: None,
        }
    }
}

/// Incremental forest assembly over an id map.
///
/// Nodes live in a flat map and refer to their children by id until
/// [`ForestBuilder::finish`] materializes owned trees, so a block seen from
/// several ancestor chains is stored once.
pub struct ForestBuilder<'a> {
    source: &'a dyn BlockSource,
    slots: HashMap<String, Slot>,
    /// Slot ids in first-seen order
    seen: Vec<String>,
    roots: Vec<String>,
    root_set: HashSet<String>,
    skipped: usize,
}

impl<'a> ForestBuilder<'a> {
    pub fn new(source: &'a dyn BlockSource) -> Self {
        Self {
            source,
            slots: HashMap::new(),
            seen: Vec::new(),
            roots: Vec::new(),
            root_set: HashSet::new(),
            skipped: 0,
        }
    }

    /// Number of records rejected as malformed so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Merge one matched record and its ancestor chain into the map
    pub fn add_record(&mut self, record: &BlockRecord) {
        if is_blank(&record.id) {
            warn!(content = %record.content, "skipping record without id");
            self.skipped += 1;
            return;
        }
        if !record.is_well_formed() {
            warn!(id = %record.id, "skipping record with malformed ancestor entry");
            self.skipped += 1;
            return;
        }

        match self.slots.get_mut(&record.id) {
            Some(existing) => {
                existing.is_target = true;
                existing.order = record.order;
                if is_blank(&existing.content) && !is_blank(&record.content) {
                    existing.content = record.content.clone();
                }
            }
            None => self.insert_slot(&record.id, Slot::new(&record.content, record.order, true)),
        }

        if record.ancestors.is_empty() {
            self.register_root(&record.id);
            return;
        }

        let last = record.ancestors.len() - 1;
        let mut child = record.id.clone();
        for (i, ancestor) in record.ancestors.iter().rev().enumerate() {
            if is_blank(&ancestor.content) {
                // Unnamed container: the child hangs off the next ancestor up
                if i == last {
                    self.register_root(&child);
                }
                continue;
            }

            if !self.slots.contains_key(&ancestor.id) {
                self.insert_slot(
                    &ancestor.id,
                    Slot::new(&ancestor.content, ancestor.order, false),
                );
            }
            if ancestor.id != child {
                if let Some(parent) = self.slots.get_mut(&ancestor.id) {
                    if !parent.children.contains(&child) {
                        parent.children.push(child.clone());
                    }
                }
            }

            child = ancestor.id.clone();
            if i == last {
                self.register_root(&child);
            }
        }
    }

    /// Replace the children of every matched node with its full subtree.
    ///
    /// An empty or failed pull leaves whatever children the ancestor chains
    /// already attached.
    pub fn attach_descendants(&mut self) {
        for id in &self.seen {
            let Some(slot) = self.slots.get_mut(id) else {
                continue;
            };
            if !slot.is_target {
                continue;
            }

            match self.source.fetch_subtree(id) {
                Ok(Some(tree)) if !tree.children.is_empty() => {
                    debug!(id = %id, children = tree.children.len(), "attached descendants");
                    slot.fetched = Some(tree.children);
                }
                Ok(_) => {
                    debug!(id = %id, "no descendants returned, keeping existing children");
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "descendant fetch failed, keeping partial structure");
                }
            }
        }
    }

    /// Materialize owned trees, roots in registration order, children sorted
    pub fn finish(self) -> Forest {
        let linked: HashSet<&str> = self
            .slots
            .values()
            .filter(|slot| slot.fetched.is_none())
            .flat_map(|slot| slot.children.iter().map(String::as_str))
            .collect();

        let mut emitted = HashSet::new();
        let mut forest = Vec::new();
        for root in &self.roots {
            if linked.contains(root.as_str()) {
                debug!(id = %root, "registered root is linked under another node");
                continue;
            }
            if let Some(mut node) = self.materialize(root, &mut emitted) {
                node.sort_children_recursive();
                forest.push(node);
            }
        }

        debug!(
            nodes = emitted.len(),
            roots = forest.len(),
            skipped = self.skipped,
            "forest materialized"
        );
        forest
    }

    fn insert_slot(&mut self, id: &str, slot: Slot) {
        self.seen.push(id.to_string());
        self.slots.insert(id.to_string(), slot);
    }

    fn register_root(&mut self, id: &str) {
        if self.root_set.insert(id.to_string()) {
            self.roots.push(id.to_string());
        }
    }

    fn materialize(&self, id: &str, emitted: &mut HashSet<String>) -> Option<TreeNode> {
        if !emitted.insert(id.to_string()) {
            debug!(id, "node already placed in forest, skipping repeat");
            return None;
        }
        let slot = self.slots.get(id)?;

        let children = match &slot.fetched {
            Some(fetched) => fetched
                .iter()
                .filter_map(|child| self.adopt(child.clone(), emitted))
                .collect(),
            None => slot
                .children
                .iter()
                .filter_map(|child| self.materialize(child, emitted))
                .collect(),
        };

        Some(TreeNode {
            id: id.to_string(),
            content: slot.content.clone(),
            children,
            order: slot.order,
            is_target: slot.is_target,
            global_order_path: Vec::new(),
        })
    }

    /// Take over a pulled subtree, restoring target flags of matched blocks
    fn adopt(&self, mut node: TreeNode, emitted: &mut HashSet<String>) -> Option<TreeNode> {
        if !emitted.insert(node.id.clone()) {
            return None;
        }
        node.is_target = self.slots.get(&node.id).is_some_and(|slot| slot.is_target);
        let children = std::mem::take(&mut node.children);
        node.children = children
            .into_iter()
            .filter_map(|child| self.adopt(child, emitted))
            .collect();
        Some(node)
    }
}

/// Build a forest from matched records.
///
/// Never fails: malformed records are skipped and failed pulls degrade to
/// whatever structure the ancestor chains provided.
pub fn build_forest(records: &[BlockRecord], source: &dyn BlockSource) -> Forest {
    let start = Instant::now();

    let mut builder = ForestBuilder::new(source);
    for record in records {
        builder.add_record(record);
    }
    builder.attach_descendants();
    let forest = builder.finish();

    trace_time!(start, "build_forest", records = records.len(), roots = forest.len());
    forest
}
