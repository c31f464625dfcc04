//! Export pipelines
//!
//! Each pipeline owns one [`ExportCache`] for its whole run: collaborator
//! queries feed the forest builder, roots are ordered, the pruner narrows
//! where requested, and the caller renders the result. Cache statistics are
//! logged when the pipeline finishes.
//!
//! An empty result is reported as [`ExportOutcome::NothingToExport`] and an
//! unreachable host as [`ExportOutcome::Unavailable`]; neither is an error.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::ExportCache;
use crate::error::{BlockportError, Result};
use crate::forest::build_forest;
use crate::model::{is_blank, BlockRecord, Forest, TreeNode};
use crate::order::{assign_and_sort_roots, sort_records};
use crate::prune::{prune, prune_forest, TargetSet};
use crate::render::render_markdown;
use crate::selection::selection_forest;
use crate::source::BlockSource;
use crate::{log_resource_metrics, trace_time};

/// Result of an export pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome<T> {
    Exported(T),
    /// The pipeline ran but nothing matched
    NothingToExport { reason: String },
    /// The host could not answer
    Unavailable { reason: String },
}

impl<T> ExportOutcome<T> {
    fn nothing(reason: impl Into<String>) -> Self {
        ExportOutcome::NothingToExport {
            reason: reason.into(),
        }
    }

    /// Convert into a `Result`, for callers that report outcomes as errors
    pub fn into_result(self) -> Result<T> {
        match self {
            ExportOutcome::Exported(value) => Ok(value),
            ExportOutcome::NothingToExport { reason } => {
                Err(BlockportError::nothing_to_export(reason))
            }
            ExportOutcome::Unavailable { reason } => Err(BlockportError::source_unavailable(reason)),
        }
    }

    pub fn is_exported(&self) -> bool {
        matches!(self, ExportOutcome::Exported(_))
    }
}

/// Turn an unavailable host into an outcome; other errors propagate
fn unavailable<T>(err: BlockportError) -> Result<ExportOutcome<T>> {
    match err {
        BlockportError::SourceUnavailable { reason } => {
            warn!(%reason, "block source unavailable");
            Ok(ExportOutcome::Unavailable { reason })
        }
        other => Err(other),
    }
}

/// A filter export ready to render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterExport {
    pub tag: String,
    /// Number of records the filter matched
    pub matched: usize,
    pub forest: Forest,
}

/// Build and order a forest from already-fetched records
pub fn forest_from_records(records: &[BlockRecord], source: &dyn BlockSource) -> Forest {
    let mut forest = build_forest(records, source);
    assign_and_sort_roots(&mut forest, records);
    forest
}

/// Export every block that references `tag`, with ancestors for context
/// and full subtrees below each match
pub fn export_by_filter(source: &dyn BlockSource, tag: &str) -> Result<ExportOutcome<FilterExport>> {
    let records = match source.query_by_filter(tag) {
        Ok(records) => records,
        Err(e) => return unavailable(e),
    };
    Ok(export_records(tag, &records, source))
}

/// Like [`export_by_filter`], limited to blocks on one page
pub fn export_page_by_filter(
    source: &dyn BlockSource,
    page: &str,
    tag: &str,
) -> Result<ExportOutcome<FilterExport>> {
    let records = match source.query_by_filter_in(page, tag) {
        Ok(records) => records,
        Err(e) => return unavailable(e),
    };
    if records.is_empty() {
        return Ok(ExportOutcome::nothing(format!(
            "no blocks found with #{} on {}",
            tag, page
        )));
    }
    Ok(export_records(tag, &records, source))
}

/// Export records obtained elsewhere, labelled with `tag`
pub fn export_records(
    tag: &str,
    records: &[BlockRecord],
    source: &dyn BlockSource,
) -> ExportOutcome<FilterExport> {
    if records.is_empty() {
        return ExportOutcome::nothing(format!("no blocks found with #{}", tag));
    }

    let forest = forest_from_records(records, source);
    if forest.is_empty() {
        return ExportOutcome::nothing(format!("could not build an export tree for #{}", tag));
    }

    info!(tag, matched = records.len(), roots = forest.len(), "filter export built");
    ExportOutcome::Exported(FilterExport {
        tag: tag.to_string(),
        matched: records.len(),
        forest,
    })
}

/// Options for a manual branch export
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchOptions<'a> {
    /// Keep only branches that reference this tag somewhere in their subtree
    pub filter: Option<&'a str>,
    /// With a filter, narrow each branch to the paths reaching tagged blocks
    pub paths_only: bool,
}

/// Selected branches, merged and individually
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchExport {
    /// All branches in one forest, with their ancestors as context
    pub forest: Forest,
    /// Each kept branch on its own, in document order
    pub branches: Forest,
    /// Requested ids that were unknown or filtered out
    pub skipped: Vec<String>,
}

fn branch_tree(source: &dyn BlockSource, record: &BlockRecord) -> TreeNode {
    match source.fetch_subtree(&record.id) {
        Ok(Some(mut tree)) => {
            tree.order = record.order;
            tree.is_target = true;
            tree
        }
        Ok(None) => TreeNode::target(record.id.clone(), record.content.clone(), record.order),
        Err(e) => {
            warn!(id = %record.id, error = %e, "branch pull failed, exporting the block alone");
            TreeNode::target(record.id.clone(), record.content.clone(), record.order)
        }
    }
}

/// Export manually selected branches
pub fn export_branches(
    source: &dyn BlockSource,
    ids: &[String],
    options: BranchOptions<'_>,
) -> Result<ExportOutcome<BranchExport>> {
    let start = Instant::now();
    let mut cache = ExportCache::new();
    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for id in ids {
        let record = match source.fetch_record(id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!(id = %id, "selected branch not found");
                skipped.push(id.clone());
                continue;
            }
            Err(e) => {
                warn!(id = %id, error = %e, "failed to fetch branch");
                skipped.push(id.clone());
                continue;
            }
        };

        if let Some(tag) = options.filter {
            match source.subtree_matches(id, tag) {
                Ok(true) => {}
                Ok(false) => {
                    debug!(id = %id, tag, "branch does not reference filter tag");
                    skipped.push(id.clone());
                    continue;
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "filter check failed, skipping branch");
                    skipped.push(id.clone());
                    continue;
                }
            }
        }
        records.push(record);
    }

    if records.is_empty() {
        let reason = match options.filter {
            Some(tag) => format!("no selected branch references #{}", tag),
            None => "none of the selected branches were found".to_string(),
        };
        return Ok(ExportOutcome::nothing(reason));
    }

    sort_records(&mut records);
    let mut forest = forest_from_records(&records, source);
    let mut branches: Forest = records.iter().map(|r| branch_tree(source, r)).collect();

    if let (true, Some(tag)) = (options.paths_only, options.filter) {
        let matches = match source.query_by_filter(tag) {
            Ok(matches) => matches,
            Err(e) => return unavailable(e),
        };
        let targets = TargetSet::from_ids(matches.into_iter().map(|r| r.id));
        forest = prune_forest(&forest, &targets, &mut cache, source);
        branches = branches
            .iter()
            .map(|branch| prune(branch, &targets, &mut cache, source))
            .collect();
    }

    log_resource_metrics!(cache.metrics(), "export_branches");
    trace_time!(start, "export_branches", branches = branches.len());
    Ok(ExportOutcome::Exported(BranchExport {
        forest,
        branches,
        skipped,
    }))
}

/// One top-level block of a page and its exported children
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootSection {
    pub id: String,
    pub content: String,
    pub children: Forest,
}

impl RootSection {
    /// `# <content>` followed by the children as a bullet list
    pub fn to_markdown(&self) -> String {
        let mut markdown = format!("# {}\n\n", self.content);
        markdown.push_str(&render_markdown(&self.children));
        markdown
    }
}

/// Export each top-level block of a page as its own section.
///
/// With a filter, only children leading to tagged blocks are kept and roots
/// left without children are dropped.
pub fn export_roots(
    source: &dyn BlockSource,
    page: &str,
    filter: Option<&str>,
) -> Result<ExportOutcome<Vec<RootSection>>> {
    let start = Instant::now();
    let mut cache = ExportCache::new();

    let roots = match source.page_blocks(page) {
        Ok(roots) => roots,
        Err(e) => return unavailable(e),
    };
    if roots.is_empty() {
        return Ok(ExportOutcome::nothing(format!("page {} has no blocks", page)));
    }

    let targets = match filter {
        Some(tag) => match source.query_by_filter(tag) {
            Ok(matches) => Some(TargetSet::from_ids(matches.into_iter().map(|r| r.id))),
            Err(e) => return unavailable(e),
        },
        None => None,
    };

    let mut sections = Vec::new();
    for root in &roots {
        let tree = match source.fetch_subtree(&root.id) {
            Ok(Some(tree)) => tree,
            Ok(None) => continue,
            Err(e) => {
                warn!(id = %root.id, error = %e, "failed to pull root block");
                continue;
            }
        };
        if is_blank(&tree.content) {
            debug!(id = %root.id, "skipping blank root block");
            continue;
        }

        let children = match &targets {
            Some(targets) => prune_forest(&tree.children, targets, &mut cache, source),
            None => tree.children,
        };
        if targets.is_some() && children.is_empty() {
            debug!(id = %root.id, "no tagged blocks under root");
            continue;
        }

        sections.push(RootSection {
            id: tree.id,
            content: tree.content,
            children,
        });
    }

    log_resource_metrics!(cache.metrics(), "export_roots");
    trace_time!(start, "export_roots", sections = sections.len());

    if sections.is_empty() {
        let reason = match filter {
            Some(tag) => format!("no root block of {} contains #{}", page, tag),
            None => format!("page {} has no named root blocks", page),
        };
        return Ok(ExportOutcome::nothing(reason));
    }
    Ok(ExportOutcome::Exported(sections))
}

/// Forest for a visual selection copy
pub fn copy_selection(source: &dyn BlockSource, selected: &[String]) -> ExportOutcome<Forest> {
    if selected.is_empty() {
        return ExportOutcome::nothing("no blocks selected");
    }

    let start = Instant::now();
    let mut cache = ExportCache::new();
    let forest = selection_forest(selected, &mut cache, source);
    log_resource_metrics!(cache.metrics(), "copy_selection");
    trace_time!(start, "copy_selection", roots = forest.len());

    if forest.is_empty() {
        return ExportOutcome::nothing("none of the selected blocks were found");
    }
    ExportOutcome::Exported(forest)
}
