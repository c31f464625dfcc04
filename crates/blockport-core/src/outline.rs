//! Page structure preview
//!
//! Shows the top levels of a page so branches can be picked for export.
//! Branches cut off at the depth limit report how many blocks they hide.

use serde::Serialize;

use crate::cache::{ExportCache, QueryShape};
use crate::error::Result;
use crate::source::BlockSource;

/// Preview length before content is shortened with an ellipsis
const PREVIEW_MAX: usize = 60;

/// One block of a page preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub id: String,
    pub content: String,
    /// 1 for top-level blocks
    pub level: usize,
    /// Descendants not shown because of the depth limit
    pub hidden_descendants: usize,
    pub children: Vec<OutlineEntry>,
}

/// Shorten content to at most 60 characters
pub fn preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_MAX {
        let cut: String = content.chars().take(PREVIEW_MAX - 3).collect();
        format!("{}...", cut)
    } else {
        content.to_string()
    }
}

fn outline_level(
    ids: Vec<String>,
    level: usize,
    max_depth: usize,
    cache: &mut ExportCache,
    source: &dyn BlockSource,
) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    for id in ids {
        let Some(block) = cache.block_info(source, &id, QueryShape::ContentWithChildren) else {
            continue;
        };
        let child_ids: Vec<String> = block.sorted_children().into_iter().map(|c| c.id).collect();

        let (children, hidden_descendants) = if level < max_depth {
            (outline_level(child_ids, level + 1, max_depth, cache, source), 0)
        } else if child_ids.is_empty() {
            (Vec::new(), 0)
        } else {
            (Vec::new(), cache.descendant_ids(source, &id).len())
        };

        entries.push(OutlineEntry {
            id,
            content: block.content,
            level,
            hidden_descendants,
            children,
        });
    }
    entries
}

/// Outline of a page down to `max_depth` levels (at least one)
pub fn page_outline(
    source: &dyn BlockSource,
    page: &str,
    max_depth: usize,
    cache: &mut ExportCache,
) -> Result<Vec<OutlineEntry>> {
    let roots: Vec<String> = source.page_blocks(page)?.into_iter().map(|c| c.id).collect();
    Ok(outline_level(roots, 1, max_depth.max(1), cache, source))
}

fn push_lines(entries: &[OutlineEntry], lines: &mut Vec<String>) {
    for entry in entries {
        let mut line = format!(
            "{}- {}",
            "  ".repeat(entry.level.saturating_sub(1)),
            preview(&entry.content)
        );
        if entry.hidden_descendants > 0 {
            line.push_str(&format!(" (+{} sub-blocks)", entry.hidden_descendants));
        }
        lines.push(line);
        push_lines(&entry.children, lines);
    }
}

/// Text rendering of an outline, one line per block
pub fn render_outline(entries: &[OutlineEntry]) -> String {
    let mut lines = Vec::new();
    push_lines(entries, &mut lines);
    lines.join("\n")
}
