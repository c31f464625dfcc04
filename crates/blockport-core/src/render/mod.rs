//! Forest renderers
//!
//! Every renderer is a pure function of the forest (and its options); none
//! of them mutates the input.

pub mod html;
pub mod markdown;
pub mod styled;

pub use html::render_html;
pub use markdown::render_markdown;
pub use styled::{
    render_styled_document, render_styled_html, BlockSpacing, LevelIndicator, LevelSpacing,
    StyleOptions,
};

use crate::error::Result;
use crate::model::TreeNode;

/// The forest as pretty-printed JSON
pub fn render_json(forest: &[TreeNode]) -> Result<String> {
    Ok(serde_json::to_string_pretty(forest)?)
}
