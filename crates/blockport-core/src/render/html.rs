use std::sync::OnceLock;

use regex::Regex;

use crate::model::TreeNode;

/// Outliner inline markup and its HTML replacement
static INLINE_MARKUP: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

fn inline_markup() -> &'static [(Regex, &'static str)] {
    INLINE_MARKUP.get_or_init(|| {
        [
            (r"\*\*(.*?)\*\*", "<b>$1</b>"),
            (r"__(.*?)__", "<i>$1</i>"),
            (r"\^\^(.*?)\^\^", "<mark>$1</mark>"),
        ]
        .into_iter()
        .filter_map(|(pattern, replacement)| {
            Regex::new(pattern).ok().map(|re| (re, replacement))
        })
        .collect()
    })
}

/// Replace bold, italic and highlight markup with HTML tags
pub fn apply_inline_markup(content: &str) -> String {
    let mut text = content.to_string();
    for (pattern, replacement) in inline_markup() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    text
}

fn push_list(nodes: &[TreeNode], inline: bool, out: &mut String) {
    if nodes.is_empty() {
        return;
    }
    out.push_str("<ul>");
    for node in nodes {
        out.push_str("<li>");
        if inline {
            out.push_str(&apply_inline_markup(&node.content));
        } else {
            out.push_str(&node.content);
        }
        push_list(&node.children, inline, out);
        out.push_str("</li>");
    }
    out.push_str("</ul>");
}

/// Render a forest as nested `<ul><li>` lists for pasting into an editor.
///
/// Content is not escaped. With `inline_markup`, `**x**`, `__x__` and
/// `^^x^^` become `<b>`, `<i>` and `<mark>`.
pub fn render_html(forest: &[TreeNode], inline_markup: bool) -> String {
    let mut out = String::new();
    push_list(forest, inline_markup, &mut out);
    out
}
