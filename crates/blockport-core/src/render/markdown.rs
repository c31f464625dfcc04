use crate::model::TreeNode;

const INDENT: &str = "  ";

fn push_lines(nodes: &[TreeNode], depth: usize, lines: &mut Vec<String>) {
    for node in nodes {
        lines.push(format!("{}- {}", INDENT.repeat(depth), node.content));
        push_lines(&node.children, depth + 1, lines);
    }
}

/// Render a forest as a nested Markdown bullet list.
///
/// Two spaces of indentation per level, content verbatim, lines joined
/// with `\n` and no trailing newline.
pub fn render_markdown(forest: &[TreeNode]) -> String {
    let mut lines = Vec::new();
    push_lines(forest, 0, &mut lines);
    lines.join("\n")
}
