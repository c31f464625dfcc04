//! Styled HTML for generated documents such as e-book chapters
//!
//! Unlike [`super::render_html`], content is escaped because the output is
//! embedded in a standalone document rather than pasted into an editor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BlockportError;
use crate::model::TreeNode;

/// Bottom margin after each item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockSpacing {
    Compact,
    #[default]
    Normal,
    Wide,
}

impl BlockSpacing {
    pub fn margin(self) -> &'static str {
        match self {
            BlockSpacing::Compact => "0.15em",
            BlockSpacing::Normal => "0.4em",
            BlockSpacing::Wide => "0.9em",
        }
    }
}

/// Top margin on a nested list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelSpacing {
    None,
    #[default]
    Subtle,
    Marked,
}

impl LevelSpacing {
    pub fn margin(self) -> &'static str {
        match self {
            LevelSpacing::None => "0",
            LevelSpacing::Subtle => "0.25em",
            LevelSpacing::Marked => "0.75em",
        }
    }
}

/// How nesting depth is made visible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelIndicator {
    #[default]
    Indentation,
    Line,
    Numbered,
}

impl LevelIndicator {
    fn list_tag(self) -> &'static str {
        match self {
            LevelIndicator::Numbered => "ol",
            LevelIndicator::Indentation | LevelIndicator::Line => "ul",
        }
    }

    fn list_style(self) -> &'static str {
        match self {
            LevelIndicator::Indentation => "list-style: none; padding-left: 1.5em;",
            LevelIndicator::Line => {
                "list-style: none; padding-left: 1em; border-left: 2px solid #ccc;"
            }
            LevelIndicator::Numbered => "list-style: decimal; padding-left: 1.5em;",
        }
    }
}

macro_rules! style_names {
    ($ty:ident, $context:literal, $($variant:ident => $name:literal),+) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = BlockportError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(BlockportError::invalid_value($context, other)),
                }
            }
        }
    };
}

style_names!(BlockSpacing, "block spacing", Compact => "compact", Normal => "normal", Wide => "wide");
style_names!(LevelSpacing, "level spacing", None => "none", Subtle => "subtle", Marked => "marked");
style_names!(
    LevelIndicator,
    "level indicator",
    Indentation => "indentation",
    Line => "line",
    Numbered => "numbered"
);

/// Visual parameters of the styled renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    pub block_spacing: BlockSpacing,
    pub level_spacing: LevelSpacing,
    pub level_indicator: LevelIndicator,
}

/// Escape the characters that are significant in HTML text and attributes
pub fn escape_html(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn push_list(nodes: &[TreeNode], style: &StyleOptions, depth: usize, out: &mut String) {
    if nodes.is_empty() {
        return;
    }

    let tag = style.level_indicator.list_tag();
    let mut list_style = style.level_indicator.list_style().to_string();
    if depth > 0 {
        list_style.push_str(&format!(" margin-top: {};", style.level_spacing.margin()));
    }

    out.push_str(&format!("<{} style=\"{}\">", tag, list_style));
    for node in nodes {
        out.push_str(&format!(
            "<li style=\"margin-bottom: {};\">",
            style.block_spacing.margin()
        ));
        out.push_str(&escape_html(&node.content));
        push_list(&node.children, style, depth + 1, out);
        out.push_str("</li>");
    }
    out.push_str(&format!("</{}>", tag));
}

/// Render a forest as styled, escaped nested lists
pub fn render_styled_html(forest: &[TreeNode], style: &StyleOptions) -> String {
    let mut out = String::new();
    push_list(forest, style, 0, &mut out);
    out
}

/// Wrap the styled fragment in a complete XHTML document
pub fn render_styled_document(title: &str, forest: &[TreeNode], style: &StyleOptions) -> String {
    let title = escape_html(title);
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE html>\n\
         <html xmlns=\"http://www.w3.org/1999/xhtml\">\n\
         <head>\n\
         <meta charset=\"UTF-8\" />\n\
         <title>{title}</title>\n\
         </head>\n\
         <body>\n\
         <h1>{title}</h1>\n\
         {body}\n\
         </body>\n\
         </html>\n",
        title = title,
        body = render_styled_html(forest, style),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest() -> Vec<TreeNode> {
        vec![TreeNode::new("p", "Tom & \"Jerry\"", 0)
            .with_children(vec![TreeNode::new("c", "<child>", 0)])]
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"a < b && "c" > d"#),
            "a &lt; b &amp;&amp; &quot;c&quot; &gt; d"
        );
    }

    #[test]
    fn test_default_style() {
        let html = render_styled_html(&forest(), &StyleOptions::default());
        assert_eq!(
            html,
            "<ul style=\"list-style: none; padding-left: 1.5em;\">\
             <li style=\"margin-bottom: 0.4em;\">Tom &amp; &quot;Jerry&quot;\
             <ul style=\"list-style: none; padding-left: 1.5em; margin-top: 0.25em;\">\
             <li style=\"margin-bottom: 0.4em;\">&lt;child&gt;</li></ul></li></ul>"
        );
    }

    #[test]
    fn test_numbered_and_line_indicators() {
        let numbered = StyleOptions {
            level_indicator: LevelIndicator::Numbered,
            ..StyleOptions::default()
        };
        let html = render_styled_html(&forest(), &numbered);
        assert!(html.starts_with("<ol style=\"list-style: decimal;"));
        assert!(html.ends_with("</ol></li></ol>"));
        assert!(!html.contains("<ul"));

        let line = StyleOptions {
            level_indicator: LevelIndicator::Line,
            ..StyleOptions::default()
        };
        assert!(render_styled_html(&forest(), &line).contains("border-left: 2px solid #ccc;"));
    }

    #[test]
    fn test_spacing_parameters() {
        let style = StyleOptions {
            block_spacing: BlockSpacing::Wide,
            level_spacing: LevelSpacing::Marked,
            level_indicator: LevelIndicator::Indentation,
        };
        let html = render_styled_html(&forest(), &style);
        assert!(html.contains("margin-bottom: 0.9em;"));
        assert!(html.contains("margin-top: 0.75em;"));

        let compact = StyleOptions {
            block_spacing: BlockSpacing::Compact,
            level_spacing: LevelSpacing::None,
            ..StyleOptions::default()
        };
        let html = render_styled_html(&forest(), &compact);
        assert!(html.contains("margin-bottom: 0.15em;"));
        assert!(html.contains("margin-top: 0;"));
    }

    #[test]
    fn test_parse_style_names() {
        assert_eq!("Wide".parse::<BlockSpacing>().unwrap(), BlockSpacing::Wide);
        assert_eq!("none".parse::<LevelSpacing>().unwrap(), LevelSpacing::None);
        assert_eq!(
            " numbered ".parse::<LevelIndicator>().unwrap(),
            LevelIndicator::Numbered
        );
        assert!(matches!(
            "dotted".parse::<LevelIndicator>(),
            Err(BlockportError::InvalidValue { .. })
        ));
        assert_eq!(LevelSpacing::Marked.to_string(), "marked");
    }

    #[test]
    fn test_style_from_toml() {
        let style: StyleOptions = toml::from_str("level_indicator = \"line\"").unwrap();
        assert_eq!(style.level_indicator, LevelIndicator::Line);
        assert_eq!(style.block_spacing, BlockSpacing::Normal);
    }

    #[test]
    fn test_document_wraps_fragment() {
        let doc = render_styled_document("Notes <1>", &forest(), &StyleOptions::default());
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(doc.contains("<title>Notes &lt;1&gt;</title>"));
        assert!(doc.contains("<li style=\"margin-bottom: 0.4em;\">&lt;child&gt;</li>"));
        assert!(doc.trim_end().ends_with("</html>"));
    }
}
