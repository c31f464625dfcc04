use clap::ValueEnum;

/// Format of status messages and structured results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for machine consumption
    Json,
}

/// Encoding of an exported document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DocumentFormat {
    /// Nested Markdown bullet list
    #[default]
    Markdown,
    /// Plain nested-list HTML for pasting into editors
    Html,
    /// Complete styled XHTML document, suitable as an e-book chapter
    Styled,
    /// The export forest as JSON
    Json,
}

impl DocumentFormat {
    /// File extension for documents in this format
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Markdown => "md",
            DocumentFormat::Html => "html",
            DocumentFormat::Styled => "xhtml",
            DocumentFormat::Json => "json",
        }
    }
}
