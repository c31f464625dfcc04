use std::path::PathBuf;

use clap::Args;

use super::output::DocumentFormat;
use super::parse::{parse_block_spacing, parse_level_indicator, parse_level_spacing, parse_tag};
use blockport_core::render::{BlockSpacing, LevelIndicator, LevelSpacing};

/// Styled HTML overrides shared by document-producing commands
#[derive(Args, Debug, Clone, Default)]
pub struct StyleArgs {
    /// Bottom margin per item: compact, normal, wide
    #[arg(long, value_parser = parse_block_spacing)]
    pub block_spacing: Option<BlockSpacing>,

    /// Top margin on nested lists: none, subtle, marked
    #[arg(long, value_parser = parse_level_spacing)]
    pub level_spacing: Option<LevelSpacing>,

    /// Nesting indicator: indentation, line, numbered
    #[arg(long, value_parser = parse_level_indicator)]
    pub level_indicator: Option<LevelIndicator>,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Tag or page reference to export (`tag`, `#tag`, `[[tag]]`)
    #[arg(long, short, value_parser = parse_tag)]
    pub tag: String,

    /// Only export matches on this page (title or id)
    #[arg(long, short, conflicts_with = "records")]
    pub page: Option<String>,

    /// Document format
    #[arg(long, value_enum, default_value = "markdown")]
    pub to: DocumentFormat,

    /// Output file, or a directory to write a dated file into (stdout if omitted)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Read matched records from a JSON file instead of querying the graph
    #[arg(long)]
    pub records: Option<PathBuf>,

    /// Omit the export header from Markdown output
    #[arg(long)]
    pub no_header: bool,

    #[command(flatten)]
    pub style: StyleArgs,
}

#[derive(Args, Debug, Clone)]
pub struct BranchesArgs {
    /// Block id of a branch to export (repeatable, order is kept)
    #[arg(long = "branch", short, required = true, action = clap::ArgAction::Append)]
    pub branches: Vec<String>,

    /// Keep only branches that reference this tag
    #[arg(long, value_parser = parse_tag)]
    pub filter_tag: Option<String>,

    /// Narrow each branch to the paths reaching tagged blocks
    #[arg(long, requires = "filter_tag")]
    pub paths_only: bool,

    /// Write one file per branch instead of a single document
    #[arg(long)]
    pub split: bool,

    /// Output file, or output directory with --split
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RootsArgs {
    /// Page title or id
    #[arg(long, short)]
    pub page: String,

    /// Keep only children leading to blocks that reference this tag
    #[arg(long, value_parser = parse_tag)]
    pub filter_tag: Option<String>,

    /// Number files from the bottom block up
    #[arg(long)]
    pub invert: bool,

    /// Output directory
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct CopyArgs {
    /// Id of a selected block (repeatable)
    #[arg(long = "select", short, required = true, action = clap::ArgAction::Append)]
    pub selected: Vec<String>,

    /// Emit HTML instead of plain text
    #[arg(long)]
    pub html: bool,
}

#[derive(Args, Debug, Clone)]
pub struct OutlineArgs {
    /// Page title or id
    #[arg(long, short)]
    pub page: String,

    /// Number of levels to show
    #[arg(long, short, default_value_t = 3)]
    pub depth: usize,
}
