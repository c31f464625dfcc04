//! CLI argument parsing for blockport
//!
//! Global flags: --graph, --config, --format, --quiet, --verbose,
//! --log-level, --log-json

pub mod args;
pub mod commands;
pub mod output;
pub mod parse;

use std::path::PathBuf;

use clap::Parser;

pub use commands::Commands;
pub use output::{DocumentFormat, OutputFormat};

/// Blockport - export outliner branches to Markdown, HTML and e-book HTML
#[derive(Parser, Debug)]
#[command(name = "blockport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Block graph JSON file
    #[arg(long, short, global = true, env = "BLOCKPORT_GRAPH")]
    pub graph: Option<PathBuf>,

    /// Configuration file (default: ./blockport.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directive (e.g. debug, blockport=trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
