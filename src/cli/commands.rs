//! Top-level blockport commands

use clap::Subcommand;

use super::args::{BranchesArgs, CopyArgs, ExportArgs, OutlineArgs, RootsArgs};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export every block that references a tag
    Export(ExportArgs),

    /// Export manually selected branches
    Branches(BranchesArgs),

    /// Export each top-level block of a page as its own file
    Roots(RootsArgs),

    /// Copy selected blocks as text or HTML
    Copy(CopyArgs),

    /// Preview the structure of a page
    Outline(OutlineArgs),

    /// List favorite tags from the configuration
    Tags,
}
