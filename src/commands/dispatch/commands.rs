//! Routing from parsed subcommands to their handlers

use crate::cli::Commands;
use crate::commands::dispatch::command::{Command, CommandContext};
use crate::commands::{branches, copy, export, outline, roots, tags};
use blockport_core::error::Result;

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Commands::Export(args) => export::execute(ctx, args),
            Commands::Branches(args) => branches::execute(ctx, args),
            Commands::Roots(args) => roots::execute(ctx, args),
            Commands::Copy(args) => copy::execute(ctx, args),
            Commands::Outline(args) => outline::execute(ctx, args),
            Commands::Tags => tags::execute(ctx),
        }
    }
}
