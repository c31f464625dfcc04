//! `blockport tags` - favorite tags from the configuration

use crate::cli::OutputFormat;
use crate::commands::dispatch::CommandContext;
use blockport_core::error::Result;

pub fn execute(ctx: &CommandContext) -> Result<()> {
    let tags = &ctx.config.favorite_tags;
    match ctx.cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(tags)?),
        OutputFormat::Human => {
            if tags.is_empty() {
                if ctx.chatty() {
                    println!("No favorite tags configured");
                }
            } else {
                for tag in tags {
                    println!("#{}", tag);
                }
            }
        }
    }
    Ok(())
}
