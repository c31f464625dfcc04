//! `blockport outline` - page structure preview

use crate::cli::args::OutlineArgs;
use crate::cli::OutputFormat;
use crate::commands::dispatch::CommandContext;
use blockport_core::cache::ExportCache;
use blockport_core::error::Result;
use blockport_core::outline::{page_outline, render_outline};
use blockport_core::log_resource_metrics;

pub fn execute(ctx: &CommandContext, args: &OutlineArgs) -> Result<()> {
    let graph = ctx.require_graph()?;
    let mut cache = ExportCache::new();
    let entries = page_outline(&graph, &args.page, args.depth, &mut cache)?;
    log_resource_metrics!(cache.metrics(), "outline");

    match ctx.cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Human => {
            if entries.is_empty() {
                if ctx.chatty() {
                    println!("Page {} has no blocks", args.page);
                }
            } else {
                println!("{}", render_outline(&entries));
            }
        }
    }
    Ok(())
}
