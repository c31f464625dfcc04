//! `blockport copy` - visual selection as text or HTML

use crate::cli::args::CopyArgs;
use crate::cli::OutputFormat;
use crate::commands::dispatch::CommandContext;
use crate::commands::write::write_document;
use blockport_core::error::Result;
use blockport_core::export::copy_selection;
use blockport_core::render::{render_html, render_json, render_markdown};

pub fn execute(ctx: &CommandContext, args: &CopyArgs) -> Result<()> {
    let graph = ctx.require_graph()?;
    let forest = copy_selection(&graph, &args.selected).into_result()?;

    let content = match (ctx.cli.format, args.html) {
        (OutputFormat::Json, _) => render_json(&forest)?,
        (OutputFormat::Human, true) => render_html(&forest, ctx.config.export.inline_markup),
        (OutputFormat::Human, false) => render_markdown(&forest),
    };
    write_document(None, &content)
}
