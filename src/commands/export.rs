//! `blockport export` - everything that references a tag

use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::json;
use tracing::debug;

use crate::cli::args::{ExportArgs, StyleArgs};
use crate::cli::{DocumentFormat, OutputFormat};
use crate::commands::dispatch::command::missing_graph;
use crate::commands::dispatch::CommandContext;
use crate::commands::write::write_document;
use blockport_core::error::Result;
use blockport_core::export::{
    export_by_filter, export_page_by_filter, export_records, FilterExport,
};
use blockport_core::naming::{export_filename, export_header};
use blockport_core::records::load_records;
use blockport_core::render::{
    render_html, render_json, render_markdown, render_styled_document, StyleOptions,
};
use blockport_core::source::{BlockSource, DetachedSource};

/// Config style with command-line overrides applied
pub fn effective_style(base: StyleOptions, args: &StyleArgs) -> StyleOptions {
    StyleOptions {
        block_spacing: args.block_spacing.unwrap_or(base.block_spacing),
        level_spacing: args.level_spacing.unwrap_or(base.level_spacing),
        level_indicator: args.level_indicator.unwrap_or(base.level_indicator),
    }
}

pub fn execute(ctx: &CommandContext, args: &ExportArgs) -> Result<()> {
    let graph = ctx.graph_source()?;

    let outcome = match &args.records {
        Some(path) => {
            let parsed = load_records(&ctx.resolve(path))?;
            debug!(records = parsed.records.len(), skipped = parsed.skipped, "loaded records file");
            // Without a graph, subtrees below matches cannot be pulled
            let source: &dyn BlockSource = match &graph {
                Some(graph) => graph,
                None => &DetachedSource,
            };
            export_records(&args.tag, &parsed.records, source)
        }
        None => {
            let graph = graph.as_ref().ok_or_else(missing_graph)?;
            match &args.page {
                Some(page) => export_page_by_filter(graph, page, &args.tag)?,
                None => export_by_filter(graph, &args.tag)?,
            }
        }
    };
    let export = outcome.into_result()?;

    let document = render_document(ctx, args, &export)?;
    let output = args.output.as_ref().map(|path| output_path(ctx, args, path));
    write_document(output.as_deref(), &document)?;

    report(ctx, &export, output)
}

fn render_document(ctx: &CommandContext, args: &ExportArgs, export: &FilterExport) -> Result<String> {
    let document = match args.to {
        DocumentFormat::Markdown => {
            let body = render_markdown(&export.forest);
            if args.no_header || !ctx.config.export.header {
                body
            } else {
                let now = Local::now().naive_local();
                format!("{}{}", export_header(&export.tag, now, export.matched), body)
            }
        }
        DocumentFormat::Html => render_html(&export.forest, ctx.config.export.inline_markup),
        DocumentFormat::Styled => {
            let style = effective_style(ctx.config.style, &args.style);
            render_styled_document(&format!("#{}", export.tag), &export.forest, &style)
        }
        DocumentFormat::Json => render_json(&export.forest)?,
    };
    Ok(document)
}

/// An existing directory receives a dated file named after the tag
fn output_path(ctx: &CommandContext, args: &ExportArgs, path: &Path) -> PathBuf {
    let resolved = ctx.resolve(path);
    if resolved.is_dir() {
        let name = export_filename(&args.tag, Local::now().date_naive());
        resolved.join(name).with_extension(args.to.extension())
    } else {
        resolved
    }
}

fn report(ctx: &CommandContext, export: &FilterExport, output: Option<PathBuf>) -> Result<()> {
    // A document on stdout is the whole answer
    let Some(path) = output else {
        return Ok(());
    };

    match ctx.cli.format {
        OutputFormat::Json => {
            let status = json!({
                "tag": export.tag,
                "matched": export.matched,
                "roots": export.forest.len(),
                "path": path.display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Human => {
            if ctx.chatty() {
                println!(
                    "Exported {} blocks tagged #{} to {}",
                    export.matched,
                    export.tag,
                    path.display()
                );
            }
        }
    }
    Ok(())
}
