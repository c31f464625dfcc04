//! `blockport roots` - one file per top-level block of a page

use chrono::Local;
use serde_json::json;

use crate::cli::args::RootsArgs;
use crate::cli::OutputFormat;
use crate::commands::dispatch::CommandContext;
use crate::commands::write::{write_files, OutputFile, Written};
use blockport_core::error::Result;
use blockport_core::export::{export_roots, RootSection};
use blockport_core::naming::{bundle_filename, numbered_filename, root_filename};

/// Numbered files for each section. Inverted numbering counts from the
/// last kept section up.
pub fn section_files(sections: &[RootSection], invert: bool) -> Vec<OutputFile> {
    let total = sections.len();
    sections
        .iter()
        .enumerate()
        .map(|(index, section)| {
            let position = if invert { total - index } else { index + 1 };
            OutputFile::new(
                numbered_filename(position, &root_filename(&section.content)),
                section.to_markdown(),
            )
        })
        .collect()
}

pub fn execute(ctx: &CommandContext, args: &RootsArgs) -> Result<()> {
    let graph = ctx.require_graph()?;
    let sections = export_roots(&graph, &args.page, args.filter_tag.as_deref())?.into_result()?;

    let title = graph
        .resolve_page(&args.page)
        .and_then(|id| graph.pages().into_iter().find(|(page_id, _)| page_id == id))
        .map(|(_, title)| title)
        .unwrap_or_else(|| args.page.clone());

    let files = section_files(&sections, args.invert);
    let bundle = bundle_filename(&title, Local::now().date_naive());
    let written = write_files(
        &ctx.resolve(&args.output),
        &files,
        ctx.config.export.bundle_threshold,
        &bundle,
    )?;

    match ctx.cli.format {
        OutputFormat::Json => {
            let status = json!({
                "page": title,
                "sections": sections.len(),
                "bundled": matches!(written, Written::Bundle { .. }),
                "paths": written.paths().iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Human if ctx.chatty() => match &written {
            Written::Bundle { path, entries } => {
                println!("Bundled {} root blocks of {} into {}", entries, title, path.display())
            }
            Written::Files(paths) => {
                for path in paths {
                    println!("Wrote {}", path.display());
                }
            }
        },
        OutputFormat::Human => {}
    }
    Ok(())
}
