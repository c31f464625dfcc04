//! `blockport branches` - manually selected branches

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use serde_json::json;
use tracing::warn;

use crate::cli::args::BranchesArgs;
use crate::cli::OutputFormat;
use crate::commands::dispatch::CommandContext;
use crate::commands::write::{write_document, write_files, OutputFile, Written};
use blockport_core::error::Result;
use blockport_core::export::{export_branches, BranchExport, BranchOptions};
use blockport_core::model::TreeNode;
use blockport_core::naming::{branch_header, bundle_filename, numbered_filename, root_filename};
use blockport_core::render::render_markdown;
use blockport_core::source::{BlockSource, MemorySource};

/// Title of a merged export
const MERGED_TITLE: &str = "Selected branches";

pub fn execute(ctx: &CommandContext, args: &BranchesArgs) -> Result<()> {
    let graph = ctx.require_graph()?;
    let options = BranchOptions {
        filter: args.filter_tag.as_deref(),
        paths_only: args.paths_only,
    };
    let export = export_branches(&graph, &args.branches, options)?.into_result()?;
    for id in &export.skipped {
        warn!(id = %id, "branch not exported");
    }

    let now = Local::now().naive_local();
    let filter = args.filter_tag.as_deref();

    if args.split {
        let files = split_files(&export.branches, now, filter);
        let dir = ctx.resolve(args.output.as_deref().unwrap_or(ctx.cwd));
        let page = page_title(&graph, &args.branches).unwrap_or_else(|| "branches".to_string());
        let bundle = bundle_filename(&page, now.date());
        let written = write_files(&dir, &files, ctx.config.export.bundle_threshold, &bundle)?;
        report(ctx, &export, written.paths(), Some(&written))
    } else {
        let title = match export.branches.as_slice() {
            [only] => only.content.clone(),
            _ => MERGED_TITLE.to_string(),
        };
        let document = format!(
            "{}{}",
            branch_header(&title, now, filter),
            render_markdown(&export.forest)
        );
        let output = args.output.as_deref().map(|path| ctx.resolve(path));
        write_document(output.as_deref(), &document)?;
        match output {
            Some(path) => report(ctx, &export, vec![path], None),
            None => Ok(()),
        }
    }
}

/// One numbered document per branch, in selection order
pub fn split_files(
    branches: &[TreeNode],
    generated: NaiveDateTime,
    filter: Option<&str>,
) -> Vec<OutputFile> {
    branches
        .iter()
        .enumerate()
        .map(|(index, branch)| {
            let name = numbered_filename(index + 1, &root_filename(&branch.content));
            let content = format!(
                "{}{}",
                branch_header(&branch.content, generated, filter),
                render_markdown(std::slice::from_ref(branch))
            );
            OutputFile::new(name, content)
        })
        .collect()
}

/// Title of the page holding the first selected branch
fn page_title(graph: &MemorySource, ids: &[String]) -> Option<String> {
    let first = ids.first()?;
    let record = graph.fetch_record(first).ok()??;
    let page_id = record.ancestors.first()?.id.clone();
    graph
        .pages()
        .into_iter()
        .find(|(id, _)| *id == page_id)
        .map(|(_, title)| title)
}

fn report(
    ctx: &CommandContext,
    export: &BranchExport,
    paths: Vec<PathBuf>,
    written: Option<&Written>,
) -> Result<()> {
    match ctx.cli.format {
        OutputFormat::Json => {
            let status = json!({
                "branches": export.branches.len(),
                "skipped": export.skipped,
                "bundled": matches!(written, Some(Written::Bundle { .. })),
                "paths": paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Human => {
            if !ctx.chatty() {
                return Ok(());
            }
            match written {
                Some(Written::Bundle { path, entries }) => {
                    println!("Bundled {} branches into {}", entries, path.display())
                }
                _ => {
                    for path in &paths {
                        println!("Wrote {}", path.display());
                    }
                }
            }
            if !export.skipped.is_empty() {
                println!("Skipped: {}", export.skipped.join(", "));
            }
        }
    }
    Ok(())
}
