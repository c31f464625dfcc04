//! Command trait and context for dispatching commands

use std::path::Path;
use std::time::Instant;

use tracing::debug;

use crate::cli::Cli;
use blockport_core::config::ExportConfig;
use blockport_core::error::{BlockportError, Result};
use blockport_core::source::MemorySource;

/// Error for commands run without `--graph`
pub fn missing_graph() -> BlockportError {
    BlockportError::UsageError(
        "no block graph given (use --graph or set BLOCKPORT_GRAPH)".to_string(),
    )
}

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub cwd: &'a Path,
    pub config: ExportConfig,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, cwd: &'a Path, config: ExportConfig, start: Instant) -> Self {
        Self {
            cli,
            cwd,
            config,
            start,
        }
    }

    /// Graph given with `--graph` or `BLOCKPORT_GRAPH`, if any
    pub fn graph_source(&self) -> Result<Option<MemorySource>> {
        let Some(path) = &self.cli.graph else {
            return Ok(None);
        };
        let resolved = if path.is_absolute() {
            path.clone()
        } else {
            self.cwd.join(path)
        };
        let source = MemorySource::load(&resolved)?;
        debug!(elapsed = ?self.start.elapsed(), path = %resolved.display(), "load_graph");
        Ok(Some(source))
    }

    /// The block graph; commands that query blocks cannot run without one
    pub fn require_graph(&self) -> Result<MemorySource> {
        self.graph_source()?.ok_or_else(missing_graph)
    }

    /// Resolve a path relative to the working directory
    pub fn resolve(&self, path: &Path) -> std::path::PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Whether human-readable status lines should be printed
    pub fn chatty(&self) -> bool {
        !self.cli.quiet
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        println!("blockport {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Export outliner branches to Markdown, HTML and e-book HTML.");
        println!();
        println!("Run `blockport --help` for usage information.");
        Ok(())
    }
}
