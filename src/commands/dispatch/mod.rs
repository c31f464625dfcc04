//! Command dispatch logic for blockport

use std::env;
use std::time::Instant;

use tracing::debug;

use crate::cli::Cli;
use blockport_core::config::ExportConfig;
use blockport_core::error::{BlockportError, Result};

pub mod command;
mod commands;

pub use command::CommandContext;
use command::{Command, NoCommand};

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let cwd = env::current_dir()
        .map_err(|e| BlockportError::failed_operation("read working directory", e))?;

    let config = ExportConfig::discover(cli.config.as_deref(), &cwd)?;
    debug!(elapsed = ?start.elapsed(), "load_config");

    let ctx = CommandContext::new(cli, &cwd, config, start);

    match &cli.command {
        None => NoCommand.execute(&ctx),
        Some(cmd) => cmd.execute(&ctx),
    }
}
