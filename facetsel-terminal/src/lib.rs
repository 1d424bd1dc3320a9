//! Terminal front end for facetsel
//!
//! Loads STL files, grows face regions and reports or exports them. The
//! `facetsel` binary is a thin wrapper around [`run`].

use std::io::{stdout, IsTerminal};

use anyhow::Result;
use tracing_subscriber::FmtSubscriber;

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Commands, LogLevel};
pub use config::Config;

/// Install a stderr logger at `level`, keeping stdout free for reports
pub fn init_logging(level: LogLevel) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::from(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Run a parsed command line, writing output to stdout.
///
/// Summaries are coloured only when stdout is a terminal.
pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_level)?;
    let stdout = stdout();
    let color = stdout.is_terminal();
    commands::execute(cli.command, &mut stdout.lock(), color)
}
