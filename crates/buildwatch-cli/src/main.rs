//! Buildwatch CLI Application
//!
//! Terminal front-end for the buildwatch monitor.

mod args;
mod cli;
mod renderer;
mod sinks;

use anyhow::Result;
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        config,
        no_color,
        command,
    } = Args::parse();

    let cli = Cli::new(config, TerminalRenderer::new(!no_color));

    info!("Buildwatch started");

    match command.unwrap_or_default() {
        Watch { source } => cli.watch(&source).await,
        Check { source } => cli.check(&source).await,
        Config => cli.show_config(),
    }
}
