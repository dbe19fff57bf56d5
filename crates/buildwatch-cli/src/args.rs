use std::path::PathBuf;

use buildwatch_core::ServerConfig;
use clap::{Parser, Subcommand};

/// Terminal monitor for continuous-integration build plans
///
/// Buildwatch polls a build server for the state of its plans and reports
/// when a build has just been fixed, broken, kept broken or completed
/// successfully. The aggregate state (building, broken, healthy, offline)
/// is shown alongside the plan list.
#[derive(Parser)]
#[command(version, about, name = "bw")]
pub struct Args {
    /// Path to the JSON configuration file. Defaults to
    /// $XDG_CONFIG_HOME/buildwatch/config.json
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Buildwatch CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Monitor the build server until interrupted
    #[command(alias = "w")]
    Watch {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Fetch once, print the plans and the aggregate state
    #[command(alias = "c")]
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the effective configuration
    Config,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Watch {
            source: SourceArgs::default(),
        }
    }
}

/// Overrides for the `server` section of the configuration file.
#[derive(clap::Args, Default, Clone)]
pub struct SourceArgs {
    /// Read plans from a local JSON file instead of the configured server
    #[arg(long, conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// Fetch plans from this URL instead of the configured server
    #[arg(long)]
    pub url: Option<String>,
}

impl SourceArgs {
    pub fn apply(&self, server: &mut ServerConfig) {
        if let Some(file) = &self.file {
            server.file = Some(file.clone());
        }
        if let Some(url) = &self.url {
            server.file = None;
            server.url = Some(url.clone());
        }
    }
}
