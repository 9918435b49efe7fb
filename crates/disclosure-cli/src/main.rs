mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use disclosure_logging::{init_logging, LogFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "disclosure",
    about = "Decide which guide and reference text to disclose for a topic",
    version,
    propagate_version = true
)]
struct Cli {
    /// Extra guides directory, scanned before configured ones (repeatable)
    #[arg(long = "guides-dir", global = true)]
    guides_dirs: Vec<PathBuf>,

    /// Skip configured directories; scan only --guides-dir
    #[arg(long, global = true)]
    only: bool,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log level (overrides config)
    #[arg(long, global = true, env = "DISCLOSURE_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the Level 1 summary of every guide
    List,

    /// Run one session; each signal is one request, in order
    Ask {
        /// Topic signals (user requests)
        #[arg(required = true)]
        signals: Vec<String>,
    },

    /// Print a guide body, and optionally one of its references
    Show {
        /// Guide id
        guide: String,
        /// Reference id
        reference: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    init_logging(level, LogFormat::from_name(&config.logging.format))?;

    let loader = commands::build_loader(&config, &cli.guides_dirs, cli.only)?;

    match cli.command {
        Commands::List => commands::list(&loader, cli.json),
        Commands::Ask { signals } => commands::ask(&loader, &signals, cli.json),
        Commands::Show { guide, reference } => {
            commands::show(&loader, &guide, reference.as_deref(), cli.json)
        }
    }
}
