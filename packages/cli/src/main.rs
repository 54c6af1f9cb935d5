mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    analyze, export, history, sanitize, templates, AnalyzeArgs, ExportArgs, HistoryCommand,
    SanitizeArgs, TemplatesCommand,
};
use config::{Context, DEFAULT_STORE_DIR};
use std::path::PathBuf;

/// Listing editor CLI - clean, score and export HTML product listings
#[derive(Parser, Debug)]
#[command(name = "listing")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding saved templates and history
    #[arg(long, global = true, default_value = DEFAULT_STORE_DIR)]
    store: PathBuf,

    /// Asset root for admin templates and the config file
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Remove active content from a listing
    Sanitize(SanitizeArgs),

    /// Score a listing for SEO and performance
    Analyze(AnalyzeArgs),

    /// Export a listing, optionally themed and sanitized
    Export(ExportArgs),

    /// Manage saved and admin templates
    Templates {
        #[command(subcommand)]
        command: TemplatesCommand,
    },

    /// Manage document snapshots
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Sanitize(args) => sanitize(args),
        Command::Analyze(args) => analyze(args),
        Command::Export(args) => {
            let ctx = Context::load(&cli.store, &cli.root)?;
            export(args, &ctx.config).await
        }
        Command::Templates { command } => {
            let ctx = Context::load(&cli.store, &cli.root)?;
            templates(command, &ctx).await
        }
        Command::History { command } => {
            let ctx = Context::load(&cli.store, &cli.root)?;
            history(command, &ctx).await
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
