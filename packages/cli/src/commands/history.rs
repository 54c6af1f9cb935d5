use anyhow::Result;
use chrono::{Local, TimeZone};
use clap::Subcommand;
use colored::Colorize;
use listing_editor::HeadlessSurface;
use std::path::PathBuf;

use super::{open_session, write_output};
use crate::config::Context;

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List snapshots, oldest first
    List,

    /// Record an html file as a snapshot
    Snapshot {
        input: PathBuf,

        /// Snapshot label (defaults to the file name)
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Write a snapshot back out as a full document
    Restore {
        index: usize,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a snapshot
    Delete {
        index: usize,
    },

    /// Show or change the auto-snapshot preference
    Auto {
        #[arg(value_parser = ["on", "off"])]
        state: Option<String>,
    },
}

fn format_timestamp(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| millis.to_string())
}

pub async fn history(command: HistoryCommand, ctx: &Context) -> Result<()> {
    let history = ctx.history();

    match command {
        HistoryCommand::List => {
            let entries = history.list();
            if entries.is_empty() {
                println!("No snapshots in {}", ctx.store_dir.display());
            }
            for (index, entry) in entries.iter().enumerate() {
                println!(
                    "{:>3}  {}  {}",
                    index.to_string().bright_white(),
                    format_timestamp(entry.timestamp).dimmed(),
                    entry.label
                );
            }
        }
        HistoryCommand::Snapshot { input, label } => {
            let session = open_session(&input, &ctx.config).await?;
            let label = label.unwrap_or_else(|| session.snapshot_label());
            let index = session.snapshot(&history, &label)?;
            println!(
                "  {} Snapshot {} {}",
                "✓".green(),
                index.to_string().bright_white(),
                label
            );
        }
        HistoryCommand::Restore { index, output } => {
            let mut session = listing_editor::DocumentSession::new(&ctx.config);
            let ticket = session.restore_snapshot(&history, index)?;
            session.mount(&HeadlessSurface, ticket).await?;
            write_output(output.as_ref(), &session.serialize()?)?;
        }
        HistoryCommand::Delete { index } => {
            let removed = history.delete(index)?;
            println!("  {} Deleted snapshot {} {}", "✓".green(), index, removed.label);
        }
        HistoryCommand::Auto { state } => {
            if let Some(state) = state {
                history.set_auto_enabled(state == "on");
            }
            let enabled = history.auto_enabled();
            println!(
                "Auto-snapshot is {} (every {}s)",
                if enabled { "on".green().bold() } else { "off".yellow().bold() },
                ctx.config.auto_snapshot_period().as_secs()
            );
        }
    }

    Ok(())
}
