use anyhow::Result;
use clap::Args;
use colored::Colorize;
use listing_editor::EditorConfig;
use std::path::PathBuf;

use super::{open_session, write_output};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Input html file
    pub input: PathBuf,

    /// Accent colour applied to the theme variables
    #[arg(long)]
    pub accent: Option<String>,

    /// Remove scripts, embeds, handlers and animations before export
    #[arg(long)]
    pub safe: bool,

    /// Output file (defaults to the export name in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
}

pub async fn export(args: ExportArgs, config: &EditorConfig) -> Result<()> {
    let mut session = open_session(&args.input, config).await?;

    if let Some(accent) = &args.accent {
        session.set_accent(accent)?;
    }

    let (name, html) = if args.safe {
        session.export_safe()?
    } else {
        (session.export_file_name(), session.serialize()?)
    };

    if args.stdout {
        return write_output(None, &html);
    }

    eprintln!(
        "📦 {} {} (accent {})",
        "Exporting".green().bold(),
        args.input.display(),
        session.accent()
    );
    let output = args.output.unwrap_or_else(|| PathBuf::from(name));
    write_output(Some(&output), &html)
}
