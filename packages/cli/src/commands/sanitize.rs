use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use listing_sanitizer::Sanitizer;
use std::fs;
use std::path::PathBuf;

use super::write_output;

#[derive(Args, Debug)]
pub struct SanitizeArgs {
    /// Input html file
    pub input: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only strip inline event handlers
    #[arg(long)]
    pub handlers_only: bool,
}

pub fn sanitize(args: SanitizeArgs) -> Result<()> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let mut doc = listing_dom::parse(&source);
    let sanitizer = if args.handlers_only {
        Sanitizer::handlers_only()
    } else {
        Sanitizer::new()
    };
    let report = sanitizer.run(&mut doc);

    eprintln!("🧹 {} {}", "Sanitized".green().bold(), args.input.display());
    if report.is_clean() {
        eprintln!("   {} Nothing to remove", "✓".green());
    } else {
        eprintln!("   Elements removed:   {}", report.removed_elements);
        eprintln!("   Attributes removed: {}", report.removed_attributes);
        eprintln!("   Keyframes stripped: {}", report.stripped_keyframes);
    }

    write_output(args.output.as_ref(), &doc.serialize())
}
