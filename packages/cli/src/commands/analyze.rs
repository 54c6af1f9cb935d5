use anyhow::{bail, Context as _, Result};
use clap::Args;
use colored::{ColoredString, Colorize};
use listing_analyzer::{analyze as analyze_document, Category};
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Input html file
    pub input: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

fn colored_score(score: u8) -> ColoredString {
    let text = score.to_string();
    match score {
        80..=100 => text.green().bold(),
        50..=79 => text.yellow().bold(),
        _ => text.red().bold(),
    }
}

pub fn analyze(args: AnalyzeArgs) -> Result<()> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let doc = listing_dom::parse(&source);
    let analysis = analyze_document(&doc);

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        "text" => {
            println!("{}", args.input.display());
            println!("  SEO:         {}", colored_score(analysis.seo.score));
            println!("  Performance: {}", colored_score(analysis.performance.score));

            if analysis.tips.is_empty() {
                println!("  {} No issues found!", "✓".green());
            }
            for finding in &analysis.findings {
                let category = match finding.category {
                    Category::Seo => "seo".blue().bold(),
                    Category::Performance => "perf".magenta().bold(),
                };
                println!(
                    "  {} [{}] -{} {}",
                    category,
                    finding.rule,
                    finding.penalty,
                    finding.tip
                );
            }
        }
        other => bail!("Unknown format '{}'. Use: text or json", other),
    }

    Ok(())
}
