pub mod analyze;
pub mod export;
pub mod history;
pub mod sanitize;
pub mod templates;

pub use analyze::{analyze, AnalyzeArgs};
pub use export::{export, ExportArgs};
pub use history::{history, HistoryCommand};
pub use sanitize::{sanitize, SanitizeArgs};
pub use templates::{templates, TemplatesCommand};

use anyhow::{Context as _, Result};
use colored::Colorize;
use listing_editor::{DocumentSession, EditorConfig, HeadlessSurface};
use std::fs;
use std::path::{Path, PathBuf};

/// Read an html file and mount it in a fresh session named after the file
pub(crate) async fn open_session(input: &Path, config: &EditorConfig) -> Result<DocumentSession> {
    let html = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let name = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned());

    let mut session = DocumentSession::new(config);
    session.load(&HeadlessSurface, &html, name.as_deref()).await?;
    Ok(session)
}

/// Write `contents` to `output`, or to stdout when no path is given
pub(crate) fn write_output(output: Option<&PathBuf>, contents: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("  {} Wrote {}", "✓".green(), path.display());
        }
        None => println!("{}", contents),
    }
    Ok(())
}
