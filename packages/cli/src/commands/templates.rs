use anyhow::{Context as _, Result};
use clap::Subcommand;
use colored::Colorize;
use listing_editor::list_admin_templates;
use std::fs;
use std::path::PathBuf;

use super::write_output;
use crate::config::Context;

#[derive(Subcommand, Debug)]
pub enum TemplatesCommand {
    /// List saved templates
    List,

    /// Save an html file as a named template
    Save {
        /// Template name
        name: String,

        /// Html file to store
        file: PathBuf,
    },

    /// Store an html file under its own name (without extension)
    Import {
        file: PathBuf,
    },

    /// Create a blank starter template
    New {
        /// Template name (defaults to "New Template")
        #[arg(default_value = "")]
        name: String,
    },

    /// Delete a saved template
    Delete {
        name: String,
    },

    /// List admin templates under the asset root
    Admin,

    /// Print a template by name or `file:<path>` value
    Show {
        /// Template name or selection value (defaults to the startup choice)
        value: Option<String>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub async fn templates(command: TemplatesCommand, ctx: &Context) -> Result<()> {
    let store = ctx.templates();

    match command {
        TemplatesCommand::List => {
            let saved = store.list();
            if saved.is_empty() {
                println!("No saved templates in {}", ctx.store_dir.display());
                return Ok(());
            }
            let last = store.last_selected();
            for (name, html) in &saved {
                let marker = if last.as_deref() == Some(name.as_str()) {
                    "*".green().bold()
                } else {
                    " ".normal()
                };
                println!("{} {} {}", marker, name, format!("({} bytes)", html.len()).dimmed());
            }
        }
        TemplatesCommand::Save { name, file } => {
            let html = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            store.save(&name, &html)?;
            store.set_last_selected(&name);
            println!("  {} Saved template {}", "✓".green(), name.bright_white());
        }
        TemplatesCommand::Import { file } => {
            let html = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = store.import_upload(&file_name, &html)?;
            println!("  {} Imported template {}", "✓".green(), name.bright_white());
        }
        TemplatesCommand::New { name } => {
            let (name, _) = store.create_blank(&name)?;
            println!("  {} Created template {}", "✓".green(), name.bright_white());
        }
        TemplatesCommand::Delete { name } => {
            store.delete(&name)?;
            println!("  {} Deleted template {}", "✓".green(), name.bright_white());
        }
        TemplatesCommand::Admin => {
            let admin = list_admin_templates(&ctx.fetcher(), &ctx.config).await;
            if admin.is_empty() {
                println!("No admin templates under {}", ctx.root.display());
            }
            for template in &admin {
                println!("  {} {}", template.name, template.value().dimmed());
            }
        }
        TemplatesCommand::Show { value, output } => {
            let fetcher = ctx.fetcher();
            let value = match value {
                Some(value) => value,
                None => {
                    let admin = list_admin_templates(&fetcher, &ctx.config).await;
                    store.choose_initial(&admin)
                }
            };
            let html = store.open(&value, &fetcher).await?;
            write_output(output.as_ref(), &html)?;
        }
    }

    Ok(())
}
