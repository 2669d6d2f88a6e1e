use super::{DocumentArgs, Workspace};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_editor::{to_html, HtmlOptions, RenderMode};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Render every field as an activation target
    #[arg(short, long)]
    pub edit: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Skip indentation and newlines
    #[arg(long)]
    pub compact: bool,
}

pub async fn preview(args: PreviewArgs, cwd: &str) -> Result<()> {
    let workspace = Workspace::load(cwd)?;
    let session = workspace
        .open(&args.document.id, args.document.theme.as_deref())
        .await?;

    let mode = if args.edit { RenderMode::Edit } else { RenderMode::ReadOnly };
    let view = session.preview(mode);

    let title = session
        .attributes()
        .get("invitationTitle")
        .filter(|value| !value.is_blank())
        .map(|value| value.to_string())
        .unwrap_or_else(|| session.id.clone());
    let options = HtmlOptions {
        pretty: !args.compact,
        title,
        ..HtmlOptions::default()
    };
    let html = to_html(&view, options);

    match args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, html)?;
            println!(
                "{} {} → {} ({} targets)",
                "✓".green(),
                session.id,
                path.display(),
                view.targets().count()
            );
        }
        None => println!("{}", html),
    }

    Ok(())
}
