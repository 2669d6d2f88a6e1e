use super::{DocumentArgs, Workspace};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use folio_editor::{resolve, FieldAddress, FlatForm};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SetArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Field address, e.g. `eventDetails.1.eventLocation`
    pub address: String,

    /// New value as typed into the form
    pub value: String,

    /// Apply the edit without saving
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct ReconstructArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Flat form JSON file (`{ "scope": { "key": "value" } }`)
    #[arg(short, long)]
    pub form: PathBuf,

    /// Save the rebuilt content back to the store
    #[arg(long)]
    pub save: bool,
}

/// Edit one field and save.
pub async fn set(args: SetArgs, cwd: &str) -> Result<()> {
    let address: FieldAddress = args.address.parse()?;
    let workspace = Workspace::load(cwd)?;
    let mut session = workspace
        .open(&args.document.id, args.document.theme.as_deref())
        .await?;

    session.edit(&address, &args.value)?;

    let content = session.content();
    let stored = resolve(content.blueprint(), &address, content.tree())
        .map(|value| value.to_string())
        .unwrap_or_default();
    println!("{} {} = {}", "✓".green(), address, stored.bright_white());

    if args.dry_run {
        println!("{}", "(dry run, not saved)".dimmed());
        return Ok(());
    }

    session.save().await?;
    Ok(())
}

/// Rebuild the detail tree from a flat form and print it.
pub async fn reconstruct(args: ReconstructArgs, cwd: &str) -> Result<()> {
    let content = std::fs::read_to_string(&args.form)
        .with_context(|| format!("Cannot read form {}", args.form.display()))?;
    let form: FlatForm = serde_json::from_str(&content)?;

    let workspace = Workspace::load(cwd)?;
    let mut session = workspace
        .open(&args.document.id, args.document.theme.as_deref())
        .await?;

    session.apply_form(&form);
    println!("{}", session.content().tree().to_json_pretty()?);

    if args.save {
        session.save().await?;
    }
    Ok(())
}
