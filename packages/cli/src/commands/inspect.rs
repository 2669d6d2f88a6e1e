use super::Workspace;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_editor::{canonicalize, resolve, to_payload, FieldAddress};

#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Document id
    pub id: String,

    /// Use this theme instead of the document's own
    #[arg(short, long)]
    pub theme: Option<String>,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Field address, e.g. `coverSection.title` or `eventDetails.1.eventLocation`
    pub address: String,
}

/// Print the document's flat form as JSON.
pub async fn extract(args: DocumentArgs, cwd: &str) -> Result<()> {
    let workspace = Workspace::load(cwd)?;
    let mut session = workspace.open(&args.id, args.theme.as_deref()).await?;
    println!("{}", serde_json::to_string_pretty(session.flat_form())?);
    Ok(())
}

/// Print the body a save would send.
pub async fn payload(args: DocumentArgs, cwd: &str) -> Result<()> {
    let workspace = Workspace::load(cwd)?;
    let session = workspace.open(&args.id, args.theme.as_deref()).await?;
    println!("{}", serde_json::to_string_pretty(&to_payload(session.content().tree()))?);
    Ok(())
}

pub async fn resolve_field(args: ResolveArgs, cwd: &str) -> Result<()> {
    let address: FieldAddress = args.address.parse()?;
    let workspace = Workspace::load(cwd)?;
    let session = workspace
        .open(&args.document.id, args.document.theme.as_deref())
        .await?;
    let content = session.content();
    let blueprint = content.blueprint();

    address.check(blueprint)?;
    if let Some(canonical) = canonicalize(blueprint, &address, content.tree()) {
        if canonical != address {
            println!("{} {}", "→".dimmed(), canonical);
        }
    }

    match resolve(blueprint, &address, content.tree()) {
        Some(value) if !value.is_blank() => println!("{}", value),
        _ => println!("{}", "(not set)".yellow()),
    }

    Ok(())
}
