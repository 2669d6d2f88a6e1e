use super::Workspace;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use colored::Colorize;
use folio_editor::new_document;

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Document id (file name in the store directory)
    pub id: String,

    /// Theme slug
    #[arg(short, long, default_value = "wedding-classic")]
    pub theme: String,

    /// Date the default events are computed from (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<String>,
}

pub async fn create(args: NewArgs, cwd: &str) -> Result<()> {
    let workspace = Workspace::load(cwd)?;
    let entry = workspace.catalog.get(&args.theme)?;

    let today = match &args.today {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", date))?,
        None => chrono::Local::now().date_naive(),
    };

    let document = workspace
        .store
        .create(new_document(&args.id, entry, today))
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    println!(
        "{} Created {} with theme {}",
        "✓".green(),
        document.id.bright_white(),
        entry.slug
    );
    println!("   {}", workspace.store.dir().join(format!("{}.json", document.id)).display());

    Ok(())
}
