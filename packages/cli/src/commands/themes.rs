use super::Workspace;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct ThemesArgs {
    /// Print the blueprint of one theme as JSON
    #[arg(long, value_name = "SLUG")]
    pub show: Option<String>,
}

pub fn themes(args: ThemesArgs, cwd: &str) -> Result<()> {
    let workspace = Workspace::load(cwd)?;

    if let Some(slug) = args.show {
        let blueprint = workspace.catalog.blueprint(&slug)?;
        println!("{}", serde_json::to_string_pretty(blueprint)?);
        return Ok(());
    }

    println!("{}", "🎨 Available themes".bright_blue().bold());
    for entry in workspace.catalog.entries() {
        let sections: Vec<&str> = entry
            .blueprint
            .sections
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        println!(
            "  {} {} ({}) {}",
            entry.slug.bright_white(),
            entry.name,
            if entry.category.is_empty() { "-" } else { entry.category.as_str() },
            sections.join(", ").dimmed()
        );
    }

    Ok(())
}
