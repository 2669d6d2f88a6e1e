use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Document store directory
    #[arg(short, long, default_value = "data")]
    pub store_dir: String,

    /// Directory for custom theme files
    #[arg(short, long, default_value = "themes")]
    pub themes_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Folio project...".bright_blue().bold());

    for dir in [&args.store_dir, &args.themes_dir] {
        let path = PathBuf::from(cwd).join(dir);
        if !path.exists() {
            fs::create_dir_all(&path)?;
            println!("  {} Created {}/", "✓".green(), dir);
        }
    }

    let config = Config {
        store_dir: args.store_dir.clone(),
        themes_dir: args.themes_dir.clone(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: folio themes");
    println!("  2. Run: folio new my-invitation --theme wedding-classic");
    println!("  3. Run: folio preview my-invitation --edit");

    Ok(())
}
