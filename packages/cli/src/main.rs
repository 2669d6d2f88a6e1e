mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    create, extract, focus, init, payload, preview, reconstruct, resolve_field, set, themes,
    DocumentArgs, FocusArgs, InitArgs, NewArgs, PreviewArgs, ReconstructArgs, ResolveArgs,
    SetArgs, ThemesArgs,
};
use tracing_subscriber::EnvFilter;

/// Folio CLI - Schema-driven invitation content editor
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editor activity to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Folio project
    Init(InitArgs),

    /// List available themes
    Themes(ThemesArgs),

    /// Create a document with default content for a theme
    New(NewArgs),

    /// Print a document's flat form
    Extract(DocumentArgs),

    /// Rebuild a document's content from a flat form file
    Reconstruct(ReconstructArgs),

    /// Print the save payload for a document
    Payload(DocumentArgs),

    /// Read one field by address
    Resolve(ResolveArgs),

    /// Edit one field by address and save
    Set(SetArgs),

    /// Render a document to HTML
    Preview(PreviewArgs),

    /// Simulate clicking a preview target and focusing its panel control
    Focus(FocusArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Themes(args) => themes(args, &cwd),
        Command::New(args) => create(args, &cwd).await,
        Command::Extract(args) => extract(args, &cwd).await,
        Command::Reconstruct(args) => reconstruct(args, &cwd).await,
        Command::Payload(args) => payload(args, &cwd).await,
        Command::Resolve(args) => resolve_field(args, &cwd).await,
        Command::Set(args) => set(args, &cwd).await,
        Command::Preview(args) => preview(args, &cwd).await,
        Command::Focus(args) => focus(args, &cwd).await,
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
