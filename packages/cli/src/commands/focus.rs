//! Replays a preview click against a headless panel.

use super::{DocumentArgs, Workspace};
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use folio_editor::{
    render_panel, DriveOutcome, FocusCoordinator, FocusDriver, FocusOutcome, HeadlessHost,
    PreviewEvent, RenderMode,
};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::watch;

#[derive(Debug, Args)]
pub struct FocusArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Preview target id, e.g. `eventDetails.1-eventLocation`
    pub target: String,

    /// Never mount the panel controls, so the request runs out of probes
    #[arg(long)]
    pub unmounted: bool,
}

pub async fn focus(args: FocusArgs, cwd: &str) -> Result<()> {
    let workspace = Workspace::load(cwd)?;
    let session = workspace
        .open(&args.document.id, args.document.theme.as_deref())
        .await?;

    let mut activated = None;
    let found = session
        .preview(RenderMode::Edit)
        .activate(&args.target, |event| match event {
            PreviewEvent::TargetActivated(address) => activated = Some(address),
        });
    let Some(address) = activated.filter(|_| found) else {
        bail!("No preview target '{}'", args.target);
    };

    let config = workspace.config.focus_config();
    let mut coordinator = FocusCoordinator::new(config);
    let started = Instant::now();
    coordinator.activate(address.clone(), started);

    let mut host = HeadlessHost::new();
    if !args.unmounted {
        let content = session.content();
        let panel = render_panel(content.blueprint(), content.tree(), coordinator.expansion());
        host.remount(panel.mounted_keys());
    }

    println!(
        "{} {} (up to {} probes, {:?} apart)",
        "🎯 Focusing".bright_blue().bold(),
        address,
        config.max_attempts,
        config.poll_delay
    );

    let coordinator = Arc::new(Mutex::new(coordinator));
    let host = Arc::new(Mutex::new(host));
    let (shutdown, signal) = watch::channel(false);
    let run = FocusDriver::new(coordinator.clone(), host.clone(), signal).run();
    tokio::pin!(run);

    let drive = tokio::select! {
        drive = &mut run => drive,
        _ = tokio::signal::ctrl_c() => {
            let _ = shutdown.send(true);
            run.await
        }
    };

    let elapsed = started.elapsed();
    let coordinator = coordinator.lock().unwrap_or_else(PoisonError::into_inner);
    match (drive, coordinator.last_outcome()) {
        (DriveOutcome::Settled, Some(FocusOutcome::Focused(address))) => {
            println!("  {} Focused {} after {:?}", "✓".green(), address.control_key(), elapsed);
        }
        (DriveOutcome::Settled, Some(FocusOutcome::Dropped(address))) => {
            println!(
                "  {} {} never mounted, dropped after {:?}",
                "⚠️".yellow(),
                address.control_key(),
                elapsed
            );
        }
        (_, outcome) => {
            println!("  {} Cancelled ({:?})", "✗".red(), outcome);
        }
    }

    Ok(())
}
