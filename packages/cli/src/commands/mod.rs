pub mod create;
pub mod edit;
pub mod focus;
pub mod init;
pub mod inspect;
pub mod preview;
pub mod themes;

pub use create::{create, NewArgs};
pub use edit::{reconstruct, set, ReconstructArgs, SetArgs};
pub use focus::{focus, FocusArgs};
pub use init::{init, InitArgs};
pub use inspect::{extract, payload, resolve_field, DocumentArgs, ResolveArgs};
pub use preview::{preview, PreviewArgs};
pub use themes::{themes, ThemesArgs};

use crate::config::Config;
use anyhow::Result;
use colored::Colorize;
use folio_editor::{EditorSession, FileStore, Notifier, NotifyKind, ThemeCatalog};

/// Prints editor notifications to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NotifyKind, message: &str) {
        match kind {
            NotifyKind::Success => eprintln!("{} {}", "✓".green(), message),
            NotifyKind::Error => eprintln!("{} {}", "✗".red(), message),
            NotifyKind::Warning => eprintln!("{} {}", "⚠️".yellow(), message),
            NotifyKind::Info => eprintln!("{} {}", "ℹ".blue(), message),
        }
    }
}

pub type Session = EditorSession<FileStore, ConsoleNotifier>;

/// Config, themes and document store resolved from the working directory.
pub struct Workspace {
    pub config: Config,
    pub catalog: ThemeCatalog,
    pub store: FileStore,
}

impl Workspace {
    pub fn load(cwd: &str) -> Result<Self> {
        let config = Config::load(cwd)?;
        let catalog = ThemeCatalog::load_dir(&config.get_themes_dir(cwd))?;
        let store = FileStore::new(config.get_store_dir(cwd));
        Ok(Self {
            config,
            catalog,
            store,
        })
    }

    pub async fn open(&self, id: &str, theme: Option<&str>) -> Result<Session> {
        let session = EditorSession::open(
            id,
            self.store.clone(),
            ConsoleNotifier,
            &self.catalog,
            theme,
            self.config.focus_config(),
        )
        .await?;
        Ok(session)
    }
}
