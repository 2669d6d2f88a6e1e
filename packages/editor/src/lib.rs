//! # Folio Editor
//!
//! Content editing engine for schema-driven invitations.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: blueprints, addresses, detail trees  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: content lifecycle                   │
//! │  - resolve / write fields by address        │
//! │  - map trees to flat forms and back         │
//! │  - render preview and editing panel         │
//! │  - coordinate focus from preview to panel   │
//! │  - load / save through a DocumentStore      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ store: remote API, files, memory            │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The detail tree is the source of truth**: flat forms and views are
//!    derived and can be rebuilt at any time
//! 2. **One addressing scheme**: preview targets and panel controls agree
//!    on [`folio_model::FieldAddress`] and [`folio_model::ControlKey`]
//! 3. **Reads are total, writes are checked**: stale addresses resolve to
//!    nothing; out-of-range writes fail without side effects
//! 4. **Focus requests always settle**: bounded polling, cancellable
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{EditorSession, FileStore, RenderMode, TracingNotifier};
//!
//! let mut session = EditorSession::open(
//!     "inv-1", FileStore::new("data"), TracingNotifier,
//!     &ThemeCatalog::builtin(), None, FocusConfig::default(),
//! ).await?;
//!
//! session.edit(&"coverSection.title".parse()?, "A & B")?;
//! let view = session.preview(RenderMode::Edit);
//! session.save().await?;
//! ```

mod defaults;
mod driver;
mod errors;
mod focus;
mod html;
mod mapper;
mod notify;
mod persistence;
mod render;
mod resolve;
mod session;
mod store;

pub use defaults::{event_details, new_document, wedding_details};
pub use driver::{DriveOutcome, FocusDriver};
pub use errors::{AddressError, EditorError, StoreError};
pub use focus::{
    ControlHost, Expansion, FocusConfig, FocusCoordinator, FocusOutcome, FocusState, HeadlessHost,
    PendingFocus,
};
pub use html::{to_html, HtmlOptions};
pub use mapper::{extract, extract_with_inference, infer_legacy, reconstruct};
pub use notify::{Notifier, NotifyKind, RecordingNotifier, TracingNotifier};
pub use persistence::{
    assign_identities, to_payload, DocumentStore, FileStore, MemoryStore, StoreResult,
    StoredDocument,
};
pub use render::{
    render, render_panel, ControlGroup, ControlView, ItemView, LeafView, PanelSection, PanelView,
    PreviewEvent, RenderMode, SectionView, View,
};
pub use resolve::{canonicalize, resolve, write};
pub use session::EditorSession;
pub use store::ContentStore;

// Re-export model types for convenience
pub use folio_model::{Blueprint, DetailTree, FieldAddress, FlatForm, ThemeCatalog};
