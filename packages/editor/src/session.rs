//! # Editor Session
//!
//! One open document: its content, the preview/panel views derived from
//! it, the focus coordinator linking them, and the store it saves to.
//!
//! ```text
//! preview click ──→ activate_target ──→ FocusCoordinator ──→ panel control
//! panel edit    ──→ edit ──→ ContentStore ──→ preview re-render
//! save          ──→ DocumentStore::update ──→ Notifier
//! ```
//!
//! A failed save leaves the in-memory content as it was, so the user can
//! retry without losing edits.

use crate::{
    render, render_panel, to_payload, ContentStore, DocumentStore, EditorError, FocusConfig,
    FocusCoordinator, Notifier, NotifyKind, PanelView, PreviewEvent, RenderMode, View,
};
use folio_model::{Blueprint, FieldAddress, FieldValue, FlatForm, ThemeCatalog, WEDDING_COMPONENT};
use std::collections::BTreeMap;
use std::time::Instant;

pub struct EditorSession<S, N> {
    /// Document id in the store
    pub id: String,

    theme: String,
    attributes: BTreeMap<String, FieldValue>,
    content: ContentStore,
    focus: FocusCoordinator,
    store: S,
    notifier: N,
}

impl<S: DocumentStore, N: Notifier> EditorSession<S, N> {
    /// Fetch a document and pick its blueprint.
    ///
    /// The theme is `theme_override`, else the document's theme, else a
    /// built-in theme chosen by the record's component.
    pub async fn open(
        id: &str,
        store: S,
        notifier: N,
        catalog: &ThemeCatalog,
        theme_override: Option<&str>,
        focus: FocusConfig,
    ) -> Result<Self, EditorError> {
        let document = match store.fetch(id).await {
            Ok(document) => document,
            Err(e) => {
                tracing::error!("Failed to load '{}' from {} store: {}", id, store.name(), e);
                notifier.notify(NotifyKind::Error, &e.user_message());
                return Err(e.into());
            }
        };

        let theme = match theme_override.or(document.theme.as_deref()) {
            Some(slug) => slug.to_string(),
            None => {
                let component = document.details.primary().and_then(|r| r.component.as_deref());
                let slug = if component == Some(WEDDING_COMPONENT) {
                    "wedding-classic"
                } else {
                    "event-basic"
                };
                tracing::warn!("Document '{}' has no theme, using '{}'", id, slug);
                slug.to_string()
            }
        };

        let blueprint: Blueprint = match catalog.blueprint(&theme) {
            Ok(blueprint) => blueprint.clone(),
            Err(e) => {
                notifier.notify(NotifyKind::Error, &format!("Unknown theme '{}'", theme));
                return Err(e.into());
            }
        };

        tracing::info!("Opened document '{}' with theme '{}'", id, theme);
        let content = ContentStore::load(blueprint, document.details, &document.attributes);

        Ok(Self {
            id: id.to_string(),
            theme,
            attributes: document.attributes,
            content,
            focus: FocusCoordinator::new(focus),
            store,
            notifier,
        })
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn attributes(&self) -> &BTreeMap<String, FieldValue> {
        &self.attributes
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn is_dirty(&self) -> bool {
        self.content.is_dirty()
    }

    pub fn flat_form(&mut self) -> &FlatForm {
        self.content.flat_form()
    }

    /// Apply a panel edit.
    pub fn edit(&mut self, address: &FieldAddress, input: &str) -> Result<(), EditorError> {
        self.content.write(address, input).map_err(|e| {
            tracing::warn!("Rejected edit at {}: {}", address, e);
            EditorError::from(e)
        })
    }

    /// Apply a whole flat form, as submitted by a simple editor.
    pub fn apply_form(&mut self, form: &FlatForm) {
        self.content.apply_form(form);
    }

    pub fn preview(&self, mode: RenderMode) -> View {
        render(self.content.blueprint(), self.content.tree(), mode)
    }

    pub fn panel(&self) -> PanelView {
        render_panel(self.content.blueprint(), self.content.tree(), self.focus.expansion())
    }

    pub fn focus(&self) -> &FocusCoordinator {
        &self.focus
    }

    pub fn focus_mut(&mut self) -> &mut FocusCoordinator {
        &mut self.focus
    }

    /// Handle a click on a preview target in edit mode.
    pub fn activate_target(&mut self, target_id: &str, now: Instant) -> bool {
        let view = self.preview(RenderMode::Edit);
        let mut activated = None;
        let found = view.activate(target_id, |event| match event {
            PreviewEvent::TargetActivated(address) => activated = Some(address),
        });
        if let Some(address) = activated {
            self.focus.activate(address, now);
        }
        found
    }

    /// Save the content. Exactly one notification is emitted either way.
    pub async fn save(&mut self) -> Result<(), EditorError> {
        let payload = to_payload(self.content.tree());
        tracing::info!("Saving document '{}' to {} store", self.id, self.store.name());

        match self.store.update(&self.id, payload).await {
            Ok(saved) => {
                self.content.replace_tree(saved.details);
                self.notifier
                    .notify(NotifyKind::Success, "Invitation saved successfully!");
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to save '{}': {}", self.id, e);
                self.notifier.notify(NotifyKind::Error, &e.user_message());
                Err(e.into())
            }
        }
    }

    /// Close the editor, cancelling any pending focus request.
    pub fn close(&mut self) {
        self.focus.shutdown();
        if self.content.is_dirty() {
            tracing::warn!("Closing '{}' with unsaved changes", self.id);
        }
    }
}
