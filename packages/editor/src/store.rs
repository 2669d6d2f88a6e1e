//! # Content Store
//!
//! Owns the [`DetailTree`] of the document being edited. Every edit goes
//! through here, so the tree stays the single source of truth and the
//! [`FlatForm`] is only ever a derived view.
//!
//! ## Lifecycle
//!
//! ```text
//! load ──→ write / apply_form ──→ save ──→ replace_tree
//!  │            │                              │
//!  infer     version++, dirty              clean again
//! ```

use crate::{mapper, resolve, AddressError};
use folio_model::{Blueprint, DetailTree, FieldAddress, FieldValue, FlatForm};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct ContentStore {
    blueprint: Blueprint,

    tree: DetailTree,

    /// Cached flat projection; dropped on every change.
    form: Option<FlatForm>,

    /// Increments on each applied change
    pub version: u64,

    dirty: bool,
}

impl ContentStore {
    pub fn new(blueprint: Blueprint, tree: DetailTree) -> Self {
        Self {
            blueprint,
            tree,
            form: None,
            version: 0,
            dirty: false,
        }
    }

    /// Load content, prefilling empty fields from legacy attributes.
    ///
    /// Prefilled values are written into the tree, so the store starts
    /// dirty when anything was inferred.
    pub fn load(
        blueprint: Blueprint,
        tree: DetailTree,
        attributes: &BTreeMap<String, FieldValue>,
    ) -> Self {
        let mut store = Self::new(blueprint, tree);
        for (address, text) in mapper::infer_legacy(&store.blueprint, &store.tree, attributes) {
            if let Err(e) = resolve::write(&store.blueprint, &address, &mut store.tree, &text) {
                tracing::warn!("Could not prefill {}: {}", address, e);
                continue;
            }
            store.dirty = true;
        }
        store
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    pub fn tree(&self) -> &DetailTree {
        &self.tree
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn resolve(&self, address: &FieldAddress) -> Option<&FieldValue> {
        resolve::resolve(&self.blueprint, address, &self.tree)
    }

    /// Apply one field edit. On error the tree is unchanged.
    pub fn write(&mut self, address: &FieldAddress, input: &str) -> Result<(), AddressError> {
        resolve::write(&self.blueprint, address, &mut self.tree, input)?;
        self.touch();
        Ok(())
    }

    /// Replace blueprint fields from a whole flat form.
    pub fn apply_form(&mut self, form: &FlatForm) {
        self.tree = mapper::reconstruct(&self.blueprint, form, Some(&self.tree));
        self.touch();
    }

    /// Flat projection of the current tree, re-derived after changes.
    pub fn flat_form(&mut self) -> &FlatForm {
        let blueprint = &self.blueprint;
        let tree = &self.tree;
        self.form.get_or_insert_with(|| mapper::extract(blueprint, tree))
    }

    /// Adopt the tree returned by a successful save.
    pub fn replace_tree(&mut self, tree: DetailTree) {
        self.tree = tree;
        self.form = None;
        self.dirty = false;
    }

    fn touch(&mut self) {
        self.form = None;
        self.version += 1;
        self.dirty = true;
    }
}
