//! # Folio Model
//!
//! Shared data model for schema-driven invitation content.
//!
//! ## Three representations of one record
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Blueprint: per-theme sections and fields    │
//! └─────────────────────────────────────────────┘
//!            ↓ addresses            ↓ kinds
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │ FlatForm             │  │ DetailTree           │
//! │ scope → key → string │  │ typed nested records │
//! └──────────────────────┘  └──────────────────────┘
//! ```
//!
//! The [`DetailTree`] is the source of truth. The [`FlatForm`] is a lossy,
//! string-only projection consumed by simple editors. A [`FieldAddress`]
//! points at one field of the tree, optionally inside one element of an
//! array-valued section.

mod address;
mod blueprint;
mod catalog;
mod detail;
mod error;
mod form;
mod kind;
mod value;

pub use address::{ControlKey, FieldAddress};
pub use blueprint::{ArrayRole, Blueprint, Field, ItemLabel, Matcher, Section};
pub use catalog::{
    event_blueprint, wedding_blueprint, ThemeCatalog, ThemeEntry, EVENT_COMPONENT, WEDDING_COMPONENT,
};
pub use detail::{DetailRecord, DetailTree, Slot, SubRecord};
pub use error::{ModelError, ModelResult};
pub use form::FlatForm;
pub use kind::{ControlKind, FieldKind};
pub use value::FieldValue;
