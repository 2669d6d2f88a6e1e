//! Error types for the editor

use folio_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Failure to apply a write at a [`folio_model::FieldAddress`].
///
/// Writes never grow arrays and never replace a slot of a different shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Index {index} out of bounds for '{section}' ({len} elements)")]
    IndexOutOfBounds {
        section: String,
        index: usize,
        len: usize,
    },

    #[error("Array section '{0}' needs an element index to be written")]
    MissingIndex(String),

    #[error("Section '{0}' is not an array")]
    UnexpectedIndex(String),

    #[error("Slot '{0}' holds content of a different shape")]
    ShapeMismatch(String),
}

/// Failure reported by a [`crate::DocumentStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// HTTP-like status, when the failure has one.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::NotFound(_) => Some(404),
            StoreError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for an end-user notification.
    pub fn user_message(&self) -> String {
        match self.status() {
            Some(401) => "Your session has expired. Please sign in again.".into(),
            Some(403) => "You do not have permission to perform this action.".into(),
            Some(404) => "The requested item could not be found.".into(),
            Some(422) => match self {
                StoreError::Status { message, .. } if !message.is_empty() => {
                    format!("Validation failed: {}", message)
                }
                _ => "Some of the submitted data is invalid.".into(),
            },
            Some(429) => "Too many requests. Please wait a moment and try again.".into(),
            Some(status) if status >= 500 => "Server error. Please try again later.".into(),
            _ => "Something went wrong. Please try again.".into(),
        }
    }
}
