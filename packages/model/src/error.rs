//! Error types for the model

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Blueprint error: {0}")]
    Blueprint(String),

    #[error("Invalid field address '{0}'")]
    InvalidAddress(String),

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ModelResult<T> = Result<T, ModelError>;
