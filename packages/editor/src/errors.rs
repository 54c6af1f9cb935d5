//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Index {index} is out of range (history has {len} entries)")]
    OutOfRange { index: usize, len: usize },

    #[error("Template '{0}' cannot be deleted")]
    NotDeletable(String),

    #[error("{0}")]
    RemoteService(String),

    #[error("Template '{0}' is read-only")]
    ReadOnly(String),

    #[error("Admin manifest unavailable: {0}")]
    ManifestUnavailable(String),

    #[error("Invalid accent colour: {0:?}")]
    InvalidAccent(String),

    #[error("No image is selected")]
    NoSelection,

    #[error("No document is loaded")]
    NotLoaded,

    #[error("Rendering surface error: {0}")]
    Surface(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for EditorError {
    fn from(e: reqwest::Error) -> Self {
        EditorError::RemoteService(format!("Gemini error: {}", e))
    }
}

/// Failures of the key-value persistence port. Stores absorb these and fall
/// back to defaults.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Backend unavailable")]
    Unavailable,
}
