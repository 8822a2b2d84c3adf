//! Storage-specific error type wrapping file and JSON errors.

use dunning_domain::error::DunningError;

/// Errors originating from the JSON file store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading, writing or renaming the document failed.
    #[error("state file error")]
    Io(#[from] std::io::Error),

    /// The document could not be encoded.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),
}

impl From<StorageError> for DunningError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
