//! Notes: free-text remarks attached to an invoice.

use serde::{Deserialize, Serialize};

use crate::error::{DunningError, ValidationError};
use crate::id::NoteId;
use crate::time::Timestamp;

/// A remark on an invoice, either internal or relayed from the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub body: String,
    #[serde(default)]
    pub from_client: bool,
    pub at: Timestamp,
}

impl Note {
    /// Create a note with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyNoteBody`] when `body` is blank.
    pub fn new(
        body: impl Into<String>,
        from_client: bool,
        at: Timestamp,
    ) -> Result<Self, DunningError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(ValidationError::EmptyNoteBody.into());
        }
        Ok(Self {
            id: NoteId::new(),
            body,
            from_client,
            at,
        })
    }
}
