//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`DunningError`] via `#[from]`. Adapters box their own error types into
//! [`DunningError::Storage`].

/// Top-level error shared by every port and use-case.
#[derive(Debug, thiserror::Error)]
pub enum DunningError {
    /// Input or merged state breaks a domain invariant.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The referenced record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// An outbound email could not be sent.
    #[error("dispatch failed")]
    Dispatch(#[from] DispatchError),

    /// The backing store failed to read or write.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The automation does not reference an invoice.
    #[error("invoiceId is required")]
    EmptyInvoiceId,

    /// The automation `type` is not one of the known policies.
    #[error("unknown automation type: {0:?}")]
    UnknownKind(String),

    /// An interval or total is zero or too large.
    #[error("{field} must be between 1 and {max}")]
    OutOfRange {
        /// Name of the offending field, as spelled on the wire.
        field: &'static str,
        max: u32,
    },

    /// A burst automation would send more emails than its total.
    #[error("count {count} exceeds burstTotal {burst_total}")]
    CountAboveTotal { count: u32, burst_total: u32 },

    /// A burst automation that already sent its total cannot be re-armed
    /// without resetting `count`.
    #[error("burst already sent {count} of {burst_total}; reset count to re-arm")]
    BurstExhausted { count: u32, burst_total: u32 },

    /// A note was submitted without text.
    #[error("note body is required")]
    EmptyNoteBody,
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of record that was looked up (e.g. `"Automation"`).
    pub entity: &'static str,
    /// Identifier that was looked up.
    pub id: String,
}

/// An email provider refused or failed to deliver a message.
///
/// Only the human-readable message is kept; callers never branch on
/// provider-specific details.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DispatchError {
    pub message: String,
}

impl DispatchError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
