//! Resend-specific failures.

use dunning_domain::error::DispatchError;

#[derive(Debug, thiserror::Error)]
pub enum ResendError {
    /// No API key was configured, so nothing can be sent.
    #[error("RESEND_API_KEY not set")]
    MissingApiKey,

    /// The HTTP client could not be built or the request never completed.
    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Resend answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

impl From<ResendError> for DispatchError {
    fn from(err: ResendError) -> Self {
        DispatchError::new(err.to_string())
    }
}
