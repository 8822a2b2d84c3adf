//! Email log port: append-only record of sent emails.

use std::future::Future;
use std::sync::Arc;

use dunning_domain::email_log::EmailLogEntry;
use dunning_domain::error::DunningError;

/// Repository for the capped, newest-first email log.
pub trait EmailLogRepository {
    /// Prepend an entry, dropping the oldest ones past the capacity.
    fn append(
        &self,
        entry: EmailLogEntry,
    ) -> impl Future<Output = Result<EmailLogEntry, DunningError>> + Send;

    /// Get the most recent entries, newest first. `None` returns them all.
    fn recent(
        &self,
        limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<EmailLogEntry>, DunningError>> + Send;
}

impl<T: EmailLogRepository + Send + Sync> EmailLogRepository for Arc<T> {
    fn append(
        &self,
        entry: EmailLogEntry,
    ) -> impl Future<Output = Result<EmailLogEntry, DunningError>> + Send {
        (**self).append(entry)
    }

    fn recent(
        &self,
        limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<EmailLogEntry>, DunningError>> + Send {
        (**self).recent(limit)
    }
}
