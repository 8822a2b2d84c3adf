//! Activity service: read access to the email log.

use dunning_domain::email_log::EmailLogEntry;
use dunning_domain::error::DunningError;

use crate::ports::EmailLogRepository;

pub struct ActivityService<R> {
    repo: R,
}

impl<R: EmailLogRepository> ActivityService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Most recent sent emails, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn recent(&self, limit: Option<usize>) -> Result<Vec<EmailLogEntry>, DunningError> {
        self.repo.recent(limit).await
    }
}
