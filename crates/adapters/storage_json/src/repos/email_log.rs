//! JSON-file implementation of [`EmailLogRepository`].

use dunning_app::ports::EmailLogRepository;
use dunning_domain::email_log::{EmailLogEntry, prepend_capped};
use dunning_domain::error::DunningError;

use crate::store::JsonStateStore;

impl EmailLogRepository for JsonStateStore {
    async fn append(&self, entry: EmailLogEntry) -> Result<EmailLogEntry, DunningError> {
        let appended = self
            .mutate(|doc| {
                prepend_capped(&mut doc.emails_log, entry.clone());
                entry
            })
            .await?;
        Ok(appended)
    }

    async fn recent(&self, limit: Option<usize>) -> Result<Vec<EmailLogEntry>, DunningError> {
        let entries = self
            .read(|doc| {
                let take = limit.unwrap_or(doc.emails_log.len());
                doc.emails_log.iter().take(take).cloned().collect()
            })
            .await;
        Ok(entries)
    }
}
