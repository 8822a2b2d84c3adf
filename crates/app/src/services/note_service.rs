//! Note service: per-invoice remarks.

use dunning_domain::error::DunningError;
use dunning_domain::id::InvoiceId;
use dunning_domain::note::Note;

use crate::ports::{Clock, NoteRepository};

pub struct NoteService<R, C> {
    repo: R,
    clock: C,
}

impl<R: NoteRepository, C: Clock> NoteService<R, C> {
    pub fn new(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Notes attached to an invoice, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list(&self, invoice_id: &InvoiceId) -> Result<Vec<Note>, DunningError> {
        self.repo.find_by_invoice(invoice_id).await
    }

    /// Attach a note to an invoice.
    ///
    /// # Errors
    ///
    /// Returns [`DunningError::Validation`] when `body` is blank, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, body))]
    pub async fn add(
        &self,
        invoice_id: &InvoiceId,
        body: &str,
        from_client: bool,
    ) -> Result<Note, DunningError> {
        let note = Note::new(body.trim(), from_client, self.clock.now())?;
        self.repo.add(invoice_id, note).await
    }
}
