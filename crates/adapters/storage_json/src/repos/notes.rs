//! JSON-file implementation of [`NoteRepository`].

use dunning_app::ports::NoteRepository;
use dunning_domain::error::DunningError;
use dunning_domain::id::InvoiceId;
use dunning_domain::note::Note;

use crate::store::JsonStateStore;

impl NoteRepository for JsonStateStore {
    async fn add(&self, invoice_id: &InvoiceId, note: Note) -> Result<Note, DunningError> {
        let added = self
            .mutate(|doc| {
                doc.notes
                    .entry(invoice_id.clone())
                    .or_default()
                    .insert(0, note.clone());
                note
            })
            .await?;
        Ok(added)
    }

    async fn find_by_invoice(&self, invoice_id: &InvoiceId) -> Result<Vec<Note>, DunningError> {
        let notes = self
            .read(|doc| doc.notes.get(invoice_id).cloned().unwrap_or_default())
            .await;
        Ok(notes)
    }
}
