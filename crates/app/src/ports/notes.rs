//! Note repository port.

use std::future::Future;
use std::sync::Arc;

use dunning_domain::error::DunningError;
use dunning_domain::id::InvoiceId;
use dunning_domain::note::Note;

/// Repository for per-invoice notes, kept newest-first.
pub trait NoteRepository {
    /// Prepend a note to the invoice's list.
    fn add(
        &self,
        invoice_id: &InvoiceId,
        note: Note,
    ) -> impl Future<Output = Result<Note, DunningError>> + Send;

    /// All notes for an invoice, newest first. Unknown invoices have none.
    fn find_by_invoice(
        &self,
        invoice_id: &InvoiceId,
    ) -> impl Future<Output = Result<Vec<Note>, DunningError>> + Send;
}

impl<T: NoteRepository + Send + Sync> NoteRepository for Arc<T> {
    fn add(
        &self,
        invoice_id: &InvoiceId,
        note: Note,
    ) -> impl Future<Output = Result<Note, DunningError>> + Send {
        (**self).add(invoice_id, note)
    }

    fn find_by_invoice(
        &self,
        invoice_id: &InvoiceId,
    ) -> impl Future<Output = Result<Vec<Note>, DunningError>> + Send {
        (**self).find_by_invoice(invoice_id)
    }
}
