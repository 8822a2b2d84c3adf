//! Invoice source port: read-only view of the invoices known to ingestion.

use std::future::Future;
use std::sync::Arc;

use dunning_domain::error::DunningError;
use dunning_domain::invoice::Invoice;

/// Supplies the current invoice set.
///
/// The application only reads; it never writes back. Implementations are
/// refreshed by whatever ingests invoices (CSV upload, database sync, …).
pub trait InvoiceSource {
    /// A consistent snapshot of all invoices at this instant.
    fn snapshot(&self) -> impl Future<Output = Result<Arc<[Invoice]>, DunningError>> + Send;
}

impl<T: InvoiceSource + Send + Sync> InvoiceSource for Arc<T> {
    fn snapshot(&self) -> impl Future<Output = Result<Arc<[Invoice]>, DunningError>> + Send {
        (**self).snapshot()
    }
}
