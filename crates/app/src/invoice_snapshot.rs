//! Shared invoice snapshot: in-process [`InvoiceSource`].
//!
//! Ingestion replaces the whole set at once; readers get a cheap
//! `Arc<[Invoice]>` that stays consistent for as long as they hold it.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use dunning_domain::error::DunningError;
use dunning_domain::invoice::Invoice;

use crate::ports::InvoiceSource;

/// Current invoice set, swapped atomically on refresh.
#[derive(Debug)]
pub struct SharedInvoiceSnapshot {
    current: RwLock<Arc<[Invoice]>>,
}

impl Default for SharedInvoiceSnapshot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SharedInvoiceSnapshot {
    #[must_use]
    pub fn new(invoices: Vec<Invoice>) -> Self {
        Self {
            current: RwLock::new(Arc::from(invoices)),
        }
    }

    /// Swap in a new invoice set. Readers holding the old one keep it.
    #[tracing::instrument(skip_all, fields(count = invoices.len()))]
    pub fn replace(&self, invoices: Vec<Invoice>) {
        let next: Arc<[Invoice]> = Arc::from(invoices);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
        tracing::debug!("invoice snapshot replaced");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.current().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    fn current(&self) -> Arc<[Invoice]> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }
}

impl InvoiceSource for SharedInvoiceSnapshot {
    fn snapshot(&self) -> impl Future<Output = Result<Arc<[Invoice]>, DunningError>> + Send {
        let current = self.current();
        async { Ok(current) }
    }
}
