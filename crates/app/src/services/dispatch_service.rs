//! Dispatch service: send an invoice email on demand.

use dunning_domain::email_log::EmailLogEntry;
use dunning_domain::error::{DispatchError, DunningError, NotFoundError};
use dunning_domain::id::InvoiceId;

use crate::ports::{Clock, DispatchContext, EmailLogRepository, InvoiceSource, Mailer, SentEmail};

/// Manual, one-off sends that share the mailer and email log with the
/// scheduler but never touch automations.
pub struct DispatchService<R, I, M, C> {
    log: R,
    invoices: I,
    mailer: M,
    clock: C,
}

impl<R, I, M, C> DispatchService<R, I, M, C>
where
    R: EmailLogRepository,
    I: InvoiceSource,
    M: Mailer,
    C: Clock,
{
    pub fn new(log: R, invoices: I, mailer: M, clock: C) -> Self {
        Self {
            log,
            invoices,
            mailer,
            clock,
        }
    }

    /// Email the invoice to its first usable recipient and log the send.
    ///
    /// # Errors
    ///
    /// Returns [`DunningError::NotFound`] for an unknown invoice,
    /// [`DunningError::Dispatch`] when there is no usable address or the
    /// provider fails, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn send_invoice_email(&self, invoice_id: &InvoiceId) -> Result<SentEmail, DunningError> {
        let invoices = self.invoices.snapshot().await?;
        let invoice = invoices
            .iter()
            .find(|inv| &inv.id == invoice_id)
            .ok_or_else(|| NotFoundError {
                entity: "Invoice",
                id: invoice_id.to_string(),
            })?;
        let to = invoice
            .recipient()
            .ok_or_else(|| DispatchError::new("No valid email for this invoice"))?;

        let sent = self
            .mailer
            .send(invoice, &DispatchContext::manual(to))
            .await?;
        tracing::info!(to = %sent.to, "invoice email sent");

        let entry = EmailLogEntry::new(
            invoice_id.clone(),
            sent.to.clone(),
            sent.subject.clone(),
            None,
            self.clock.now(),
        );
        self.log.append(entry).await?;
        Ok(sent)
    }
}
