//! Mailer port: outbound email dispatch.

use std::future::Future;
use std::sync::Arc;

use dunning_domain::automation::Automation;
use dunning_domain::error::DispatchError;
use dunning_domain::id::AutomationId;
use dunning_domain::invoice::Invoice;

/// Details the caller has already settled before asking for a send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchContext {
    /// Recipient address, already checked to contain `@`.
    pub to: String,
    /// Subject override; the mailer picks its own when `None`.
    pub subject: Option<String>,
    /// Automation on whose behalf the email is sent, if any.
    pub automation_id: Option<AutomationId>,
}

impl DispatchContext {
    /// Context for an automated reminder about `automation`'s invoice.
    #[must_use]
    pub fn reminder(automation: &Automation, to: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: Some(format!("Invoice #{} (reminder)", automation.invoice_id)),
            automation_id: Some(automation.id.clone()),
        }
    }

    /// Context for a one-off send triggered by a person.
    #[must_use]
    pub fn manual(to: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: None,
            automation_id: None,
        }
    }
}

/// What actually went out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
}

/// Sends invoice emails through some provider.
///
/// Failures carry a human-readable message only; callers treat every
/// failure the same way.
pub trait Mailer {
    fn send(
        &self,
        invoice: &Invoice,
        context: &DispatchContext,
    ) -> impl Future<Output = Result<SentEmail, DispatchError>> + Send;
}

impl<T: Mailer + Send + Sync> Mailer for Arc<T> {
    fn send(
        &self,
        invoice: &Invoice,
        context: &DispatchContext,
    ) -> impl Future<Output = Result<SentEmail, DispatchError>> + Send {
        (**self).send(invoice, context)
    }
}
