//! Email log: append-only record of every reminder that left the system.

use serde::{Deserialize, Serialize};

use crate::id::{AutomationId, EmailLogId, InvoiceId};
use crate::time::Timestamp;

/// Number of entries kept; older ones are dropped silently.
pub const EMAIL_LOG_CAPACITY: usize = 500;

/// One sent email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailLogEntry {
    pub id: EmailLogId,
    pub invoice_id: InvoiceId,
    pub to: String,
    pub subject: String,
    /// Set when the email was sent by an automation rather than by hand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_id: Option<AutomationId>,
    pub at: Timestamp,
}

impl EmailLogEntry {
    /// Create an entry with a fresh id.
    #[must_use]
    pub fn new(
        invoice_id: InvoiceId,
        to: impl Into<String>,
        subject: impl Into<String>,
        automation_id: Option<AutomationId>,
        at: Timestamp,
    ) -> Self {
        Self {
            id: EmailLogId::new(),
            invoice_id,
            to: to.into(),
            subject: subject.into(),
            automation_id,
            at,
        }
    }
}

/// Insert `entry` at the front of a newest-first log and trim it to
/// [`EMAIL_LOG_CAPACITY`].
pub fn prepend_capped(log: &mut Vec<EmailLogEntry>, entry: EmailLogEntry) {
    log.insert(0, entry);
    log.truncate(EMAIL_LOG_CAPACITY);
}
