//! On-disk shape of the application state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dunning_domain::automation::Automation;
use dunning_domain::email_log::EmailLogEntry;
use dunning_domain::id::InvoiceId;
use dunning_domain::note::Note;

/// Everything the service persists, as one JSON object.
///
/// Missing keys fall back to empty collections, so older files load fine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StateDocument {
    /// Automations in creation order.
    pub automations: Vec<Automation>,
    /// Sent emails, newest first.
    pub emails_log: Vec<EmailLogEntry>,
    /// Notes per invoice, newest first.
    pub notes: BTreeMap<InvoiceId, Vec<Note>>,
    #[serde(alias = "apiKeys")]
    pub secrets: BTreeMap<String, String>,
}
