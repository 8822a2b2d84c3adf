//! Invoice: read-only snapshot of a billing record owned by ingestion.
//!
//! The scheduler never writes invoices. It only asks two questions of
//! them: has it been paid, and is there anybody to email.

use serde::{Deserialize, Serialize};

use crate::id::InvoiceId;

/// A billing record as seen at the moment a tick runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Invoice {
    pub id: InvoiceId,
    /// Free-form payment status (`"Paid"`, `"Unpaid"`, `""`, …).
    pub payment_status: String,
    /// Candidate recipient addresses, most preferred first.
    pub recipients: Vec<String>,
    /// Display name of the billed customer.
    pub customer: Option<String>,
    /// Amount due, as written by the source (e.g. `"$1,250.00"`).
    pub amount: Option<String>,
    pub load_number: Option<String>,
    pub reference: Option<String>,
}

impl Invoice {
    /// Create an invoice with only an id; every other field is empty.
    #[must_use]
    pub fn new(id: impl Into<InvoiceId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_payment_status(mut self, status: impl Into<String>) -> Self {
        self.payment_status = status.into();
        self
    }

    #[must_use]
    pub fn with_recipient(mut self, address: impl Into<String>) -> Self {
        self.recipients.push(address.into());
        self
    }

    #[must_use]
    pub fn with_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    #[must_use]
    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    /// Whether the payment status mentions "paid" in any letter casing.
    ///
    /// This is a substring test, so `"Unpaid"` also counts as paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status.to_lowercase().contains("paid")
    }

    /// First candidate address that looks deliverable (contains `@`).
    #[must_use]
    pub fn recipient(&self) -> Option<&str> {
        self.recipients
            .iter()
            .map(|address| address.trim())
            .find(|address| address.contains('@'))
    }

    /// Customer name to show in emails, falling back to `"Customer"`.
    #[must_use]
    pub fn customer_name(&self) -> &str {
        self.customer
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("Customer")
    }
}
