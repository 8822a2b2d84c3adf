//! Startup invoice loading from a JSON file of raw ingestion rows.
//!
//! Rows use the column names of the billing export (`payment_status`,
//! `email_field`, `cust_freight_charges`, …). Cells may be strings or
//! numbers; empty cells count as missing.

use std::path::Path;

use dunning_domain::id::InvoiceId;
use dunning_domain::invoice::Invoice;
use serde::Deserialize;
use serde_json::Value;

/// Invoice file errors.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceFileError {
    #[error("failed to read invoice file")]
    Io(#[from] std::io::Error),
    #[error("invoice file is not a JSON array of rows")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InvoiceRow {
    id: Option<Value>,
    payment_status: Option<Value>,
    email_field: Option<Value>,
    email_to_send: Option<Value>,
    invoiced_customer_internal_use: Option<Value>,
    receiver_name: Option<Value>,
    customer_updated_text: Option<Value>,
    cust_freight_charges: Option<Value>,
    essential_trading_load: Option<Value>,
    customer_ref: Option<Value>,
}

fn cell(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

impl InvoiceRow {
    fn into_invoice(self, row_number: usize) -> Invoice {
        let id = cell(self.id.as_ref()).unwrap_or_else(|| row_number.to_string());
        let customer = [
            &self.invoiced_customer_internal_use,
            &self.receiver_name,
            &self.customer_updated_text,
        ]
        .into_iter()
        .find_map(|candidate| cell(candidate.as_ref()));

        Invoice {
            id: InvoiceId::new(id),
            payment_status: cell(self.payment_status.as_ref()).unwrap_or_default(),
            recipients: [&self.email_field, &self.email_to_send]
                .into_iter()
                .filter_map(|candidate| cell(candidate.as_ref()))
                .collect(),
            customer,
            amount: cell(self.cust_freight_charges.as_ref()),
            load_number: cell(self.essential_trading_load.as_ref()),
            reference: cell(self.customer_ref.as_ref()),
        }
    }
}

/// Parse a JSON array of invoice rows.
///
/// Rows without an id get their 1-based position.
///
/// # Errors
///
/// Returns [`InvoiceFileError::Json`] when the input is not an array of objects.
pub fn parse_rows(content: &str) -> Result<Vec<Invoice>, InvoiceFileError> {
    let rows: Vec<InvoiceRow> = serde_json::from_str(content)?;
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| row.into_invoice(index + 1))
        .collect())
}

/// Read and parse the invoice file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load(path: &Path) -> Result<Vec<Invoice>, InvoiceFileError> {
    let content = tokio::fs::read_to_string(path).await?;
    let invoices = parse_rows(&content)?;
    tracing::info!(path = %path.display(), count = invoices.len(), "invoices loaded");
    Ok(invoices)
}
