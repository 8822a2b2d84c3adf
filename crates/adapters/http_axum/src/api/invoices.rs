//! JSON REST handler for manual invoice sends.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use dunning_app::ports::{Clock, InvoiceSource, Mailer, SentEmail, StateStore};
use dunning_domain::id::InvoiceId;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body describing the email that went out.
#[derive(Debug, Serialize)]
pub struct SentEmailBody {
    pub to: String,
    pub subject: String,
}

impl From<SentEmail> for SentEmailBody {
    fn from(sent: SentEmail) -> Self {
        Self {
            to: sent.to,
            subject: sent.subject,
        }
    }
}

/// `POST /api/invoices/{id}/send-email`: email the invoice right now.
pub async fn send_email<S, I, M, C>(
    State(state): State<AppState<S, I, M, C>>,
    Path(id): Path<String>,
) -> Result<Json<SentEmailBody>, ApiError>
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    let sent = state
        .dispatch_service
        .send_invoice_email(&InvoiceId::from(id))
        .await?;
    Ok(Json(sent.into()))
}
